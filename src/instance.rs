//! Placement records handed from the interpreter to the renderer.

use glam::{Affine3A, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Which of the two source meshes a placement refers to.
///
/// The caller resolves each variant to a concrete renderable; the interpreter
/// never looks inside a mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeshSelector {
    /// A branch segment modelled from local origin to local `+Z` (unit length).
    Branch,
    /// A terminal ornament (flower, leaf) anchored at its local origin.
    Ornament,
}

/// One oriented copy of a mesh.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// The mesh to draw.
    pub mesh: MeshSelector,

    /// World position of the mesh's local origin.
    pub translation: Vec3,

    /// World orientation of the mesh's local frame.
    pub rotation: Quat,

    /// Uniform scale. For branches this equals the segment length.
    pub scale: f32,
}

impl Placement {
    /// Mesh-local to world transform.
    pub fn transform(&self) -> Affine3A {
        Affine3A::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            self.rotation,
            self.translation,
        )
    }

    /// [`transform`](Self::transform) as a column-major 4x4 matrix.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from(self.transform())
    }

    pub fn origin(&self) -> Vec3 {
        self.translation
    }

    /// The far end of a branch segment (the image of local `+Z`).
    pub fn tip(&self) -> Vec3 {
        self.transform().transform_point3(Vec3::Z)
    }
}

/// The ordered placements produced by one interpretation pass.
///
/// Order follows emission during the left-to-right scan.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InstanceList {
    placements: Vec<Placement>,
}

impl InstanceList {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, placement: Placement) {
        self.placements.push(placement);
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Placement> {
        self.placements.iter()
    }

    pub fn as_slice(&self) -> &[Placement] {
        &self.placements
    }

    /// Number of placements for `mesh`.
    pub fn count(&self, mesh: MeshSelector) -> usize {
        self.of_mesh(mesh).count()
    }

    /// Placements for `mesh`, in emission order.
    pub fn of_mesh(&self, mesh: MeshSelector) -> impl Iterator<Item = &Placement> {
        self.placements.iter().filter(move |p| p.mesh == mesh)
    }
}

impl<'a> IntoIterator for &'a InstanceList {
    type Item = &'a Placement;
    type IntoIter = std::slice::Iter<'a, Placement>;

    fn into_iter(self) -> Self::IntoIter {
        self.placements.iter()
    }
}
