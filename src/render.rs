//! Hand-off of placements to an instanced renderer.
//!
//! The library never draws. It groups an [`InstanceList`] by mesh, folds in each
//! mesh's local convention (where its origin sits, how it is oriented, how big
//! it was modelled) and produces GPU-ready per-instance matrices.

use crate::instance::{InstanceList, MeshSelector};
use bytemuck::{Pod, Zeroable};
use glam::{Affine3A, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// How a source mesh is modelled relative to the turtle frame.
///
/// The turtle frame has `+Z` as heading and `+Y` as up; a branch mesh is
/// expected to span local origin to `+Z`. Assets authored differently are
/// corrected here: the correction is applied in mesh space before the
/// placement transform.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeshConvention {
    /// Offset of the mesh's pivot from its modelled origin.
    pub offset: Vec3,
    /// Rotation taking the mesh's own axes onto the turtle frame.
    pub rotation: Quat,
    /// Uniform scale applied to the raw asset.
    pub scale: f32,
}

impl Default for MeshConvention {
    fn default() -> Self {
        Self {
            offset: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: 1.0,
        }
    }
}

impl MeshConvention {
    /// A Y-up asset (most exported branch models) re-aimed along `+Z`.
    pub fn y_up() -> Self {
        Self {
            rotation: Quat::from_rotation_x(std::f32::consts::FRAC_PI_2),
            ..Default::default()
        }
    }

    /// Mesh-space correction transform.
    pub fn local_transform(&self) -> Affine3A {
        Affine3A::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            self.rotation,
            self.offset,
        )
    }
}

/// One per-instance model matrix, laid out for a vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct InstanceRaw {
    /// Column-major model matrix.
    pub model: [[f32; 4]; 4],
}

impl InstanceRaw {
    pub fn new(model: Mat4) -> Self {
        Self {
            model: model.to_cols_array_2d(),
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.model)
    }
}

/// The per-mesh instance data for one render pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InstanceBatches {
    pub branches: Vec<InstanceRaw>,
    pub ornaments: Vec<InstanceRaw>,
}

impl InstanceBatches {
    /// Groups `instances` by mesh, preserving emission order within each group.
    pub fn build(
        instances: &InstanceList,
        branch: &MeshConvention,
        ornament: &MeshConvention,
    ) -> Self {
        let branch_local = branch.local_transform();
        let ornament_local = ornament.local_transform();

        let mut batches = Self::default();
        for placement in instances {
            let (local, out) = match placement.mesh {
                MeshSelector::Branch => (branch_local, &mut batches.branches),
                MeshSelector::Ornament => (ornament_local, &mut batches.ornaments),
            };
            out.push(InstanceRaw::new(Mat4::from(placement.transform() * local)));
        }
        batches
    }

    pub fn get(&self, mesh: MeshSelector) -> &[InstanceRaw] {
        match mesh {
            MeshSelector::Branch => &self.branches,
            MeshSelector::Ornament => &self.ornaments,
        }
    }

    /// Issues one instanced draw per non-empty batch.
    pub fn submit<R: RendererAdapter + ?Sized>(&self, renderer: &mut R) {
        for mesh in [MeshSelector::Branch, MeshSelector::Ornament] {
            let batch = self.get(mesh);
            if !batch.is_empty() {
                renderer.draw_instances(mesh, batch);
            }
        }
    }

    /// The branch and ornament batches as raw bytes, ready for buffer upload.
    pub fn as_bytes(&self) -> (&[u8], &[u8]) {
        (
            bytemuck::cast_slice(&self.branches),
            bytemuck::cast_slice(&self.ornaments),
        )
    }
}

/// A renderer that can draw many copies of one of the two source meshes.
pub trait RendererAdapter {
    /// Draws `mesh` once per entry in `instances`.
    fn draw_instances(&mut self, mesh: MeshSelector, instances: &[InstanceRaw]);
}
