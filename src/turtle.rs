//! Turtle state and operations for plant interpretation.

use glam::{Affine3A, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// One of the turtle's own basis vectors, used as a rotation axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurtleAxis {
    /// Local Y. Rotating about it turns left/right (yaw).
    Up,
    /// Local X. Rotating about it tips the heading up/down (pitch).
    Right,
    /// Local Z. Rotating about it spins in place (roll).
    Heading,
}

impl TurtleAxis {
    /// The axis in the turtle's local frame.
    pub fn local(self) -> Vec3 {
        match self {
            Self::Up => Vec3::Y,
            Self::Right => Vec3::X,
            Self::Heading => Vec3::Z,
        }
    }
}

/// The state of the plant turtle.
///
/// A plain value: every operation returns a new state and leaves `self`
/// untouched, so a copy pushed on the branch stack is never affected by later
/// moves.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TurtleState {
    /// Current world-space position of the "cursor".
    pub position: Vec3,

    /// Current world-space orientation. Always unit length.
    pub rotation: Quat,

    /// Distance covered by one `F`/`f`, before `scale` is applied.
    pub step_length: f32,

    /// Angle in degrees used by spread-relative rotations.
    pub spread: f32,

    /// Accumulated uniform scale (reduced by `!`).
    pub scale: f32,
}

impl Default for TurtleState {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            step_length: 1.0,
            spread: 60.0,
            scale: 1.0,
        }
    }
}

impl TurtleState {
    /// Returns the turtle's local heading (Z-axis) in world space.
    pub fn heading(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    /// Returns the turtle's local up direction (Y-axis) in world space.
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Returns the turtle's local right direction (X-axis) in world space.
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Length of one step once the accumulated scale is applied.
    pub fn effective_step(&self) -> f32 {
        self.step_length * self.scale
    }

    /// Moves `length` units along the heading. Orientation is unchanged.
    #[must_use]
    pub fn forward(&self, length: f32) -> Self {
        Self {
            position: self.position + self.heading() * length,
            ..self.clone()
        }
    }

    /// Rotates the whole basis by `degrees` about one of the turtle's own axes.
    ///
    /// The rotation is composed on the right (local frame) and re-normalized,
    /// so long chains of turns do not skew the basis.
    #[must_use]
    pub fn rotate(&self, axis: TurtleAxis, degrees: f32) -> Self {
        let rot = Quat::from_axis_angle(axis.local(), degrees.to_radians());
        Self {
            rotation: (self.rotation * rot).normalize(),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_spread(&self, degrees: f32) -> Self {
        Self {
            spread: degrees,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_step_length(&self, step_length: f32) -> Self {
        Self {
            step_length,
            ..self.clone()
        }
    }

    /// Multiplies the accumulated scale by `factor`.
    #[must_use]
    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            scale: self.scale * factor,
            ..self.clone()
        }
    }

    /// Rigid transform (rotation + translation) of the turtle frame.
    pub fn transform(&self) -> Affine3A {
        Affine3A::from_rotation_translation(self.rotation, self.position)
    }
}

/// Operations that can be performed by the plant turtle.
///
/// Spread-relative rotations carry a sign multiplier; the angle itself is read
/// from the current [`TurtleState::spread`] when the operation fires.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurtleOp {
    // --- Geometry ---
    /// Emit a branch segment and move forward (`F`).
    Draw,
    /// Move forward without emitting geometry (`f`).
    Move,
    /// Emit an ornament at the current position (`A`).
    Ornament,

    // --- Orientation ---
    /// Rotate about Up by `sign * spread` (`+`/`-`).
    Yaw(f32),
    /// Rotate about Right by `sign * spread` (`&`/`^`).
    Pitch(f32),
    /// Rotate about Heading by `sign * spread` (`\` / `/`).
    Roll(f32),
    /// Rotate about `axis` by a fixed angle, ignoring spread (`|` turns around).
    Turn { axis: TurtleAxis, degrees: f32 },

    // --- Style ---
    /// Multiply the accumulated scale by the interpreter's shrink factor (`!`).
    Shrink,
    /// Set the spread angle in degrees for the rest of the current branch.
    SetSpread(f32),
    /// Set the step length for the rest of the current branch.
    SetStep(f32),

    // --- Flow Control ---
    /// Save the full turtle state onto the stack (`[`).
    Push,
    /// Restore the most recently pushed turtle state (`]`).
    Pop,
    /// No-op; symbol has no registered meaning.
    Ignore,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_moves_along_heading() {
        let s = TurtleState::default().forward(2.0);
        assert!(s.position.abs_diff_eq(Vec3::new(0.0, 0.0, 2.0), 1e-6));
        assert_eq!(s.rotation, Quat::IDENTITY);
    }

    #[test]
    fn rotate_leaves_original_untouched() {
        let s = TurtleState::default();
        let turned = s.rotate(TurtleAxis::Up, 90.0);
        assert_eq!(s.rotation, Quat::IDENTITY);
        assert!(turned.heading().abs_diff_eq(Vec3::X, 1e-6));
        assert!(turned.up().abs_diff_eq(Vec3::Y, 1e-6));
    }

    #[test]
    fn pitch_and_roll_use_local_axes() {
        let s = TurtleState::default().rotate(TurtleAxis::Up, 90.0);
        // Heading is now +X; pitching about local right (-Z in world) tips it.
        let pitched = s.rotate(TurtleAxis::Right, 90.0);
        assert!(pitched.heading().abs_diff_eq(Vec3::NEG_Y, 1e-5));
        let rolled = s.rotate(TurtleAxis::Heading, 90.0);
        assert!(rolled.heading().abs_diff_eq(Vec3::X, 1e-5));
    }

    #[test]
    fn basis_stays_orthonormal_after_many_turns() {
        let mut s = TurtleState::default();
        for i in 0..10_000 {
            let axis = match i % 3 {
                0 => TurtleAxis::Up,
                1 => TurtleAxis::Right,
                _ => TurtleAxis::Heading,
            };
            s = s.rotate(axis, 37.3);
        }
        let (h, u, r) = (s.heading(), s.up(), s.right());
        for v in [h, u, r] {
            assert!((v.length() - 1.0).abs() < 1e-4);
        }
        assert!(h.dot(u).abs() < 1e-4);
        assert!(h.dot(r).abs() < 1e-4);
        assert!(u.dot(r).abs() < 1e-4);
    }

    #[test]
    fn scale_shortens_effective_step() {
        let s = TurtleState::default().with_step_length(2.0).scaled(0.5);
        assert_eq!(s.effective_step(), 1.0);
        assert_eq!(s.with_spread(75.0).spread, 75.0);
    }
}
