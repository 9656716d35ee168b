//! Decides whether the current local up counts as facing world up or world down.

use crate::{
    geometry::{angle_between, project},
    prelude::*,
};

/// Tolerance for the dot-product comparisons against 0 and -1.
pub const DOT_TOLERANCE: f32 = 1.0e-5;
/// Tolerance in degrees when checking for a fully inverted local up.
pub const ANGLE_TOLERANCE: f32 = 1.0e-3;

/// Which world axis the body's movement plane is referenced against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Reflect)]
pub enum Facing {
    #[default]
    Up,
    Down,
}

impl Facing {
    /// The world axis this facing is measured against.
    pub fn reference(self) -> Vec3 {
        match self {
            Facing::Up => Vec3::Y,
            Facing::Down => Vec3::NEG_Y,
        }
    }

    /// Horizontal input multiplier. Mirrored when facing down so left and right
    /// stay consistent with the camera.
    pub fn sign(self) -> f32 {
        match self {
            Facing::Up => 1.0,
            Facing::Down => -1.0,
        }
    }

    pub fn is_up(self) -> bool {
        self == Facing::Up
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FacingResolution {
    pub facing: Facing,
    /// Local up exactly opposes world up, so camera yaw has to be negated.
    pub yaw_inverted: bool,
    /// Length of local up along world up.
    pub dot: f32,
}

/// Resolves the facing for this tick from `local_up` and last tick's facing.
///
/// A change of facing is held back while the angle to the previous reference
/// axis, taken modulo 90°, stays within `threshold_degrees`. This keeps a body
/// straddling a vertical edge from flipping back and forth every tick. A fully
/// inverted local up (180°) always flips.
pub fn resolve(local_up: Vec3, previous: Facing, threshold_degrees: f32) -> FacingResolution {
    let dot = Vec3::Y.dot(project(local_up, Vec3::Y));

    // exactly perpendicular still counts as facing up
    let mut facing = if dot > 0.0 || dot.abs() <= DOT_TOLERANCE {
        Facing::Up
    } else {
        Facing::Down
    };

    if facing != previous {
        let angle = angle_between(local_up, previous.reference());
        if (angle % 90.0).abs() <= threshold_degrees && (angle - 180.0).abs() > ANGLE_TOLERANCE {
            facing = previous;
        }
    }

    FacingResolution {
        facing,
        yaw_inverted: (dot + 1.0).abs() <= DOT_TOLERANCE,
        dot,
    }
}
