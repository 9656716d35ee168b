//! Small vector and rotation helpers shared by the probe, resolver and planner.
//!
//! Everything here is total: zero-length or parallel inputs produce a neutral
//! value (0°, identity) instead of NaN.

use crate::prelude::*;

/// Squared lengths below this are treated as zero.
pub const DEGENERATE_LENGTH_SQUARED: f32 = 1.0e-12;

/// Vector projection of `v` onto the direction `onto`.
pub fn project(v: Vec3, onto: Vec3) -> Vec3 {
    let len_sq = onto.length_squared();
    if len_sq < DEGENERATE_LENGTH_SQUARED {
        return Vec3::ZERO;
    }
    onto * (v.dot(onto) / len_sq)
}

/// Unsigned angle in degrees between `a` and `b`, in `[0, 180]`.
pub fn angle_between(a: Vec3, b: Vec3) -> f32 {
    if a.length_squared() < DEGENERATE_LENGTH_SQUARED
        || b.length_squared() < DEGENERATE_LENGTH_SQUARED
    {
        return 0.0;
    }
    // atan2 keeps precision near 0° and 180° where acos does not
    a.cross(b).length().atan2(a.dot(b)).to_degrees()
}

/// Shortest-arc rotation taking `from` onto `to`.
pub fn rotation_from_to(from: Vec3, to: Vec3) -> Quat {
    let (Some(from), Some(to)) = (from.try_normalize(), to.try_normalize()) else {
        return Quat::IDENTITY;
    };
    Quat::from_rotation_arc(from, to)
}

/// Rotation of `angle_degrees` around `axis`.
pub fn rotation_around_axis(axis: Vec3, angle_degrees: f32) -> Quat {
    let Some(axis) = axis.try_normalize() else {
        return Quat::IDENTITY;
    };
    Quat::from_axis_angle(axis, angle_degrees.to_radians())
}

/// Orientation whose forward axis (local `-Z`) points along `forward`, with its up
/// axis as close to `up` as possible.
pub fn look_rotation(forward: Vec3, up: Vec3) -> Quat {
    let Some(forward) = forward.try_normalize() else {
        return Quat::IDENTITY;
    };
    let back = -forward;
    let right = up
        .cross(back)
        .try_normalize()
        .unwrap_or_else(|| back.any_orthonormal_vector());
    let up = back.cross(right);
    Quat::from_mat3(&Mat3::from_cols(right, up, back))
}
