use crate::{
    geometry::{look_rotation, rotation_around_axis, rotation_from_to},
    orientation::Facing,
    prelude::*,
};

/// Forward axis before any camera or surface rotation is applied.
pub const WORLD_FORWARD: Vec3 = Vec3::NEG_Z;

/// Result of planning one tick of movement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocomotionOutput {
    pub velocity: Vec3,
    /// Rotation taking world up onto the local up.
    pub target_orientation: Quat,
    /// Camera yaw after inversion.
    pub yaw_degrees: f32,
    pub yaw_inverted: bool,
    /// Camera forward carried onto the surface plane.
    pub movement_forward: Vec3,
}

/// Maps camera yaw and input onto the plane of `local_up`.
///
/// `input.x` is strafe, `input.y` is forward. The planner is pure; non-finite
/// inputs produce non-finite output.
pub fn plan(
    local_up: Vec3,
    facing: Facing,
    yaw_inverted: bool,
    camera_yaw_degrees: f32,
    input: Vec2,
    speed: f32,
) -> LocomotionOutput {
    let reference = facing.reference();
    let yaw_degrees = if yaw_inverted {
        -camera_yaw_degrees
    } else {
        camera_yaw_degrees
    };

    let plane_rotation = rotation_from_to(reference, local_up);
    let player_rotation = rotation_around_axis(reference, yaw_degrees);
    let movement_forward = plane_rotation * (player_rotation * WORLD_FORWARD);
    let movement_rotation = look_rotation(movement_forward, local_up);

    // local forward is -Z
    let raw_input = vec3(input.x * facing.sign(), 0.0, -input.y);
    let velocity = movement_rotation * raw_input * speed;

    LocomotionOutput {
        velocity,
        target_orientation: rotation_from_to(Vec3::Y, local_up),
        yaw_degrees,
        yaw_inverted,
        movement_forward,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1.0e-4;

    #[test]
    fn floor_forward() {
        let output = plan(Vec3::Y, Facing::Up, false, 0.0, Vec2::Y, 4.0);
        assert!(output.velocity.abs_diff_eq(vec3(0.0, 0.0, -4.0), EPS));
        assert!(output.target_orientation.abs_diff_eq(Quat::IDENTITY, EPS));
        assert_eq!(output.yaw_degrees, 0.0);
    }

    #[test]
    fn floor_strafe_and_yaw() {
        let output = plan(Vec3::Y, Facing::Up, false, 0.0, Vec2::X, 2.0);
        assert!(output.velocity.abs_diff_eq(vec3(2.0, 0.0, 0.0), EPS));

        // yawing 90° turns forward toward -X, the same way a camera yaw does
        let output = plan(Vec3::Y, Facing::Up, false, 90.0, Vec2::Y, 1.0);
        assert!(output.velocity.abs_diff_eq(Vec3::NEG_X, EPS));
    }

    #[test]
    fn wall_follows_composed_rotation() {
        let local_up = Vec3::X;
        let output = plan(local_up, Facing::Up, false, 90.0, Vec2::Y, 3.0);

        let expected_forward = rotation_from_to(Vec3::Y, local_up)
            * (rotation_around_axis(Vec3::Y, 90.0) * WORLD_FORWARD);
        assert!(output.movement_forward.abs_diff_eq(expected_forward, EPS));
        assert!(output.velocity.abs_diff_eq(expected_forward * 3.0, EPS));
        // straight up the wall
        assert!(output.velocity.abs_diff_eq(vec3(0.0, 3.0, 0.0), EPS));
        assert!(output.velocity.dot(local_up).abs() < EPS);
        assert!((output.target_orientation * Vec3::Y).abs_diff_eq(local_up, EPS));
    }

    #[test]
    fn facing_down_mirrors_horizontal_input() {
        let up = plan(Vec3::Y, Facing::Up, false, 0.0, Vec2::X, 1.0);
        let down = plan(Vec3::Y, Facing::Down, false, 0.0, Vec2::X, 1.0);
        assert!(up.velocity.x > 0.5);
        assert!((down.velocity.x + up.velocity.x).abs() < EPS);
    }

    #[test]
    fn yaw_inversion_negates_yaw() {
        let output = plan(Vec3::NEG_Y, Facing::Down, true, 30.0, Vec2::ZERO, 1.0);
        assert_eq!(output.yaw_degrees, -30.0);
        assert!(output.yaw_inverted);
        assert_eq!(output.velocity, Vec3::ZERO);
    }

    #[test]
    fn velocity_stays_on_surface_plane() {
        let local_up = vec3(0.3, -0.8, 0.5).normalize();
        for facing in [Facing::Up, Facing::Down] {
            let output = plan(local_up, facing, false, 37.0, vec2(0.6, -0.8), 5.0);
            assert!(output.velocity.dot(local_up).abs() < 1.0e-3);
            assert!((output.velocity.length() - 5.0).abs() < 1.0e-3);
        }
    }
}
