use tracing::{trace, warn};

use crate::{
    orientation::{Facing, resolve},
    planner::{LocomotionOutput, plan},
    probe::{GroundProbe, SurfaceContact, SurfaceQuery},
    prelude::*,
};

/// The body being moved. Position and rotation are read and written, velocity is
/// only written.
pub trait BodyProxy {
    fn position(&self) -> Vec3;
    fn set_position(&mut self, position: Vec3);
    fn rotation(&self) -> Quat;
    fn set_rotation(&mut self, rotation: Quat);
    fn set_linear_velocity(&mut self, velocity: Vec3);
}

/// Receives the controller's per-tick diagnostics.
///
/// Every channel fires exactly once per tick, whether or not its value changed.
/// Nothing here feeds back into the controller.
pub trait LocomotionEvents {
    fn grounded(&mut self, _grounded: bool) {}
    fn local_up(&mut self, _local_up: Vec3) {}
    fn speed(&mut self, _speed: f32) {}
    fn facing_up(&mut self, _facing_up: bool) {}
    fn yaw_inverted(&mut self, _yaw_inverted: bool) {}
    fn yaw(&mut self, _yaw_degrees: f32) {}
}

impl LocomotionEvents for () {}

/// Input sampled for one fixed tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LocomotionInput {
    /// Strafe on `x`, forward on `y`, each in `[-1, 1]`.
    pub movement: Vec2,
    pub camera_yaw_degrees: f32,
}

/// Per-body controller state. Added automatically with [`WallWalker`].
#[derive(Component, Clone, Reflect, Debug)]
#[reflect(Component)]
pub struct LocomotionController {
    /// The normal of the last surface stood on. Kept while airborne.
    pub local_up: Vec3,
    pub facing: Facing,
    pub grounded: bool,
    pub yaw_inverted: bool,
    /// Ground contact from the last tick, if any.
    #[reflect(ignore)]
    pub contact: Option<SurfaceContact>,
    #[reflect(ignore)]
    probe: GroundProbe,
}

impl Default for LocomotionController {
    fn default() -> Self {
        Self::new(Vec3::Y)
    }
}

impl LocomotionController {
    pub fn new(local_up: Vec3) -> Self {
        Self {
            local_up: local_up.try_normalize().unwrap_or(Vec3::Y),
            facing: Facing::Up,
            grounded: false,
            yaw_inverted: false,
            contact: None,
            probe: GroundProbe::default(),
        }
    }

    /// Runs one fixed step: probe, resolve facing, plan, apply to `body`, then
    /// report to `events`.
    pub fn tick(
        &mut self,
        cfg: &WallWalker,
        body: &mut impl BodyProxy,
        query: &impl SurfaceQuery,
        input: LocomotionInput,
        dt: f32,
        events: &mut impl LocomotionEvents,
    ) -> LocomotionOutput {
        self.update_ground(cfg, body, query);

        let resolution = resolve(self.local_up, self.facing, cfg.up_flip_threshold);
        self.facing = resolution.facing;
        self.yaw_inverted = resolution.yaw_inverted;

        let mut output = plan(
            self.local_up,
            self.facing,
            self.yaw_inverted,
            input.camera_yaw_degrees,
            input.movement,
            cfg.move_speed,
        );
        validate_velocity(&mut output.velocity);

        body.set_linear_velocity(output.velocity);
        let t = 1.0 - (-cfg.orientation_decay_rate * dt).exp();
        let rotation = body.rotation().slerp(output.target_orientation, t.clamp(0.0, 1.0));
        body.set_rotation(rotation);

        trace!(
            grounded = self.grounded,
            facing = ?self.facing,
            velocity = ?output.velocity,
            "locomotion tick"
        );
        self.emit(&output, events);
        output
    }

    fn update_ground(
        &mut self,
        cfg: &WallWalker,
        body: &mut impl BodyProxy,
        query: &impl SurfaceQuery,
    ) {
        self.contact = self.probe.probe(query, body.position(), cfg.probe_radius);
        let Some(contact) = self.contact else {
            self.grounded = false;
            return;
        };
        self.grounded = true;
        self.local_up = contact.normal;
        if cfg.snap_to_surface {
            body.set_position(contact.point + contact.normal * cfg.rest_distance());
        }
    }

    fn emit(&self, output: &LocomotionOutput, events: &mut impl LocomotionEvents) {
        events.grounded(self.grounded);
        events.local_up(self.local_up);
        events.speed(output.velocity.length());
        events.facing_up(self.facing.is_up());
        events.yaw_inverted(self.yaw_inverted);
        events.yaw(output.yaw_degrees);
    }
}

fn validate_velocity(velocity: &mut Vec3) {
    for i in 0..3 {
        if !velocity[i].is_finite() {
            warn!("velocity[{i}] is not finite: {}, setting to 0", velocity[i]);
            velocity[i] = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{ProbeHits, SurfaceHit};

    const EPS: f32 = 1.0e-4;
    const DT: f32 = 1.0 / 60.0;

    #[derive(Default)]
    struct TestBody {
        position: Vec3,
        rotation: Quat,
        velocity: Vec3,
    }

    impl BodyProxy for TestBody {
        fn position(&self) -> Vec3 {
            self.position
        }
        fn set_position(&mut self, position: Vec3) {
            self.position = position;
        }
        fn rotation(&self) -> Quat {
            self.rotation
        }
        fn set_rotation(&mut self, rotation: Quat) {
            self.rotation = rotation;
        }
        fn set_linear_velocity(&mut self, velocity: Vec3) {
            self.velocity = velocity;
        }
    }

    /// An infinite plane through `point` with the given outward normal, or nothing.
    struct FlatSurface(Option<(Vec3, Vec3)>);

    impl SurfaceQuery for FlatSurface {
        fn overlap_sphere(&self, center: Vec3, radius: f32, hits: &mut ProbeHits) {
            let Some((point, normal)) = self.0 else {
                return;
            };
            let height = (center - point).dot(normal);
            if height.abs() <= radius {
                hits.push(SurfaceHit {
                    entity: Entity::PLACEHOLDER,
                    closest_point: center - normal * height,
                });
            }
        }
    }

    #[derive(Default)]
    struct Recorder {
        grounded: Vec<bool>,
        local_up: Vec<Vec3>,
        speed: Vec<f32>,
        facing_up: Vec<bool>,
        yaw_inverted: Vec<bool>,
        yaw: Vec<f32>,
    }

    impl LocomotionEvents for Recorder {
        fn grounded(&mut self, grounded: bool) {
            self.grounded.push(grounded);
        }
        fn local_up(&mut self, local_up: Vec3) {
            self.local_up.push(local_up);
        }
        fn speed(&mut self, speed: f32) {
            self.speed.push(speed);
        }
        fn facing_up(&mut self, facing_up: bool) {
            self.facing_up.push(facing_up);
        }
        fn yaw_inverted(&mut self, yaw_inverted: bool) {
            self.yaw_inverted.push(yaw_inverted);
        }
        fn yaw(&mut self, yaw_degrees: f32) {
            self.yaw.push(yaw_degrees);
        }
    }

    fn forward_input(yaw: f32) -> LocomotionInput {
        LocomotionInput {
            movement: Vec2::Y,
            camera_yaw_degrees: yaw,
        }
    }

    #[test]
    fn walks_forward_on_floor() {
        let cfg = WallWalker::default();
        let mut controller = LocomotionController::default();
        let mut body = TestBody {
            position: vec3(0.0, 0.4, 0.0),
            ..default()
        };
        let floor = FlatSurface(Some((Vec3::ZERO, Vec3::Y)));

        let output = controller.tick(&cfg, &mut body, &floor, forward_input(0.0), DT, &mut ());

        assert!(controller.grounded);
        assert!(controller.local_up.abs_diff_eq(Vec3::Y, EPS));
        assert_eq!(controller.facing, Facing::Up);
        assert!(output.velocity.abs_diff_eq(vec3(0.0, 0.0, -cfg.move_speed), EPS));
        assert!(body.velocity.abs_diff_eq(output.velocity, EPS));
        assert!(output.target_orientation.abs_diff_eq(Quat::IDENTITY, EPS));
        // snapped to the rest distance above the floor
        assert!(body.position.abs_diff_eq(vec3(0.0, cfg.rest_distance(), 0.0), EPS));
    }

    #[test]
    fn local_up_is_sticky_when_airborne() {
        let cfg = WallWalker::default();
        let mut controller = LocomotionController::default();
        let mut body = TestBody {
            position: vec3(0.3, 0.0, 0.0),
            ..default()
        };
        let wall = FlatSurface(Some((Vec3::ZERO, Vec3::X)));
        controller.tick(&cfg, &mut body, &wall, forward_input(0.0), DT, &mut ());
        assert!(controller.grounded);
        assert!(controller.local_up.abs_diff_eq(Vec3::X, EPS));

        body.position = vec3(10.0, 0.0, 0.0);
        controller.tick(&cfg, &mut body, &FlatSurface(None), forward_input(0.0), DT, &mut ());
        assert!(!controller.grounded);
        assert!(controller.contact.is_none());
        assert!(controller.local_up.abs_diff_eq(Vec3::X, EPS));
        // no snap while airborne
        assert_eq!(body.position, vec3(10.0, 0.0, 0.0));
    }

    #[test]
    fn ceiling_inverts_yaw_and_flips_facing() {
        let cfg = WallWalker::default();
        let mut controller = LocomotionController::default();
        let mut body = TestBody {
            position: vec3(0.0, 1.7, 0.0),
            ..default()
        };
        let ceiling = FlatSurface(Some((vec3(0.0, 2.0, 0.0), Vec3::NEG_Y)));

        let mut events = Recorder::default();
        let output = controller.tick(
            &cfg,
            &mut body,
            &ceiling,
            forward_input(45.0),
            DT,
            &mut events,
        );

        assert_eq!(controller.facing, Facing::Down);
        assert!(controller.yaw_inverted);
        assert_eq!(output.yaw_degrees, -45.0);
        assert_eq!(events.yaw, vec![-45.0]);
        assert_eq!(events.facing_up, vec![false]);
        assert_eq!(events.yaw_inverted, vec![true]);
        assert!(output.velocity.dot(Vec3::Y).abs() < EPS);
    }

    #[test]
    fn emits_every_channel_every_tick() {
        let cfg = WallWalker::default();
        let mut controller = LocomotionController::default();
        let mut body = TestBody {
            position: vec3(0.0, 0.3, 0.0),
            ..default()
        };
        let floor = FlatSurface(Some((Vec3::ZERO, Vec3::Y)));
        let mut events = Recorder::default();

        for _ in 0..3 {
            controller.tick(&cfg, &mut body, &floor, forward_input(0.0), DT, &mut events);
        }

        assert_eq!(events.grounded, vec![true; 3]);
        assert_eq!(events.local_up.len(), 3);
        assert_eq!(events.facing_up, vec![true; 3]);
        assert_eq!(events.yaw_inverted, vec![false; 3]);
        assert_eq!(events.yaw, vec![0.0; 3]);
        for speed in events.speed {
            assert!((speed - cfg.move_speed).abs() < EPS);
        }
    }

    #[test]
    fn orientation_approaches_target_smoothly() {
        let cfg = WallWalker::default();
        let mut controller = LocomotionController::default();
        let mut body = TestBody {
            position: vec3(0.3, 0.0, 0.0),
            ..default()
        };
        let wall = FlatSurface(Some((Vec3::ZERO, Vec3::X)));

        controller.tick(&cfg, &mut body, &wall, LocomotionInput::default(), DT, &mut ());
        let first_up = body.rotation * Vec3::Y;
        // moved toward the wall normal but not all the way
        assert!(first_up.x > 0.0);
        assert!(first_up.x < 0.9);

        for _ in 0..300 {
            controller.tick(&cfg, &mut body, &wall, LocomotionInput::default(), DT, &mut ());
        }
        assert!((body.rotation * Vec3::Y).abs_diff_eq(Vec3::X, 1.0e-3));
    }

    #[test]
    fn snap_can_be_disabled() {
        let cfg = WallWalker {
            snap_to_surface: false,
            ..default()
        };
        let mut controller = LocomotionController::default();
        let mut body = TestBody {
            position: vec3(0.0, 0.5, 0.0),
            ..default()
        };
        let floor = FlatSurface(Some((Vec3::ZERO, Vec3::Y)));
        controller.tick(&cfg, &mut body, &floor, LocomotionInput::default(), DT, &mut ());
        assert!(controller.grounded);
        assert_eq!(body.position, vec3(0.0, 0.5, 0.0));
    }

    #[test]
    fn non_finite_input_is_zeroed() {
        let cfg = WallWalker::default();
        let mut controller = LocomotionController::default();
        let mut body = TestBody::default();
        let input = LocomotionInput {
            movement: vec2(f32::NAN, 0.0),
            camera_yaw_degrees: 0.0,
        };
        let output = controller.tick(&cfg, &mut body, &FlatSurface(None), input, DT, &mut ());
        assert!(output.velocity.is_finite());
        assert!(body.velocity.is_finite());
    }
}
