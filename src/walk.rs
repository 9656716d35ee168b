use bevy_ecs::{intern::Interned, schedule::ScheduleLabel};
use tracing::debug;

use crate::{
    camera::camera_yaw_degrees,
    diagnostics::{DiagnosticValue, LocomotionDiagnostic},
    input::AccumulatedInput,
    prelude::*,
    probe::{ProbeHits, SurfaceHit},
};

pub(super) fn plugin(schedule: Interned<dyn ScheduleLabel>) -> impl Fn(&mut App) {
    move |app: &mut App| {
        app.add_systems(schedule, run_wall_walkers.in_set(WallWalkSystems::MoveBodies));
    }
}

type ColliderData = (&'static Collider, &'static Position, &'static Rotation);

/// [`SurfaceQuery`] backed by Avian's spatial query pipeline.
struct AvianSurfaceQuery<'a, 'w, 's> {
    pipeline: &'a SpatialQueryPipeline,
    colliders: &'a Query<'w, 's, ColliderData>,
    filter: &'a SpatialQueryFilter,
}

impl SurfaceQuery for AvianSurfaceQuery<'_, '_, '_> {
    fn overlap_sphere(&self, center: Vec3, radius: f32, hits: &mut ProbeHits) {
        let sphere = Collider::sphere(radius);
        self.pipeline.shape_intersections_callback(
            &sphere,
            center,
            Quat::IDENTITY,
            self.filter,
            |entity| {
                let Ok((collider, position, rotation)) = self.colliders.get(entity) else {
                    return true;
                };
                // a center buried in the collider has no outward direction to it
                let Some(closest_point) = surface_point(collider, *position, *rotation, center)
                else {
                    return true;
                };
                hits.push(SurfaceHit {
                    entity,
                    closest_point,
                })
            },
        );
    }
}

/// Closest point on the boundary of `collider` to `point`, or `None` if `point` is inside it.
fn surface_point(
    collider: &Collider,
    position: Position,
    rotation: Rotation,
    point: Vec3,
) -> Option<Vec3> {
    let (closest, inside) = collider.project_point(position, rotation, point, false);
    (!inside).then_some(closest)
}

struct Body<'a> {
    transform: &'a mut Transform,
    velocity: &'a mut LinearVelocity,
}

impl BodyProxy for Body<'_> {
    fn position(&self) -> Vec3 {
        self.transform.translation
    }

    fn set_position(&mut self, position: Vec3) {
        self.transform.translation = position;
    }

    fn rotation(&self) -> Quat {
        self.transform.rotation
    }

    fn set_rotation(&mut self, rotation: Quat) {
        self.transform.rotation = rotation;
    }

    fn set_linear_velocity(&mut self, velocity: Vec3) {
        self.velocity.0 = velocity;
    }
}

/// Forwards each diagnostic channel as a [`LocomotionDiagnostic`] message.
struct DiagnosticWriter<'a, 'w> {
    entity: Entity,
    writer: &'a mut MessageWriter<'w, LocomotionDiagnostic>,
}

impl DiagnosticWriter<'_, '_> {
    fn send(&mut self, value: DiagnosticValue) {
        self.writer.write(LocomotionDiagnostic {
            entity: self.entity,
            value,
        });
    }
}

impl LocomotionEvents for DiagnosticWriter<'_, '_> {
    fn grounded(&mut self, grounded: bool) {
        self.send(DiagnosticValue::Grounded(grounded));
    }

    fn local_up(&mut self, local_up: Vec3) {
        self.send(DiagnosticValue::LocalUp(local_up));
    }

    fn speed(&mut self, speed: f32) {
        self.send(DiagnosticValue::Speed(speed));
    }

    fn facing_up(&mut self, facing_up: bool) {
        self.send(DiagnosticValue::FacingUp(facing_up));
    }

    fn yaw_inverted(&mut self, yaw_inverted: bool) {
        self.send(DiagnosticValue::YawInverted(yaw_inverted));
    }

    fn yaw(&mut self, yaw_degrees: f32) {
        self.send(DiagnosticValue::Yaw(yaw_degrees));
    }
}

fn run_wall_walkers(
    mut walkers: Query<(
        Entity,
        &WallWalker,
        &mut LocomotionController,
        &AccumulatedInput,
        &mut Transform,
        &mut LinearVelocity,
        Option<&WallWalkerCamera>,
    )>,
    cams: Query<&Transform, Without<WallWalker>>,
    colliders: Query<ColliderData>,
    pipeline: Res<SpatialQueryPipeline>,
    time: Res<Time>,
    mut diagnostics: MessageWriter<LocomotionDiagnostic>,
) {
    for (entity, cfg, mut controller, input, mut transform, mut velocity, cam) in &mut walkers {
        let orientation = cam
            .and_then(|e| cams.get(e.get()).copied().ok())
            .unwrap_or(*transform);
        let input = LocomotionInput {
            movement: input.last_movement.unwrap_or_default(),
            camera_yaw_degrees: camera_yaw_degrees(&orientation),
        };
        let query = AvianSurfaceQuery {
            pipeline: &*pipeline,
            colliders: &colliders,
            filter: &cfg.filter,
        };
        let mut body = Body {
            transform: &mut *transform,
            velocity: &mut *velocity,
        };
        let mut events = DiagnosticWriter {
            entity,
            writer: &mut diagnostics,
        };

        let was_grounded = controller.grounded;
        controller.tick(
            cfg,
            &mut body,
            &query,
            input,
            time.delta_secs(),
            &mut events,
        );

        if controller.grounded != was_grounded {
            debug!(
                ?entity,
                grounded = controller.grounded,
                local_up = ?controller.local_up,
                "walker grounded state changed"
            );
        }
    }
}
