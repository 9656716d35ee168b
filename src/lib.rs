#![doc = include_str!("../readme.md")]

/// Everything you need to get started with `bevy_wallwalk`
pub mod prelude {
    pub(crate) use {
        avian3d::prelude::*,
        bevy_app::prelude::*,
        bevy_derive::{Deref, DerefMut},
        bevy_ecs::prelude::*,
        bevy_enhanced_input::prelude::*,
        bevy_math::prelude::*,
        bevy_reflect::prelude::*,
        bevy_time::prelude::*,
        bevy_transform::prelude::*,
        bevy_utils::prelude::*,
    };

    pub use crate::{
        WallWalkPlugin, WallWalkSystems, WallWalker,
        camera::{WallWalkerCamera, WallWalkerCameraOf},
        controller::{BodyProxy, LocomotionController, LocomotionEvents, LocomotionInput},
        diagnostics::{DiagnosticValue, LocomotionDiagnostic, LocomotionReadout},
        input::{Movement, RotateCamera},
        orientation::Facing,
        planner::LocomotionOutput,
        probe::{SurfaceContact, SurfaceQuery},
    };
}

use crate::{input::AccumulatedInput, prelude::*};
use bevy_ecs::{
    intern::Interned, lifecycle::HookContext, schedule::ScheduleLabel, world::DeferredWorld,
};
use tracing::warn;

pub mod camera;
pub mod controller;
pub mod diagnostics;
pub mod geometry;
pub mod input;
pub mod orientation;
pub mod planner;
pub mod probe;
mod walk;

/// Also requires you to add [`PhysicsPlugins`] and [`EnhancedInputPlugin`] to work properly.
pub struct WallWalkPlugin {
    schedule: Interned<dyn ScheduleLabel>,
}

impl WallWalkPlugin {
    /// Create a new plugin in the given schedule. The default is [`FixedPostUpdate`].
    pub fn new(schedule: impl ScheduleLabel) -> Self {
        Self {
            schedule: schedule.intern(),
        }
    }
}

impl Default for WallWalkPlugin {
    fn default() -> Self {
        Self {
            schedule: FixedPostUpdate.intern(),
        }
    }
}

impl Plugin for WallWalkPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            self.schedule,
            WallWalkSystems::MoveBodies.in_set(PhysicsSystems::First),
        )
        .add_plugins((
            camera::plugin,
            diagnostics::plugin,
            input::plugin,
            walk::plugin(self.schedule),
        ));
    }
}

/// System set used by all systems of `bevy_wallwalk`.
#[derive(SystemSet, Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum WallWalkSystems {
    MoveBodies,
}

/// A dynamic body that walks on whatever surface it touches, treating that
/// surface's normal as up.
#[derive(Component, Clone, Reflect, Debug)]
#[reflect(Component)]
#[require(
    AccumulatedInput,
    LocomotionController,
    TransformInterpolation,
    RigidBody = RigidBody::Dynamic,
    Collider = Collider::sphere(0.25),
    GravityScale = GravityScale(0.0),
    LockedAxes = LockedAxes::ROTATION_LOCKED,
    Transform,
)]
#[component(on_add=WallWalker::on_add)]
pub struct WallWalker {
    /// Only colliders passing this filter count as ground.
    pub filter: SpatialQueryFilter,
    pub move_speed: f32,
    /// Degrees, in `[0, 90]`. How far past a vertical edge the body may go before
    /// it stops counting as facing the same way.
    pub up_flip_threshold: f32,
    pub probe_radius: f32,
    /// Fraction of [`Self::probe_radius`] the body rests at above the ground.
    pub probe_distance: f32,
    /// How quickly the body turns toward the local up, per second.
    pub orientation_decay_rate: f32,
    pub snap_to_surface: bool,
    pub view_height: f32,
}

impl Default for WallWalker {
    fn default() -> Self {
        Self {
            filter: SpatialQueryFilter::default(),
            move_speed: 4.0,
            up_flip_threshold: 80.0,
            probe_radius: 0.6,
            probe_distance: 0.5,
            orientation_decay_rate: 10.0,
            snap_to_surface: true,
            view_height: 0.5,
        }
    }
}

impl WallWalker {
    pub fn on_add(mut world: DeferredWorld, ctx: HookContext) {
        let up = world
            .get::<Transform>(ctx.entity)
            .map(|transform| Vec3::from(transform.up()))
            .unwrap_or(Vec3::Y);

        {
            let Some(mut walker) = world.get_mut::<Self>(ctx.entity) else {
                return;
            };
            walker.filter.excluded_entities.insert(ctx.entity);
            walker.sanitize();
        }

        let Some(mut controller) = world.get_mut::<LocomotionController>(ctx.entity) else {
            return;
        };
        *controller = LocomotionController::new(up);
    }

    /// Distance from the contact point a grounded body is snapped to.
    pub fn rest_distance(&self) -> f32 {
        self.probe_radius * self.probe_distance
    }

    fn sanitize(&mut self) {
        let defaults = Self::default();
        if !(0.0..=90.0).contains(&self.up_flip_threshold) {
            let clamped = if self.up_flip_threshold.is_nan() {
                defaults.up_flip_threshold
            } else {
                self.up_flip_threshold.clamp(0.0, 90.0)
            };
            warn!(
                "up_flip_threshold {} is outside [0, 90], using {clamped}",
                self.up_flip_threshold
            );
            self.up_flip_threshold = clamped;
        }
        for (name, value, default) in [
            ("move_speed", &mut self.move_speed, defaults.move_speed),
            ("probe_radius", &mut self.probe_radius, defaults.probe_radius),
            ("probe_distance", &mut self.probe_distance, defaults.probe_distance),
        ] {
            if !(*value > 0.0 && value.is_finite()) {
                warn!("{name} must be positive, got {value}, using {default}");
                *value = default;
            }
        }
    }
}
