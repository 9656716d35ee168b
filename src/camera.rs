use core::f32::consts::FRAC_PI_2;

use crate::{input::RotateCamera, prelude::*};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(
        RunFixedMainLoop,
        sync_camera_transform.after(TransformEasingSystems::UpdateEasingTick),
    )
    .add_observer(rotate_camera);
}

/// Marks a camera as following a [`WallWalker`]. Its yaw steers the walker.
#[derive(Component, Clone, Copy)]
#[relationship(relationship_target = WallWalkerCamera)]
pub struct WallWalkerCameraOf(pub Entity);

#[derive(Component, Clone, Copy)]
#[relationship_target(relationship = WallWalkerCameraOf)]
pub struct WallWalkerCamera(Entity);

impl WallWalkerCamera {
    pub fn get(self) -> Entity {
        self.0
    }
}

/// Yaw in degrees of a camera transform around world up.
pub fn camera_yaw_degrees(transform: &Transform) -> f32 {
    let (yaw, _, _) = transform.rotation.to_euler(EulerRot::YXZ);
    yaw.to_degrees()
}

pub(crate) fn sync_camera_transform(
    mut cameras: Query<(&mut Transform, &WallWalkerCameraOf), Without<LocomotionController>>,
    walkers: Query<(&Transform, &WallWalker, &LocomotionController)>,
) {
    for (mut camera_transform, camera_of) in cameras.iter_mut() {
        if let Ok((walker_transform, cfg, controller)) = walkers.get(camera_of.0) {
            camera_transform.translation =
                walker_transform.translation + controller.local_up * cfg.view_height;
        }
    }
}

/// Pitch stops just short of straight up or down, where yaw is undefined.
const MAX_PITCH: f32 = FRAC_PI_2 - 0.01;

/// Turns `rotation` by a look delta in degrees: `x` turns right, `y` looks down.
pub fn apply_look(rotation: Quat, delta_degrees: Vec2) -> Quat {
    let (yaw, pitch, _) = rotation.to_euler(EulerRot::YXZ);
    let yaw = yaw - delta_degrees.x.to_radians();
    let pitch = (pitch - delta_degrees.y.to_radians()).clamp(-MAX_PITCH, MAX_PITCH);
    Quat::from_euler(EulerRot::YXZ, yaw, pitch, 0.0)
}

fn rotate_camera(
    rotate: On<Fire<RotateCamera>>,
    walkers: Query<&WallWalkerCamera>,
    mut transforms: Query<&mut Transform>,
) {
    let Ok(camera) = walkers.get(rotate.context) else {
        return;
    };
    if let Ok(mut transform) = transforms.get_mut(camera.get()) {
        transform.rotation = apply_look(transform.rotation, rotate.value);
    }
}
