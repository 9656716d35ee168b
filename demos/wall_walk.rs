//! A closed room: walk off the floor onto the walls and up onto the ceiling.

use avian3d::prelude::*;
use bevy::{
    input::common_conditions::input_just_pressed,
    prelude::*,
    window::{CursorGrabMode, CursorOptions},
};
use bevy_enhanced_input::prelude::*;
use bevy_wallwalk::prelude::*;

fn main() -> AppExit {
    App::new()
        .add_plugins((
            DefaultPlugins,
            PhysicsPlugins::default(),
            EnhancedInputPlugin,
            WallWalkPlugin::default(),
        ))
        .add_input_context::<PlayerInput>()
        .add_systems(Startup, (setup, setup_ui))
        .add_systems(
            Update,
            (
                update_debug_text,
                capture_cursor.run_if(input_just_pressed(MouseButton::Left)),
                release_cursor.run_if(input_just_pressed(KeyCode::Escape)),
            ),
        )
        .run()
}

#[derive(PhysicsLayer, Default)]
enum GameLayer {
    #[default]
    Default,
    Environment,
}

#[derive(Component, Default)]
struct PlayerInput;

#[derive(Component)]
struct DebugText;

const ROOM_SIZE: f32 = 12.0;
const WALL_THICKNESS: f32 = 0.5;

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let player = commands
        .spawn((
            WallWalker {
                filter: SpatialQueryFilter::from_mask(GameLayer::Environment),
                ..default()
            },
            // Diagnostics for the debug text
            LocomotionReadout::default(),
            CollisionLayers::new(GameLayer::Default, [GameLayer::Default, GameLayer::Environment]),
            Transform::from_xyz(0.0, 0.3, 0.0),
            Mesh3d(meshes.add(Sphere::new(0.25))),
            MeshMaterial3d(materials.add(Color::srgb(0.9, 0.4, 0.2))),
            PlayerInput,
            actions!(PlayerInput[
                (
                    Action::<Movement>::new(),
                    DeadZone::default(),
                    Bindings::spawn((
                        Cardinal::wasd_keys(),
                        Axial::left_stick()
                    ))
                ),
                (
                    Action::<RotateCamera>::new(),
                    Bindings::spawn((
                        Spawn((Binding::mouse_motion(), Scale::splat(0.07))),
                        Axial::right_stick().with((Scale::splat(4.0), DeadZone::default())),
                    ))
                ),
            ]),
        ))
        .id();

    commands.spawn((Camera3d::default(), WallWalkerCameraOf(player)));

    commands.spawn((
        Transform::from_xyz(0.0, 1.0, 0.0).looking_at(vec3(1.0, -2.0, -2.0), Vec3::Y),
        DirectionalLight {
            shadows_enabled: true,
            ..default()
        },
    ));

    let half = ROOM_SIZE / 2.0;
    let offset = half + WALL_THICKNESS / 2.0;
    let slab = Vec3::new(ROOM_SIZE, WALL_THICKNESS, ROOM_SIZE);
    let side = Vec3::new(WALL_THICKNESS, ROOM_SIZE, ROOM_SIZE);
    let end = Vec3::new(ROOM_SIZE, ROOM_SIZE, WALL_THICKNESS);
    let material = materials.add(Color::srgb(0.6, 0.65, 0.7));
    for (translation, size) in [
        (vec3(0.0, -WALL_THICKNESS / 2.0, 0.0), slab),
        (vec3(0.0, ROOM_SIZE + WALL_THICKNESS / 2.0, 0.0), slab),
        (vec3(offset, half, 0.0), side),
        (vec3(-offset, half, 0.0), side),
        (vec3(0.0, half, offset), end),
        (vec3(0.0, half, -offset), end),
    ] {
        commands.spawn((
            RigidBody::Static,
            Collider::cuboid(size.x, size.y, size.z),
            CollisionLayers::new(GameLayer::Environment, LayerMask::ALL),
            Mesh3d(meshes.add(Cuboid::from_size(size))),
            MeshMaterial3d(material.clone()),
            Transform::from_translation(translation),
        ));
    }

    // a ramp to climb the first wall without jumping straight onto it
    commands.spawn((
        RigidBody::Static,
        Collider::cuboid(4.0, WALL_THICKNESS, 3.0),
        CollisionLayers::new(GameLayer::Environment, LayerMask::ALL),
        Mesh3d(meshes.add(Cuboid::new(4.0, WALL_THICKNESS, 3.0))),
        MeshMaterial3d(material),
        Transform::from_xyz(half - 1.4, 1.4, 0.0)
            .with_rotation(Quat::from_rotation_z(45_f32.to_radians())),
    ));
}

fn setup_ui(mut commands: Commands) {
    commands.spawn((
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(10.0),
            left: Val::Px(10.0),
            ..default()
        },
        Text::default(),
        DebugText,
    ));
}

fn update_debug_text(
    mut text: Single<&mut Text, With<DebugText>>,
    readout: Single<&LocomotionReadout>,
) {
    text.0 = readout.to_string();
}

fn capture_cursor(mut cursor: Single<&mut CursorOptions>) {
    cursor.grab_mode = CursorGrabMode::Locked;
    cursor.visible = false;
}

fn release_cursor(mut cursor: Single<&mut CursorOptions>) {
    cursor.visible = true;
    cursor.grab_mode = CursorGrabMode::None;
}
