use crate::prelude::*;

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<FixedStepRan>()
        .add_observer(apply_movement)
        .add_systems(PreUpdate, |mut ran: ResMut<FixedStepRan>| **ran = false)
        .add_systems(FixedPreUpdate, |mut ran: ResMut<FixedStepRan>| **ran = true)
        .add_systems(
            RunFixedMainLoop,
            clear_accumulated_input
                .run_if(fixed_step_ran)
                .in_set(RunFixedMainLoopSystems::AfterFixedMainLoop),
        );
}

/// Whether a fixed step consumed the latched input during the current frame.
///
/// Input arrives once per frame but is read once per fixed step. A frame may run zero or several
/// steps, so the latch is only reset after at least one of them saw it.
#[derive(Resource, Debug, Default, Deref, DerefMut)]
pub(crate) struct FixedStepRan(bool);

fn fixed_step_ran(ran: Res<FixedStepRan>) -> bool {
    **ran
}

/// Strafe on `x`, forward on `y`.
#[derive(Debug, InputAction)]
#[action_output(Vec2)]
pub struct Movement;

#[derive(Debug, InputAction)]
#[action_output(Vec2)]
pub struct RotateCamera;

/// Movement latched for the next fixed step.
#[derive(Component, Clone, Reflect, Default, Debug)]
#[reflect(Component)]
pub struct AccumulatedInput {
    /// Latest movement fired this frame, `None` when no key is held.
    pub last_movement: Option<Vec2>,
}

fn apply_movement(movement: On<Fire<Movement>>, mut inputs: Query<&mut AccumulatedInput>) {
    if let Ok(mut input) = inputs.get_mut(movement.context) {
        input.last_movement = Some(movement.value);
    }
}

fn clear_accumulated_input(mut inputs: Query<&mut AccumulatedInput>) {
    for mut input in &mut inputs {
        input.last_movement = None;
    }
}
