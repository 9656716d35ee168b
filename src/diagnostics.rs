//! Per-tick diagnostics for inspecting a walker's decisions.
//!
//! Every walker writes one [`LocomotionDiagnostic`] per channel per fixed tick.
//! Add a [`LocomotionReadout`] to a walker to keep the latest values around, e.g.
//! for an on-screen debug overlay.

use core::fmt;

use crate::prelude::*;

pub(super) fn plugin(app: &mut App) {
    app.add_message::<LocomotionDiagnostic>()
        .add_systems(Update, update_readouts);
}

#[derive(Message, Clone, Copy, Debug, PartialEq)]
pub struct LocomotionDiagnostic {
    pub entity: Entity,
    pub value: DiagnosticValue,
}

/// One value per diagnostic channel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DiagnosticValue {
    Grounded(bool),
    LocalUp(Vec3),
    Speed(f32),
    FacingUp(bool),
    YawInverted(bool),
    Yaw(f32),
}

/// Latest diagnostic values of the walker it is attached to.
#[derive(Component, Clone, Copy, Reflect, Default, Debug, PartialEq)]
#[reflect(Component)]
pub struct LocomotionReadout {
    pub grounded: bool,
    pub local_up: Vec3,
    pub speed: f32,
    pub facing_up: bool,
    pub yaw_inverted: bool,
    pub yaw: f32,
}

impl LocomotionReadout {
    pub fn apply(&mut self, value: DiagnosticValue) {
        match value {
            DiagnosticValue::Grounded(grounded) => self.grounded = grounded,
            DiagnosticValue::LocalUp(local_up) => self.local_up = local_up,
            DiagnosticValue::Speed(speed) => self.speed = speed,
            DiagnosticValue::FacingUp(facing_up) => self.facing_up = facing_up,
            DiagnosticValue::YawInverted(yaw_inverted) => self.yaw_inverted = yaw_inverted,
            DiagnosticValue::Yaw(yaw) => self.yaw = yaw,
        }
    }
}

fn flag(value: bool) -> &'static str {
    if value { "T" } else { "F" }
}

impl fmt::Display for LocomotionReadout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "R Up: {}", self.local_up)?;
        writeln!(f, "Grounded: {}", flag(self.grounded))?;
        writeln!(f, "Speed: {}", self.speed)?;
        writeln!(f, "Facing Up: {}", flag(self.facing_up))?;
        writeln!(f, "Yaw Inverted Up: {}", flag(self.yaw_inverted))?;
        write!(f, "Yaw: {}", self.yaw)
    }
}

fn update_readouts(
    mut diagnostics: MessageReader<LocomotionDiagnostic>,
    mut readouts: Query<&mut LocomotionReadout>,
) {
    for diagnostic in diagnostics.read() {
        let Ok(mut readout) = readouts.get_mut(diagnostic.entity) else {
            continue;
        };
        readout.apply(diagnostic.value);
    }
}
