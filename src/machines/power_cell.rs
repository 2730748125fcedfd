//! Power cell machine - sequential LED fill-and-reset
//!
//! The only machine with its own clock: `Running` re-enters itself every
//! tick interval via the engine timeout, advancing the fill by one. On
//! the advance that would overflow the bank it first cascades an
//! `Increment` into the cyclotron, then wraps to empty.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::fsm::{MachineBuilder, Source, StateDef, StateMachine};
use crate::hal::DigitalOutput;
use crate::machines::{CyclotronHandle, Trigger};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerCellState {
    Off,
    Running,
}

pub type PowerCellHandle = StateMachine<PowerCellState, Trigger, PowerCellModel>;

pub struct PowerCellModel {
    /// Number of LEDs lit, 0..=bank size, monotonically cycling.
    lit_count: usize,
    leds: Vec<Arc<dyn DigitalOutput>>,
    cyclotron: CyclotronHandle,
}

impl PowerCellModel {
    pub fn lit_count(&self) -> usize {
        self.lit_count
    }

    fn advance(&mut self) {
        if self.lit_count == self.leds.len() {
            // Overflow: exactly one cascade per full cycle, on this
            // advance and never on the first entry after SwitchOn.
            self.cyclotron.fire(Trigger::Increment);
            self.lit_count = 0;
        } else {
            self.lit_count += 1;
        }
        debug!(lit = self.lit_count, "power cell advance");
        self.apply();
    }

    fn dim_all(&mut self) {
        debug!("power cell is off");
        self.lit_count = 0;
        self.apply();
    }

    /// Reset-then-set: the whole bank is rewritten on every update, so an
    /// interrupted previous update cannot leave a stale pattern.
    fn apply(&self) {
        for (index, led) in self.leds.iter().enumerate() {
            if let Err(e) = led.set(index < self.lit_count) {
                warn!(index, error = %e, "power cell LED write failed");
            }
        }
    }
}

/// Build the power cell in `Off` with all LEDs dark. `tick` is the
/// self-advance interval while `Running`.
pub fn build(
    leds: Vec<Arc<dyn DigitalOutput>>,
    cyclotron: CyclotronHandle,
    tick: Duration,
) -> PowerCellHandle {
    let model = PowerCellModel {
        lit_count: 0,
        leds,
        cyclotron,
    };
    MachineBuilder::new()
        .state(StateDef::new(PowerCellState::Off).on_enter(PowerCellModel::dim_all))
        .state(
            StateDef::new(PowerCellState::Running)
                .on_enter(PowerCellModel::advance)
                .timeout(tick, Trigger::Increment),
        )
        .transition(
            Trigger::SwitchOn,
            Source::Exact(PowerCellState::Off),
            PowerCellState::Running,
        )
        .transition(
            Trigger::Increment,
            Source::Exact(PowerCellState::Running),
            PowerCellState::Running,
        )
        .transition(Trigger::SwitchOff, Source::Any, PowerCellState::Off)
        .build("power_cell", model, PowerCellState::Off)
}
