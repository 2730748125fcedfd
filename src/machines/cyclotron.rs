//! Cyclotron machine - single-LED round-robin
//!
//! Never advances on its own: each step comes from the power cell's
//! overflow cascade (or `SwitchOn`, which counts as the first advance).

use std::sync::Arc;

use tracing::{debug, warn};

use crate::fsm::{MachineBuilder, Source, StateDef, StateMachine};
use crate::hal::DigitalOutput;
use crate::machines::Trigger;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CyclotronState {
    Off,
    Running,
}

pub type CyclotronHandle = StateMachine<CyclotronState, Trigger, CyclotronModel>;

pub struct CyclotronModel {
    /// `None` while off (no LED lit); `SwitchOn` advances it to 0.
    lit: Option<usize>,
    leds: Vec<Arc<dyn DigitalOutput>>,
}

impl CyclotronModel {
    /// Index of the lit LED, 0 when off.
    pub fn lit_index(&self) -> usize {
        self.lit.unwrap_or(0)
    }

    pub fn lit(&self) -> Option<usize> {
        self.lit
    }

    fn advance(&mut self) {
        let next = match self.lit {
            None => 0,
            Some(index) => (index + 1) % self.leds.len(),
        };
        self.lit = Some(next);
        debug!(led = next, "cyclotron advance");
        self.apply();
    }

    fn dim_all(&mut self) {
        debug!("cyclotron is off");
        self.lit = None;
        self.apply();
    }

    /// Clear-then-set: every LED is written on every update, so a
    /// previously interrupted update cannot leave two LEDs lit.
    fn apply(&self) {
        for (index, led) in self.leds.iter().enumerate() {
            if let Err(e) = led.set(self.lit == Some(index)) {
                warn!(index, error = %e, "cyclotron LED write failed");
            }
        }
    }
}

/// Build the cyclotron in `Off` with all LEDs dark.
pub fn build(leds: Vec<Arc<dyn DigitalOutput>>) -> CyclotronHandle {
    let model = CyclotronModel { lit: None, leds };
    MachineBuilder::new()
        .state(StateDef::new(CyclotronState::Off).on_enter(CyclotronModel::dim_all))
        .state(StateDef::new(CyclotronState::Running).on_enter(CyclotronModel::advance))
        .transition(
            Trigger::SwitchOn,
            Source::Exact(CyclotronState::Off),
            CyclotronState::Running,
        )
        .transition(
            Trigger::Increment,
            Source::Exact(CyclotronState::Running),
            CyclotronState::Running,
        )
        .transition(Trigger::SwitchOff, Source::Any, CyclotronState::Off)
        .build("cyclotron", model, CyclotronState::Off)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::MemoryOutput;

    fn bank(n: usize) -> (Vec<Arc<MemoryOutput>>, Vec<Arc<dyn DigitalOutput>>) {
        let outputs: Vec<_> = (0..n).map(|_| MemoryOutput::new()).collect();
        let dyns = outputs
            .iter()
            .map(|o| Arc::clone(o) as Arc<dyn DigitalOutput>)
            .collect();
        (outputs, dyns)
    }

    fn lit_indices(outputs: &[Arc<MemoryOutput>]) -> Vec<usize> {
        outputs
            .iter()
            .enumerate()
            .filter(|(_, o)| o.level())
            .map(|(i, _)| i)
            .collect()
    }

    #[tokio::test]
    async fn switch_on_lights_index_zero() {
        let (outputs, dyns) = bank(4);
        let cyclotron = build(dyns);

        cyclotron.fire(Trigger::SwitchOn);
        assert_eq!(cyclotron.current_state(), CyclotronState::Running);
        assert_eq!(cyclotron.model(|m| m.lit()), Some(0));
        assert_eq!(lit_indices(&outputs), vec![0]);
    }

    #[tokio::test]
    async fn increments_rotate_with_exactly_one_led_lit() {
        let (outputs, dyns) = bank(4);
        let cyclotron = build(dyns);

        cyclotron.fire(Trigger::SwitchOn);
        for k in 1..=9usize {
            cyclotron.fire(Trigger::Increment);
            assert_eq!(cyclotron.model(|m| m.lit()), Some(k % 4));
            assert_eq!(lit_indices(&outputs), vec![k % 4]);
        }
    }

    #[tokio::test]
    async fn switch_off_is_idempotent() {
        let (outputs, dyns) = bank(4);
        let cyclotron = build(dyns);

        cyclotron.fire(Trigger::SwitchOn);
        cyclotron.fire(Trigger::Increment);
        cyclotron.fire(Trigger::SwitchOff);
        assert_eq!(cyclotron.current_state(), CyclotronState::Off);
        assert_eq!(cyclotron.model(|m| m.lit_index()), 0);
        assert!(lit_indices(&outputs).is_empty());

        // Again from Off: same observable result.
        cyclotron.fire(Trigger::SwitchOff);
        assert_eq!(cyclotron.current_state(), CyclotronState::Off);
        assert_eq!(cyclotron.model(|m| m.lit_index()), 0);
        assert!(lit_indices(&outputs).is_empty());
    }

    #[tokio::test]
    async fn increment_while_off_is_a_noop() {
        let (outputs, dyns) = bank(4);
        let cyclotron = build(dyns);

        cyclotron.fire(Trigger::Increment);
        assert_eq!(cyclotron.current_state(), CyclotronState::Off);
        assert!(lit_indices(&outputs).is_empty());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// After a fresh SwitchOn, K increments leave index K mod N lit.
            #[test]
            fn lit_index_is_increment_count_mod_len(k in 0usize..64) {
                let rt = tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .unwrap();
                let _guard = rt.enter();

                let (outputs, dyns) = bank(4);
                let cyclotron = build(dyns);

                cyclotron.fire(Trigger::SwitchOn);
                for _ in 0..k {
                    cyclotron.fire(Trigger::Increment);
                }

                prop_assert_eq!(cyclotron.model(|m| m.lit()), Some(k % 4));
                prop_assert_eq!(lit_indices(&outputs), vec![k % 4]);
            }
        }
    }
}
