//! Event router - binds the three buttons to the three machines
//!
//! The power switch broadcasts on/off to every machine; the fire and
//! theme buttons drive the sound machine only. Buttons are active-low
//! (pulled up), so a falling edge is a press/close and a rising edge is
//! a release/open. The broadcast order (cyclotron, power cell, sound) is
//! fixed but carries no cross-machine ordering guarantee - each machine's
//! off/reset writes are idempotent.

use std::sync::Arc;

use anyhow::{ensure, Result};
use tracing::{debug, info};

use crate::config::ControllerConfig;
use crate::debounce::{DebouncedInput, EdgeHandlers};
use crate::hal::Hardware;
use crate::machines::{cyclotron, power_cell, sound, Trigger};
use crate::machines::{CyclotronHandle, PowerCellHandle, SoundHandle};

/// The wired controller: three machines plus the debounced inputs that
/// feed them. Lives for the process lifetime.
pub struct Controller {
    cyclotron: CyclotronHandle,
    power_cell: PowerCellHandle,
    sound: SoundHandle,
    /// Kept alive so the debounce subscriptions outlive wiring.
    _inputs: Vec<DebouncedInput>,
}

impl Controller {
    /// Build the machines and bind the debounced inputs. This is the only
    /// place allowed to fail the process, and only at startup.
    pub fn wire(config: &ControllerConfig, hw: Hardware) -> Result<Self> {
        ensure!(
            !hw.power_cell_leds.is_empty(),
            "power cell LED bank is empty"
        );
        ensure!(!hw.cyclotron_leds.is_empty(), "cyclotron LED ring is empty");

        let cyclotron = cyclotron::build(hw.cyclotron_leds);
        let power_cell = power_cell::build(hw.power_cell_leds, cyclotron.clone(), config.tick_interval);
        let sound = sound::build(hw.clips);

        let power_input = DebouncedInput::attach(
            "power-switch",
            hw.power_switch,
            config.debounce_window,
            EdgeHandlers {
                falling: {
                    let (c, p, s) = (cyclotron.clone(), power_cell.clone(), sound.clone());
                    Arc::new(move || {
                        debug!("power switch closed");
                        c.fire(Trigger::SwitchOn);
                        p.fire(Trigger::SwitchOn);
                        s.fire(Trigger::SwitchOn);
                    })
                },
                rising: {
                    let (c, p, s) = (cyclotron.clone(), power_cell.clone(), sound.clone());
                    Arc::new(move || {
                        debug!("power switch opened");
                        c.fire(Trigger::SwitchOff);
                        p.fire(Trigger::SwitchOff);
                        s.fire(Trigger::SwitchOff);
                    })
                },
            },
        );

        let fire_input = DebouncedInput::attach(
            "fire-button",
            hw.fire_button,
            config.debounce_window,
            EdgeHandlers {
                falling: {
                    let s = sound.clone();
                    Arc::new(move || {
                        debug!("fire pressed");
                        s.fire(Trigger::FirePress);
                    })
                },
                rising: {
                    let s = sound.clone();
                    Arc::new(move || {
                        debug!("fire released");
                        s.fire(Trigger::FireRelease);
                    })
                },
            },
        );

        let theme_input = DebouncedInput::attach(
            "theme-button",
            hw.theme_button,
            config.debounce_window,
            EdgeHandlers {
                falling: {
                    let s = sound.clone();
                    Arc::new(move || {
                        debug!("theme pressed");
                        s.fire(Trigger::ThemePress);
                    })
                },
                rising: {
                    let s = sound.clone();
                    Arc::new(move || {
                        debug!("theme released");
                        s.fire(Trigger::ThemeRelease);
                    })
                },
            },
        );

        info!("controller wired: 3 machines, 3 debounced inputs");

        Ok(Self {
            cyclotron,
            power_cell,
            sound,
            _inputs: vec![power_input, fire_input, theme_input],
        })
    }

    pub fn cyclotron(&self) -> &CyclotronHandle {
        &self.cyclotron
    }

    pub fn power_cell(&self) -> &PowerCellHandle {
        &self.power_cell
    }

    pub fn sound(&self) -> &SoundHandle {
        &self.sound
    }

    /// Human-readable snapshot of all three machines, for the REPL.
    pub fn status(&self) -> String {
        format!(
            "power_cell: {:?}, {} LEDs lit\ncyclotron: {:?}, lit LED {:?}\nsound: {:?}",
            self.power_cell.current_state(),
            self.power_cell.model(|m| m.lit_count()),
            self.cyclotron.current_state(),
            self.cyclotron.model(|m| m.lit()),
            self.sound.current_state(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::{
        AudioClip, ClipSet, DigitalInput, DigitalOutput, MemoryClip, MemoryInput, MemoryOutput,
    };
    use crate::machines::cyclotron::CyclotronState;
    use crate::machines::power_cell::PowerCellState;
    use crate::machines::sound::SoundState;
    use std::time::Duration;

    const WINDOW: Duration = Duration::from_millis(200);

    struct Rig {
        power: Arc<MemoryInput>,
        fire: Arc<MemoryInput>,
        theme: Arc<MemoryInput>,
        power_cell_leds: Vec<Arc<MemoryOutput>>,
        cyclotron_leds: Vec<Arc<MemoryOutput>>,
        power_up: Arc<MemoryClip>,
        power_down: Arc<MemoryClip>,
        firing: Arc<MemoryClip>,
        firing_release: Arc<MemoryClip>,
        controller: Controller,
    }

    fn rig() -> Rig {
        let power = MemoryInput::new(true);
        let fire = MemoryInput::new(true);
        let theme = MemoryInput::new(true);

        let power_cell_leds: Vec<_> = (0..7).map(|_| MemoryOutput::new()).collect();
        let cyclotron_leds: Vec<_> = (0..4).map(|_| MemoryOutput::new()).collect();

        let power_up = MemoryClip::new();
        let power_down = MemoryClip::new();
        let firing = MemoryClip::new();
        let firing_release = MemoryClip::new();
        let theme_clip = MemoryClip::new();

        let hw = Hardware {
            power_switch: Arc::clone(&power) as Arc<dyn DigitalInput>,
            fire_button: Arc::clone(&fire) as Arc<dyn DigitalInput>,
            theme_button: Arc::clone(&theme) as Arc<dyn DigitalInput>,
            power_cell_leds: power_cell_leds
                .iter()
                .map(|o| Arc::clone(o) as Arc<dyn DigitalOutput>)
                .collect(),
            cyclotron_leds: cyclotron_leds
                .iter()
                .map(|o| Arc::clone(o) as Arc<dyn DigitalOutput>)
                .collect(),
            clips: ClipSet {
                power_up: Arc::clone(&power_up) as Arc<dyn AudioClip>,
                power_down: Arc::clone(&power_down) as Arc<dyn AudioClip>,
                firing: Arc::clone(&firing) as Arc<dyn AudioClip>,
                firing_release: Arc::clone(&firing_release) as Arc<dyn AudioClip>,
                theme: Arc::clone(&theme_clip) as Arc<dyn AudioClip>,
            },
        };

        let config = ControllerConfig {
            tick_interval: Duration::from_millis(200),
            debounce_window: WINDOW,
        };
        let controller = Controller::wire(&config, hw).expect("wiring failed");

        Rig {
            power,
            fire,
            theme,
            power_cell_leds,
            cyclotron_leds,
            power_up,
            power_down,
            firing,
            firing_release,
            controller,
        }
    }

    async fn settle() {
        tokio::time::sleep(WINDOW + Duration::from_millis(10)).await;
    }

    fn all_low(outputs: &[Arc<MemoryOutput>]) -> bool {
        outputs.iter().all(|o| !o.level())
    }

    #[tokio::test(start_paused = true)]
    async fn power_switch_broadcasts_to_all_three_machines() {
        let rig = rig();

        rig.power.set_level(false);
        settle().await;

        assert_eq!(rig.controller.power_cell().current_state(), PowerCellState::Running);
        assert_eq!(rig.controller.cyclotron().current_state(), CyclotronState::Running);
        assert_eq!(rig.controller.sound().current_state(), SoundState::On);
        assert_eq!(rig.power_up.play_count(), 1);

        rig.power.set_level(true);
        settle().await;

        assert_eq!(rig.controller.power_cell().current_state(), PowerCellState::Off);
        assert_eq!(rig.controller.cyclotron().current_state(), CyclotronState::Off);
        assert_eq!(rig.controller.sound().current_state(), SoundState::Off);
        assert_eq!(rig.power_down.play_count(), 1);
        assert!(all_low(&rig.power_cell_leds));
        assert!(all_low(&rig.cyclotron_leds));
    }

    #[tokio::test(start_paused = true)]
    async fn fire_button_only_reaches_the_sound_machine() {
        let rig = rig();

        rig.power.set_level(false);
        settle().await;
        let cell_state = rig.controller.power_cell().current_state();

        rig.fire.set_level(false);
        settle().await;

        assert_eq!(rig.controller.sound().current_state(), SoundState::Firing);
        assert!(rig.firing.is_looping());
        assert_eq!(rig.controller.power_cell().current_state(), cell_state);
        // The cyclotron only moves on the power cell's cascade, and not
        // enough ticks have elapsed for one.
        assert_eq!(rig.controller.cyclotron().model(|m| m.lit()), Some(0));
    }

    #[tokio::test(start_paused = true)]
    async fn theme_button_gates_the_theme_loop() {
        let rig = rig();

        rig.power.set_level(false);
        settle().await;

        rig.theme.set_level(false);
        settle().await;
        assert_eq!(rig.controller.sound().current_state(), SoundState::Theme);

        rig.theme.set_level(true);
        settle().await;
        assert_eq!(rig.controller.sound().current_state(), SoundState::On);
    }

    /// The end-to-end sequence from the bench checklist: power on, one
    /// trigger pull, power off.
    #[tokio::test(start_paused = true)]
    async fn power_fire_release_power_off_scenario() {
        let rig = rig();

        rig.power.set_level(false);
        settle().await;
        assert_eq!(rig.controller.sound().current_state(), SoundState::On);
        assert_eq!(rig.power_up.play_count(), 1);

        rig.fire.set_level(false);
        settle().await;
        assert_eq!(rig.controller.sound().current_state(), SoundState::Firing);
        assert!(rig.firing.is_looping());

        rig.fire.set_level(true);
        settle().await;
        assert_eq!(rig.controller.sound().current_state(), SoundState::On);
        assert!(!rig.firing.is_looping());
        assert_eq!(rig.firing_release.play_count(), 1);

        rig.power.set_level(true);
        settle().await;
        assert_eq!(rig.controller.power_cell().current_state(), PowerCellState::Off);
        assert_eq!(rig.controller.cyclotron().current_state(), CyclotronState::Off);
        assert_eq!(rig.controller.sound().current_state(), SoundState::Off);
        assert!(all_low(&rig.power_cell_leds));
        assert!(all_low(&rig.cyclotron_leds));
        assert_eq!(rig.power_up.play_count(), 1);
        assert_eq!(rig.power_down.play_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn power_cell_ticks_cascade_into_the_cyclotron() {
        let rig = rig();

        rig.power.set_level(false);
        settle().await;
        assert_eq!(rig.controller.cyclotron().model(|m| m.lit()), Some(0));

        // Entry lit 1 LED; seven more ticks overflow the 7-LED bank once.
        tokio::time::sleep(Duration::from_millis(200 * 7 + 50)).await;
        assert_eq!(rig.controller.cyclotron().model(|m| m.lit()), Some(1));
    }

    #[tokio::test]
    async fn wiring_rejects_an_empty_led_bank() {
        let power = MemoryInput::new(true);
        let clip = MemoryClip::new();
        let hw = Hardware {
            power_switch: Arc::clone(&power) as Arc<dyn DigitalInput>,
            fire_button: MemoryInput::new(true) as Arc<dyn DigitalInput>,
            theme_button: MemoryInput::new(true) as Arc<dyn DigitalInput>,
            power_cell_leds: Vec::new(),
            cyclotron_leds: vec![MemoryOutput::new() as Arc<dyn DigitalOutput>],
            clips: ClipSet {
                power_up: Arc::clone(&clip) as Arc<dyn AudioClip>,
                power_down: Arc::clone(&clip) as Arc<dyn AudioClip>,
                firing: Arc::clone(&clip) as Arc<dyn AudioClip>,
                firing_release: Arc::clone(&clip) as Arc<dyn AudioClip>,
                theme: Arc::clone(&clip) as Arc<dyn AudioClip>,
            },
        };

        assert!(Controller::wire(&ControllerConfig::default(), hw).is_err());
    }
}
