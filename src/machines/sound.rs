//! Sound machine - layered audio cues
//!
//! Four states gate which clips play: power-up/power-down one-shots on
//! the off boundary, a looping firing clip with a release one-shot, and a
//! looping theme track. No timeouts; every transition comes from the
//! event router. At most one looping clip is active outside `Off`.

use std::sync::Arc;

use tracing::warn;

use crate::fsm::{MachineBuilder, Source, StateDef, StateMachine};
use crate::hal::{AudioClip, ClipSet};
use crate::machines::Trigger;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundState {
    Off,
    On,
    Firing,
    Theme,
}

pub type SoundHandle = StateMachine<SoundState, Trigger, SoundModel>;

pub struct SoundModel {
    clips: ClipSet,
}

impl SoundModel {
    /// Playback failures never fail the transition that asked for them.
    fn play_once(&self, clip: &Arc<dyn AudioClip>, cue: &str) {
        if let Err(e) = clip.play_once() {
            warn!(cue, error = %e, "audio cue failed");
        }
    }

    fn play_looping(&self, clip: &Arc<dyn AudioClip>, cue: &str) {
        if let Err(e) = clip.play_looping() {
            warn!(cue, error = %e, "audio loop failed to start");
        }
    }

    fn stop(&self, clip: &Arc<dyn AudioClip>, cue: &str) {
        if let Err(e) = clip.stop() {
            warn!(cue, error = %e, "audio loop failed to stop");
        }
    }
}

/// Build the sound machine in `Off`. Nothing plays at construction.
pub fn build(clips: ClipSet) -> SoundHandle {
    let model = SoundModel { clips };
    MachineBuilder::new()
        .state(
            StateDef::new(SoundState::Off)
                // Leaving Off means the pack just powered up; entering it
                // (from any state, exit hooks of the abandoned state run
                // first) means it just powered down.
                .on_exit(|m: &mut SoundModel| m.play_once(&m.clips.power_up, "power-up"))
                .on_enter(|m: &mut SoundModel| {
                    m.play_once(&m.clips.power_down, "power-down")
                }),
        )
        .state(StateDef::new(SoundState::On))
        .state(
            StateDef::new(SoundState::Firing)
                .on_enter(|m: &mut SoundModel| m.play_looping(&m.clips.firing, "firing"))
                .on_exit(|m: &mut SoundModel| {
                    m.stop(&m.clips.firing, "firing");
                    m.play_once(&m.clips.firing_release, "firing-release");
                }),
        )
        .state(
            StateDef::new(SoundState::Theme)
                .on_enter(|m: &mut SoundModel| m.play_looping(&m.clips.theme, "theme"))
                .on_exit(|m: &mut SoundModel| m.stop(&m.clips.theme, "theme")),
        )
        .transition(
            Trigger::SwitchOn,
            Source::Exact(SoundState::Off),
            SoundState::On,
        )
        .transition(
            Trigger::FirePress,
            Source::Exact(SoundState::On),
            SoundState::Firing,
        )
        .transition(
            Trigger::FireRelease,
            Source::Exact(SoundState::Firing),
            SoundState::On,
        )
        .transition(
            Trigger::ThemePress,
            Source::Exact(SoundState::On),
            SoundState::Theme,
        )
        .transition(
            Trigger::ThemeRelease,
            Source::Exact(SoundState::Theme),
            SoundState::On,
        )
        .transition(Trigger::SwitchOff, Source::Any, SoundState::Off)
        .build("sound", model, SoundState::Off)
}
