//! Hardware abstraction layer
//!
//! Capability traits the core is wired against. Physical GPIO and audio
//! decoding live behind these seams; the controller never touches pins or
//! files directly. All methods take `&self` so implementations can be
//! shared as `Arc<dyn ...>` across timer tasks - use interior mutability
//! for mutable backend state.

use std::sync::Arc;

use crate::error::HalError;

pub mod console;
pub mod mem;

pub use console::{ConsoleClip, ConsoleOutput};
pub use mem::{MemoryClip, MemoryInput, MemoryOutput};

/// Raw edge notification callback.
///
/// Invoked from the input backend's notification context (a GPIO interrupt
/// thread on real hardware) for *both* edge directions, without a level:
/// the debounce layer re-samples after the window instead of trusting the
/// level seen at notification time. Implementations must return quickly
/// and must never block.
pub type RawEdgeCallback = Arc<dyn Fn() + Send + Sync>;

/// One digital output line (an LED), indexed by logical position within a
/// machine's bank.
pub trait DigitalOutput: Send + Sync {
    /// Drive the line high (`true`) or low (`false`).
    fn set(&self, level: bool) -> Result<(), HalError>;
}

/// One digital input line (a button or switch, active-low with pull-up).
pub trait DigitalInput: Send + Sync {
    /// Sample the current level.
    fn read(&self) -> bool;

    /// Register a callback for raw (bouncy) edge notifications on both
    /// edge directions.
    fn subscribe(&self, callback: RawEdgeCallback);
}

/// One playable audio clip.
pub trait AudioClip: Send + Sync {
    /// Play the clip once; returns immediately, playback is asynchronous.
    fn play_once(&self) -> Result<(), HalError>;

    /// Play the clip in a loop until [`AudioClip::stop`] is called.
    fn play_looping(&self) -> Result<(), HalError>;

    /// Stop any active playback of this clip.
    fn stop(&self) -> Result<(), HalError>;
}

/// The five audio cues the sound machine layers together.
#[derive(Clone)]
pub struct ClipSet {
    pub power_up: Arc<dyn AudioClip>,
    pub power_down: Arc<dyn AudioClip>,
    pub firing: Arc<dyn AudioClip>,
    pub firing_release: Arc<dyn AudioClip>,
    pub theme: Arc<dyn AudioClip>,
}

/// Everything startup wiring hands to the controller: three buttons, two
/// LED banks, and the clip set. Produced once during initialization and
/// passed in explicitly - no ambient globals.
pub struct Hardware {
    pub power_switch: Arc<dyn DigitalInput>,
    pub fire_button: Arc<dyn DigitalInput>,
    pub theme_button: Arc<dyn DigitalInput>,
    pub power_cell_leds: Vec<Arc<dyn DigitalOutput>>,
    pub cyclotron_leds: Vec<Arc<dyn DigitalOutput>>,
    pub clips: ClipSet,
}
