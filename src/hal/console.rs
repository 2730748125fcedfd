//! Console backend - logs all hardware effects for development
//!
//! Useful for running the controller on a dev box without a pack strapped
//! on: LED writes and audio cues show up as log lines instead of photons
//! and sound pressure.

use tracing::{debug, info};

use crate::error::HalError;
use crate::hal::{AudioClip, DigitalOutput};

/// A digital output that logs level changes, labelled with the BOARD pin
/// number it stands in for.
pub struct ConsoleOutput {
    pin: u8,
    bank: &'static str,
}

impl ConsoleOutput {
    pub fn new(bank: &'static str, pin: u8) -> Self {
        Self { pin, bank }
    }
}

impl DigitalOutput for ConsoleOutput {
    fn set(&self, level: bool) -> Result<(), HalError> {
        debug!(bank = self.bank, pin = self.pin, level, "gpio write");
        Ok(())
    }
}

/// An audio clip that logs playback commands, labelled with the clip path
/// it stands in for.
pub struct ConsoleClip {
    path: String,
}

impl ConsoleClip {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl AudioClip for ConsoleClip {
    fn play_once(&self) -> Result<(), HalError> {
        info!(clip = %self.path, "🔊 play once");
        Ok(())
    }

    fn play_looping(&self) -> Result<(), HalError> {
        info!(clip = %self.path, "🔊 play looping");
        Ok(())
    }

    fn stop(&self) -> Result<(), HalError> {
        info!(clip = %self.path, "🔇 stop");
        Ok(())
    }
}
