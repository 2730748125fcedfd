//! Hardware-facing error types
//!
//! Failures from output and audio capabilities are never fatal to the
//! controller: machine hooks log them and keep going with the in-memory
//! model intact. `anyhow` wraps everything at the binary boundary.

use thiserror::Error;

/// Errors surfaced by hardware capability implementations
#[derive(Debug, Error)]
pub enum HalError {
    /// A digital output could not be driven to the requested level
    #[error("gpio write failed on pin {pin}: {reason}")]
    GpioWrite { pin: u8, reason: String },

    /// The audio backend rejected a playback command
    #[error("audio backend error for '{clip}': {reason}")]
    Audio { clip: String, reason: String },
}
