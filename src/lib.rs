//! Proton pack controller
//!
//! Reactive controller for a wearable proton pack prop: a sequential
//! power cell fill, a rotating cyclotron ring, and layered sound cues,
//! each run by its own state machine and fed clean events by a debounced
//! digital-input layer. Physical GPIO and audio playback sit behind the
//! capability traits in [`hal`].

pub mod cli;
pub mod config;
pub mod debounce;
pub mod error;
pub mod fsm;
pub mod hal;
pub mod machines;
pub mod router;

pub use error::HalError;
pub use router::Controller;
