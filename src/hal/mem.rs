//! In-memory backend - inspectable hardware doubles
//!
//! Used by the input simulator REPL and by tests. `MemoryInput` delivers
//! raw edge callbacks synchronously from `set_level`, which makes it easy
//! to replay bouncy switch traces through the real debounce path.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::HalError;
use crate::hal::{AudioClip, DigitalInput, DigitalOutput, RawEdgeCallback};

/// A digital output that just remembers its level.
#[derive(Default)]
pub struct MemoryOutput {
    level: AtomicBool,
}

impl MemoryOutput {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Current driven level.
    pub fn level(&self) -> bool {
        self.level.load(Ordering::Acquire)
    }
}

impl DigitalOutput for MemoryOutput {
    fn set(&self, level: bool) -> Result<(), HalError> {
        self.level.store(level, Ordering::Release);
        Ok(())
    }
}

/// A digital input whose level is set programmatically.
///
/// Every `set_level` call notifies subscribers, even when the level does
/// not change - real switches chatter the same way, and the debounce
/// layer is expected to absorb it.
pub struct MemoryInput {
    level: AtomicBool,
    subscribers: Mutex<Vec<RawEdgeCallback>>,
}

impl MemoryInput {
    pub fn new(initial: bool) -> Arc<Self> {
        Arc::new(Self {
            level: AtomicBool::new(initial),
            subscribers: Mutex::new(Vec::new()),
        })
    }

    /// Set the sampled level and fire a raw edge notification.
    pub fn set_level(&self, level: bool) {
        self.level.store(level, Ordering::Release);
        let subscribers = self.subscribers.lock().clone();
        for callback in subscribers {
            callback();
        }
    }
}

impl DigitalInput for MemoryInput {
    fn read(&self) -> bool {
        self.level.load(Ordering::Acquire)
    }

    fn subscribe(&self, callback: RawEdgeCallback) {
        self.subscribers.lock().push(callback);
    }
}

/// An audio clip that counts playback commands.
#[derive(Default)]
pub struct MemoryClip {
    plays: AtomicUsize,
    stops: AtomicUsize,
    looping: AtomicBool,
}

impl MemoryClip {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Number of one-shot plays issued.
    pub fn play_count(&self) -> usize {
        self.plays.load(Ordering::Acquire)
    }

    /// Number of stop commands issued.
    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::Acquire)
    }

    /// Whether a looping playback is currently active.
    pub fn is_looping(&self) -> bool {
        self.looping.load(Ordering::Acquire)
    }
}

impl AudioClip for MemoryClip {
    fn play_once(&self) -> Result<(), HalError> {
        self.plays.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    fn play_looping(&self) -> Result<(), HalError> {
        self.looping.store(true, Ordering::Release);
        Ok(())
    }

    fn stop(&self) -> Result<(), HalError> {
        self.looping.store(false, Ordering::Release);
        self.stops.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }
}
