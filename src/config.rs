//! Fixed configuration constants
//!
//! The pack is not field-configurable: LED counts, timings, pin
//! assignments (BOARD numbering), and clip paths are known at startup
//! and owned here by the wiring layer, not by the core.

use std::time::Duration;

/// Power cell LED bank, in fill order.
pub const POWER_CELL_PINS: [u8; 7] = [29, 31, 33, 37, 32, 36, 38];

/// Cyclotron LED ring, in rotation order.
pub const CYCLOTRON_PINS: [u8; 4] = [11, 7, 5, 3];

pub const POWER_SWITCH_PIN: u8 = 16;
pub const FIRE_BUTTON_PIN: u8 = 13;
pub const THEME_BUTTON_PIN: u8 = 15;

pub const POWER_UP_CLIP: &str = "power-up.wav";
pub const POWER_DOWN_CLIP: &str = "power-down.wav";
pub const FIRING_CLIP: &str = "firing-loop.wav";
pub const FIRING_RELEASE_CLIP: &str = "firing-shutdown.wav";
pub const THEME_CLIP: &str = "theme.wav";

/// Power cell self-advance interval.
pub const TICK_INTERVAL: Duration = Duration::from_millis(200);

/// Minimum time a sampled level must persist before an edge counts.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(200);

/// Timing knobs the controller consumes. Defaults are the production
/// values; tests shrink them.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub tick_interval: Duration,
    pub debounce_window: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            tick_interval: TICK_INTERVAL,
            debounce_window: DEBOUNCE_WINDOW,
        }
    }
}
