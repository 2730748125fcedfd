//! The three state machines driving the pack
//!
//! Each machine owns its LED bank or clip set exclusively; no two
//! machines ever write the same output. The power cell cascades into the
//! cyclotron on overflow - that is the only cross-machine coupling.

pub mod cyclotron;
pub mod power_cell;
pub mod sound;

pub use cyclotron::CyclotronHandle;
pub use power_cell::PowerCellHandle;
pub use sound::SoundHandle;

/// Logical triggers shared across all three machines. Each machine
/// declares transitions only for the triggers it understands; the rest
/// are no-ops by the engine's default behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    SwitchOn,
    SwitchOff,
    Increment,
    FirePress,
    FireRelease,
    ThemePress,
    ThemeRelease,
}
