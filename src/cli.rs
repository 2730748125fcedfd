//! Interactive input simulator REPL
//!
//! Drives the controller on a dev box with no pack attached: commands
//! inject raw edges into in-memory inputs, which then flow through the
//! same debounce path as real switch hardware. That means a command only
//! takes effect after the debounce window elapses, exactly like a
//! physical press.

use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use rustyline::DefaultEditor;

use crate::hal::MemoryInput;
use crate::router::Controller;

/// The three simulated buttons. Levels start high (released, pull-up).
pub struct SimInputs {
    pub power: Arc<MemoryInput>,
    pub fire: Arc<MemoryInput>,
    pub theme: Arc<MemoryInput>,
}

impl SimInputs {
    pub fn new() -> Self {
        Self {
            power: MemoryInput::new(true),
            fire: MemoryInput::new(true),
            theme: MemoryInput::new(true),
        }
    }
}

impl Default for SimInputs {
    fn default() -> Self {
        Self::new()
    }
}

pub async fn run_repl(controller: &Controller, inputs: &SimInputs) -> Result<()> {
    let mut rl = DefaultEditor::new()?;

    println!("{}", "=== Proton Pack Input Simulator ===".bold().cyan());
    print_help();

    loop {
        let readline = rl.readline("pack> ");
        match readline {
            Ok(line) => {
                let line = line.trim().to_lowercase();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);

                // Buttons are active-low: "on"/"press" pulls the line low.
                match line.split_whitespace().collect::<Vec<_>>().as_slice() {
                    ["power", "on"] => inputs.power.set_level(false),
                    ["power", "off"] => inputs.power.set_level(true),
                    ["fire", "press"] => inputs.fire.set_level(false),
                    ["fire", "release"] => inputs.fire.set_level(true),
                    ["theme", "press"] => inputs.theme.set_level(false),
                    ["theme", "release"] => inputs.theme.set_level(true),
                    ["state"] => println!("{}", controller.status().green()),
                    ["help"] => print_help(),
                    ["exit"] | ["quit"] => break,
                    _ => println!("{} {}", "unknown command:".red(), line),
                }
            }
            Err(_) => break,
        }
    }

    Ok(())
}

fn print_help() {
    println!("{}", "Commands:".bold());
    println!("  power on|off       toggle the main switch");
    println!("  fire press|release hold or release the trigger");
    println!("  theme press|release");
    println!("  state              show machine states");
    println!("  help, quit");
    println!(
        "{}",
        "(edges settle after the 200 ms debounce window)".dimmed()
    );
}
