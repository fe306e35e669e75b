use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Context;
use log::{error, info};

use emu8::{Chip8, Quirks, CLOCK_SPEED};

/// How a headless run is paced
pub struct Settings {
    /// CPU cycles to execute before stopping
    pub cycles: u64,
    /// CPU cycles between each timer decrement
    pub cycles_per_tick: u32,
    /// A keypad key held down for the whole run
    pub held_key: Option<u8>,
    /// Whether the default clock speed should be respected
    pub realtime: bool,
}

/// Creates a Chip-8 and loads a ROM into it
pub fn load(rom: &Path, quirks: Quirks) -> anyhow::Result<Chip8> {
    let mut chip8: Chip8 = Chip8::with_quirks(quirks);

    let file = File::open(rom).with_context(|| format!("unable to open {}", rom.display()))?;
    let mut reader = BufReader::new(file);
    chip8
        .load_rom(&mut reader)
        .with_context(|| format!("unable to load {}", rom.display()))?;
    info!("successfully loaded ROM {}", rom.display());

    Ok(chip8)
}

/// Runs a ROM for a fixed number of cycles with no display attached
///
/// Stops early on a stack fault, reporting where it happened.
pub fn run(rom: &Path, quirks: Quirks, settings: &Settings) -> anyhow::Result<Chip8> {
    let mut chip8 = load(rom, quirks)?;

    // Set initial timing
    let cycle_time: Duration = Duration::from_nanos(CLOCK_SPEED);
    let mut last_cycle: Instant = Instant::now();

    for cycle in 1..=settings.cycles {
        // Keys are consumed by the instructions that observe them
        if let Some(key) = settings.held_key {
            chip8.key_press(key);
        }

        if let Err(e) = chip8.step() {
            error!("halted on cycle {}: {}", cycle, e);
            return Err(e).context("program halted");
        }

        if cycle % u64::from(settings.cycles_per_tick) == 0 {
            chip8.tick_timers();
        }

        // Handle timing
        if settings.realtime {
            let current_time = Instant::now();
            let elapsed_cycle_time = current_time - last_cycle;
            if cycle_time > elapsed_cycle_time {
                std::thread::sleep(cycle_time - elapsed_cycle_time);
            }
            last_cycle = Instant::now();
        }
    }

    Ok(chip8)
}
