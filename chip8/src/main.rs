use std::path::PathBuf;

use clap::Parser;

use emu8::constants::CPU_CYCLES_PER_TIMER_CYCLE;
use emu8::Quirks;

mod display;
mod keymap;
mod run;

/// Runs a Chip-8 ROM without a window and prints the final screen,
/// or prints its disassembly.
#[derive(Parser, Debug)]
#[command(name = "chip8", version)]
struct Args {
    /// Path to a ROM file
    rom: PathBuf,

    /// Print the program's instructions instead of running it
    #[arg(long)]
    disassemble: bool,

    /// CPU cycles to run
    #[arg(long, default_value_t = 5_000)]
    cycles: u64,

    /// CPU cycles per 60Hz timer tick
    #[arg(long, default_value_t = CPU_CYCLES_PER_TIMER_CYCLE, value_parser = clap::value_parser!(u32).range(1..))]
    cycles_per_tick: u32,

    /// Keyboard key (QWERTY layout, e.g. `q`) held down for the whole run
    #[arg(long, value_parser = keymap::parse_key)]
    hold: Option<u8>,

    /// Respect the 500Hz clock instead of running flat out
    #[arg(long)]
    realtime: bool,

    /// Start from the original COSMAC VIP behavior rather than the modern defaults
    #[arg(long)]
    cosmac: bool,

    /// ADD Vx, byte leaves VF alone
    #[arg(long)]
    no_add_carry: bool,

    /// Shifts read Vy
    #[arg(long)]
    shift_vy: bool,

    /// Sprites wrap around the screen edge
    #[arg(long)]
    wrap_sprites: bool,

    /// ADD I, Vx leaves VF alone
    #[arg(long)]
    no_index_overflow: bool,

    /// LD [I], Vx and LD Vx, [I] advance I
    #[arg(long)]
    increment_index: bool,
}

impl Args {
    fn quirks(&self) -> Quirks {
        let mut quirks = if self.cosmac {
            Quirks::cosmac_vip()
        } else {
            Quirks::default()
        };
        quirks.carry_on_add_byte &= !self.no_add_carry;
        quirks.shift_reads_vy |= self.shift_vy;
        quirks.clip_sprites &= !self.wrap_sprites;
        quirks.index_overflow_flag &= !self.no_index_overflow;
        quirks.load_store_increments_index |= self.increment_index;
        quirks
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let quirks = args.quirks();

    if args.disassemble {
        let chip8 = run::load(&args.rom, quirks)?;
        for (addr, instruction) in chip8.dump() {
            println!("{:03X}  {:04X}  {}", addr, instruction.opcode(), instruction);
        }
        return Ok(());
    }

    let settings = run::Settings {
        cycles: args.cycles,
        cycles_per_tick: args.cycles_per_tick,
        held_key: args.hold,
        realtime: args.realtime,
    };
    let chip8 = run::run(&args.rom, quirks, &settings)?;

    print!("{}", display::frame_to_text(&chip8.framebuffer()));
    println!(
        "pc {:03X}  sound {}",
        chip8.state().pc(),
        if chip8.sound_active() { "on" } else { "off" }
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_quirks() {
        let args = Args::parse_from(["chip8", "rom.ch8"]);
        assert_eq!(args.quirks(), Quirks::default());
        assert_eq!(args.cycles_per_tick, 8);
        assert_eq!(args.hold, None);
    }

    #[test]
    fn test_quirk_flags() {
        let args = Args::parse_from(["chip8", "rom.ch8", "--wrap-sprites", "--shift-vy"]);
        let quirks = args.quirks();
        assert!(!quirks.clip_sprites);
        assert!(quirks.shift_reads_vy);
        assert!(quirks.carry_on_add_byte);
    }

    #[test]
    fn test_cosmac_flag() {
        let args = Args::parse_from(["chip8", "rom.ch8", "--cosmac"]);
        assert_eq!(args.quirks(), Quirks::cosmac_vip());
    }

    #[test]
    fn test_hold_parses_keymap() {
        let args = Args::parse_from(["chip8", "rom.ch8", "--hold", "v"]);
        assert_eq!(args.hold, Some(0xF));
    }

    #[test]
    fn test_rejects_zero_cycles_per_tick() {
        assert!(Args::try_parse_from(["chip8", "rom.ch8", "--cycles-per-tick", "0"]).is_err());
    }
}
