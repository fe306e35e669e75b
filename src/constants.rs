/// Bytes of addressable memory
pub const MEMORY_SIZE: usize = 4096;

/// All address arithmetic is confined to 12 bits
pub const ADDRESS_MASK: u16 = 0x0FFF;

/// Where programs are loaded and where the program counter starts
pub const PROGRAM_START: u16 = 0x200;

/// Maximum number of return addresses held by the call stack
pub const STACK_DEPTH: usize = 16;

pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;

/// Number of keys on the hexadecimal keypad
pub const KEY_COUNT: u8 = 16;

/// Bytes per glyph in the sprite sheet
pub const SPRITE_HEIGHT: u16 = 5;

/// Rate at which the delay and sound timers count down
pub const TIMER_FREQUENCY: u32 = 60;

/// Default CPU rate used by the runner
pub const CPU_FREQUENCY: u32 = 500;

/// Nanoseconds per CPU cycle at `CPU_FREQUENCY`
pub const CLOCK_SPEED: u64 = 1_000_000_000 / CPU_FREQUENCY as u64;

/// The timers should be decremented at 60Hz
/// - this is approximated as once every 8 CPU cycles at 500Hz
pub const CPU_CYCLES_PER_TIMER_CYCLE: u32 = CPU_FREQUENCY / TIMER_FREQUENCY;

/// # Sprite sheet
/// Hex digits 0..F drawn as 4x5 sprites, loaded at address 0x000.
/// Each glyph occupies 5 bytes so the glyph for digit `d` starts at `d * 5`.
#[rustfmt::skip]
pub const SPRITE_SHEET: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];
