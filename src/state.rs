use log::debug;

use crate::constants::{
    ADDRESS_MASK, DISPLAY_HEIGHT, DISPLAY_WIDTH, MEMORY_SIZE, PROGRAM_START, SPRITE_SHEET,
    STACK_DEPTH,
};
use crate::error::{Error, Result};

/// The FrameBuffer is indexed as [y][x]
pub type FrameBuffer = [[u8; DISPLAY_WIDTH]; DISPLAY_HEIGHT];

/// A snapshot of the Chip8 internal state
///
/// ## CPU
/// Registers
/// - (v) 16 primary 8-bit registers (V0..VF)
///     - VF doubles as the carry, borrow and collision flag
/// - (i) a 16-bit memory address register
///
/// Counter
/// - (pc) a 16-bit program counter
///
/// Pointer
/// - (sp) the number of return addresses currently on the stack
///
/// Timers
/// - 2 8-bit timers (delay & sound)
/// - Sound is audible for as long as the sound timer is non-zero
///
/// ## Memory
/// - 16 slot stack
///     - stores return addresses when subroutines are called
/// - 4096 bytes of addressable memory
///     - 0x000..0x200 holds the sprite sheet
///     - 0x200..0x1000 holds the program and its working data
/// - 32x64 frame buffer
///     - stores the contents of the next frame to be drawn
///
/// ## Input
/// - a single latch holding the currently pressed key, if any
/// - Emulation may halt until a key's value is written to some register
#[derive(Copy, Clone)]
pub struct State {
    pub(crate) v: [u8; 16],
    pub(crate) i: u16,
    pub(crate) pc: u16,
    pub(crate) sp: u8,
    pub(crate) delay_timer: u8,
    pub(crate) sound_timer: u8,
    pub(crate) stack: [u16; STACK_DEPTH],
    pub(crate) memory: [u8; MEMORY_SIZE],
    pub(crate) frame_buffer: FrameBuffer,
    pub(crate) draw_flag: bool,
    pub(crate) pressed_key: Option<u8>,
    pub(crate) register_needing_key: Option<u8>,
}

impl State {
    pub fn new() -> Self {
        // 0x000 - 0x050 is reserved for a sprite sheet
        let mut memory = [0; MEMORY_SIZE];
        memory[0..SPRITE_SHEET.len()].copy_from_slice(&SPRITE_SHEET);

        State {
            v: [0; 16],
            i: 0,
            pc: PROGRAM_START,
            sp: 0,
            delay_timer: 0,
            sound_timer: 0,
            stack: [0; STACK_DEPTH],
            memory,
            frame_buffer: [[0; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
            draw_flag: false,
            pressed_key: None,
            register_needing_key: None,
        }
    }

    /// Return to power-on state: memory, registers, stack, timers,
    /// display and keypad are cleared and the sprite sheet is reloaded.
    pub fn reset(&mut self) {
        debug!("resetting machine state");
        *self = State::new();
    }

    /// Copy a program into memory starting at `PROGRAM_START`.
    ///
    /// Any bytes left in the program area by a previous load are zeroed.
    /// Fails without touching memory if the program doesn't fit.
    ///
    /// # Arguments
    /// * `program` the raw bytes of a ROM
    pub fn load_program(&mut self, program: &[u8]) -> Result<()> {
        let start = PROGRAM_START as usize;
        let capacity = MEMORY_SIZE - start;
        if program.len() > capacity {
            return Err(Error::ProgramTooLarge {
                size: program.len(),
                capacity,
            });
        }

        self.memory[start..].iter_mut().for_each(|b| *b = 0);
        self.memory[start..start + program.len()].copy_from_slice(program);
        debug!("loaded {} byte program at {:#05X}", program.len(), start);
        Ok(())
    }

    /// The general purpose registers V0..VF
    pub fn v(&self) -> &[u8; 16] {
        &self.v
    }

    pub fn i(&self) -> u16 {
        self.i
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    /// Return addresses from the oldest call to the most recent
    pub fn stack(&self) -> &[u16] {
        &self.stack[..self.sp as usize]
    }

    pub fn memory(&self) -> &[u8; MEMORY_SIZE] {
        &self.memory
    }

    pub fn frame_buffer(&self) -> &FrameBuffer {
        &self.frame_buffer
    }

    pub fn pressed_key(&self) -> Option<u8> {
        self.pressed_key
    }

    /// Reads the byte at `addr`, confined to the 12-bit address space
    pub(crate) fn read(&self, addr: u16) -> u8 {
        self.memory[(addr & ADDRESS_MASK) as usize]
    }

    /// Writes `byte` to `addr`, confined to the 12-bit address space
    pub(crate) fn write(&mut self, addr: u16, byte: u8) {
        self.memory[(addr & ADDRESS_MASK) as usize] = byte;
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}
