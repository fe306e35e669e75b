use std::io::Read;

use log::{debug, trace, warn};

use crate::constants::{KEY_COUNT, MEMORY_SIZE, PROGRAM_START};
use crate::error::Result;
use crate::instruction::{decode, Instruction};
use crate::quirks::Quirks;
use crate::state::{FrameBuffer, State};

/// # Chip-8
/// Chip-8 is a virtual machine and corresponding interpreted language.
///
/// Tracks:
///  - current `state`, which it exclusively owns
///  - the `quirks` it was configured with
///  - the length of the loaded program for disassembly
///
/// Supplies interfaces for:
/// - loading roms
/// - pressing and releasing keys
/// - advancing the CPU
/// - advancing its timers
/// - inspecting its frame buffer for rendering by some display
/// - disassembling the loaded program
pub struct Chip8 {
    state: State,
    quirks: Quirks,
    program_len: usize,
}

impl Chip8 {
    pub fn new() -> Self {
        Self::with_quirks(Quirks::default())
    }

    pub fn with_quirks(quirks: Quirks) -> Self {
        Chip8 {
            state: State::new(),
            quirks,
            program_len: 0,
        }
    }

    pub fn quirks(&self) -> &Quirks {
        &self.quirks
    }

    /// Read-only view of the machine
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Return the machine to its power-on state, forgetting any loaded program
    pub fn reset(&mut self) {
        self.state.reset();
        self.program_len = 0;
    }

    /// Load a program into memory at 0x200
    ///
    /// # Arguments
    /// * `program` the raw bytes of a ROM; there is no header
    pub fn load_program(&mut self, program: &[u8]) -> Result<()> {
        self.state.load_program(program)?;
        self.program_len = program.len();
        Ok(())
    }

    /// Load a rom from a source file
    ///
    /// # Arguments
    /// * `reader` a file reader that contains a ROM
    pub fn load_rom(&mut self, reader: &mut dyn Read) -> Result<()> {
        // one byte past capacity is enough to report an oversized ROM
        let limit = (MEMORY_SIZE - PROGRAM_START as usize + 1) as u64;
        let mut program = Vec::new();
        reader.take(limit).read_to_end(&mut program)?;
        self.load_program(&program)
    }

    /// Returns a copy of the FrameBuffer
    pub fn framebuffer(&self) -> FrameBuffer {
        self.state.frame_buffer
    }

    /// Whether the FrameBuffer has changed since `clear_redraw` was last called
    pub fn redraw_pending(&self) -> bool {
        self.state.draw_flag
    }

    pub fn clear_redraw(&mut self) {
        self.state.draw_flag = false;
    }

    /// Returns the FrameBuffer if the display should be redrawn
    pub fn get_frame(&self) -> Option<FrameBuffer> {
        if self.state.draw_flag {
            Some(self.state.frame_buffer)
        } else {
            None
        }
    }

    /// Sound should play for as long as this is true
    pub fn sound_active(&self) -> bool {
        self.state.sound_timer > 0
    }

    /// The register an `LD Vx, K` is waiting to fill, if any
    pub fn awaiting_key(&self) -> Option<u8> {
        self.state.register_needing_key
    }

    /// Set or clear the currently pressed key
    ///
    /// # Arguments
    /// * `key` the 4-bit representation of the pressed key, or `None` once released
    pub fn set_key_pressed(&mut self, key: Option<u8>) {
        match key {
            Some(k) if k >= KEY_COUNT => warn!("ignoring out of range key {:#04X}", k),
            _ => self.state.pressed_key = key,
        }
    }

    /// Set the pressed status of key
    ///
    /// # Arguments
    /// * `key` the 4-bit representation of the key that was pressed
    pub fn key_press(&mut self, key: u8) {
        self.set_key_pressed(Some(key));
    }

    /// Unset the pressed status of key
    ///
    /// # Arguments
    /// * `key` the 4-bit representation of the key that was released
    pub fn key_release(&mut self, key: u8) {
        if self.state.pressed_key == Some(key) {
            self.state.pressed_key = None;
        }
    }

    /// Advances the CPU by a single cycle
    /// - gets, decodes and executes the next opcode
    /// - moves the pc unless the instruction is waiting for a key
    ///
    /// Stack faults leave the machine untouched, with the pc still on the
    /// faulting instruction.
    pub fn step(&mut self) -> Result<Instruction> {
        let pc = self.state.pc;
        let op = self.get_op();
        let instruction = decode(op);
        trace!(
            "{:03X} {:04X} v{:02X?} i{:03X} {}",
            pc,
            op,
            self.state.v,
            self.state.i,
            instruction
        );
        if !instruction.is_valid() {
            warn!("skipping invalid opcode {:#06X} at {:#05X}", op, pc);
        }

        let flow = instruction.execute(&mut self.state, &self.quirks)?;
        self.state.pc = flow.next_pc(pc);
        Ok(instruction)
    }

    /// Decrements the delay and sound timers by one, stopping at zero.
    /// Meant to be called at 60Hz independently of `step`.
    pub fn tick_timers(&mut self) {
        self.state.delay_timer = self.state.delay_timer.saturating_sub(1);
        self.state.sound_timer = self.state.sound_timer.saturating_sub(1);
    }

    /// Every valid instruction in the loaded program along with its address
    ///
    /// Only the bytes of the last loaded image are walked (padded to a whole
    /// word); anything a running program writes past that image is data and is
    /// not listed. The iterator borrows memory lazily; call again to start over.
    pub fn dump(&self) -> Dump<'_> {
        let end = PROGRAM_START as usize + self.program_len + self.program_len % 2;
        Dump {
            memory: &self.state.memory,
            addr: PROGRAM_START as usize,
            end: end.min(MEMORY_SIZE),
        }
    }

    /// Assembly text for the loaded program
    pub fn disassemble(&self) -> Vec<(u16, String)> {
        debug!("disassembling {} byte program", self.program_len);
        self.dump()
            .map(|(addr, instruction)| (addr, instruction.to_string()))
            .collect()
    }

    /// Gets the opcode currently pointed at by the pc.
    /// Memory is stored as bytes, but opcodes are 16 bits so we combine two subsequent bytes.
    fn get_op(&self) -> u16 {
        let left = u16::from(self.state.read(self.state.pc));
        let right = u16::from(self.state.read(self.state.pc.wrapping_add(1)));
        left << 8 | right
    }
}

impl Default for Chip8 {
    fn default() -> Self {
        Self::new()
    }
}

/// Walks program memory two bytes at a time, skipping words that don't decode
#[derive(Clone)]
pub struct Dump<'a> {
    memory: &'a [u8; MEMORY_SIZE],
    addr: usize,
    end: usize,
}

impl<'a> Iterator for Dump<'a> {
    type Item = (u16, Instruction);

    fn next(&mut self) -> Option<Self::Item> {
        while self.addr + 1 < self.end {
            let addr = self.addr;
            self.addr += 2;
            let op = u16::from(self.memory[addr]) << 8 | u16::from(self.memory[addr + 1]);
            let instruction = decode(op);
            if instruction.is_valid() {
                return Some((addr as u16, instruction));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_chip8_gets_op() {
        let mut chip8 = Chip8::new();
        chip8.state.memory[0x200..0x202].copy_from_slice(&[0xAA, 0xBB]);
        assert_eq!(chip8.get_op(), 0xAABB);
    }

    #[test]
    fn test_chip8_gets_op_at_end_of_memory() {
        let mut chip8 = Chip8::new();
        chip8.state.pc = 0xFFF;
        chip8.state.memory[0xFFF] = 0x12;
        chip8.state.memory[0x000] = 0x34;
        assert_eq!(chip8.get_op(), 0x1234);
    }

    #[test]
    fn test_step_advances_pc() {
        let mut chip8 = Chip8::new();
        let starting_pc = chip8.state.pc;
        chip8.load_program(&[0x00, 0xE0]).unwrap();
        assert_eq!(chip8.step().unwrap(), Instruction::Clear);
        assert_eq!(chip8.state.pc, starting_pc + 0x2);
    }

    #[test]
    fn test_step_through_invalid_opcode() {
        let mut chip8 = Chip8::new();
        chip8.load_program(&[0xFF, 0xFF, 0x61, 0x07]).unwrap();
        chip8.step().unwrap();
        chip8.step().unwrap();
        assert_eq!(chip8.state.v[0x1], 0x07);
        assert_eq!(chip8.state.pc, 0x204);
    }

    #[test]
    fn test_doesnt_advance_while_waiting_for_key() {
        let mut chip8 = Chip8::new();
        chip8.load_program(&[0xF3, 0x0A]).unwrap();
        chip8.step().unwrap();
        chip8.step().unwrap();
        assert_eq!(chip8.state.pc, 0x200);
        assert_eq!(chip8.awaiting_key(), Some(0x3));
    }

    #[test]
    fn test_captures_key_presses() {
        let mut chip8 = Chip8::new();
        chip8.load_program(&[0xF3, 0x0A]).unwrap();
        chip8.step().unwrap();
        chip8.key_press(0xE);
        chip8.step().unwrap();
        assert_eq!(chip8.state.v[0x3], 0xE);
        assert_eq!(chip8.state.pc, 0x202);
        assert_eq!(chip8.awaiting_key(), None);
        assert_eq!(chip8.state.pressed_key, None);
    }

    #[test]
    fn test_ignores_out_of_range_key() {
        let mut chip8 = Chip8::new();
        chip8.key_press(0x3);
        chip8.set_key_pressed(Some(0x10));
        assert_eq!(chip8.state.pressed_key, Some(0x3));
    }

    #[test]
    fn test_key_release_only_clears_matching_key() {
        let mut chip8 = Chip8::new();
        chip8.key_press(0x3);
        chip8.key_release(0x4);
        assert_eq!(chip8.state.pressed_key, Some(0x3));
        chip8.key_release(0x3);
        assert_eq!(chip8.state.pressed_key, None);
    }

    #[test]
    fn test_fault_leaves_state_alone() {
        let mut chip8 = Chip8::new();
        chip8.load_program(&[0x00, 0xEE]).unwrap();
        assert!(matches!(
            chip8.step(),
            Err(Error::StackUnderflow {
                address: 0x200,
                opcode: 0x00EE
            })
        ));
        assert_eq!(chip8.state.pc, 0x200);
    }

    #[test]
    fn test_timers_tick_independently_of_steps() {
        let mut chip8 = Chip8::new();
        chip8.state.delay_timer = 0x2;
        chip8.state.sound_timer = 0x1;
        assert!(chip8.sound_active());
        chip8.tick_timers();
        assert_eq!(chip8.state.delay_timer, 0x1);
        assert_eq!(chip8.state.sound_timer, 0x0);
        assert!(!chip8.sound_active());
        chip8.tick_timers();
        chip8.tick_timers();
        assert_eq!(chip8.state.delay_timer, 0x0);
        assert_eq!(chip8.state.sound_timer, 0x0);
    }

    #[test]
    fn test_get_frame_follows_draw_flag() {
        let mut chip8 = Chip8::new();
        assert!(chip8.get_frame().is_none());
        chip8.load_program(&[0xD0, 0x15]).unwrap();
        chip8.step().unwrap();
        assert!(chip8.redraw_pending());
        assert_eq!(chip8.get_frame().unwrap()[0][0], 1);
        chip8.clear_redraw();
        assert!(chip8.get_frame().is_none());
        assert_eq!(chip8.framebuffer()[0][0], 1);
    }

    #[test]
    fn test_empty_draw_requests_no_redraw() {
        let mut chip8 = Chip8::new();
        chip8.load_program(&[0xD0, 0x00, 0x00, 0xE0]).unwrap();
        chip8.step().unwrap();
        assert!(!chip8.redraw_pending());
        chip8.step().unwrap();
        assert!(!chip8.redraw_pending());
        assert!(chip8.get_frame().is_none());
    }

    #[test]
    fn test_reset_forgets_program() {
        let mut chip8 = Chip8::new();
        chip8.load_program(&[0x00, 0xE0]).unwrap();
        chip8.reset();
        assert_eq!(chip8.dump().count(), 0);
        assert_eq!(chip8.state.memory[0x201], 0x0);
    }

    #[test]
    fn test_dump_skips_invalid_words() {
        let mut chip8 = Chip8::new();
        chip8
            .load_program(&[0x00, 0xE0, 0x00, 0x00, 0xFF, 0xFF, 0x12, 0x00])
            .unwrap();
        let dumped: Vec<_> = chip8.dump().collect();
        assert_eq!(
            dumped,
            vec![
                (0x200, Instruction::Clear),
                (0x206, Instruction::Jump { addr: 0x200 })
            ]
        );
    }

    #[test]
    fn test_dump_pads_odd_length_program() {
        let mut chip8 = Chip8::new();
        chip8.load_program(&[0x00, 0xE0, 0x12]).unwrap();
        let dumped: Vec<_> = chip8.dump().collect();
        assert_eq!(
            dumped,
            vec![
                (0x200, Instruction::Clear),
                (0x202, Instruction::Jump { addr: 0x000 })
            ]
        );
    }

    #[test]
    fn test_dump_restarts() {
        let mut chip8 = Chip8::new();
        chip8.load_program(&[0x00, 0xE0, 0x00, 0xEE]).unwrap();
        let dump = chip8.dump();
        assert_eq!(dump.clone().count(), 2);
        assert_eq!(dump.count(), 2);
        assert_eq!(chip8.dump().count(), 2);
    }

    #[test]
    fn test_disassemble() {
        let mut chip8 = Chip8::new();
        chip8.load_program(&[0x61, 0x22, 0xA2, 0x0A]).unwrap();
        assert_eq!(
            chip8.disassemble(),
            vec![
                (0x200, "LD V1, 0x22".to_string()),
                (0x202, "LD I, 0x20A".to_string())
            ]
        );
    }
}
