use crate::constants::{
    ADDRESS_MASK, DISPLAY_HEIGHT, DISPLAY_WIDTH, SPRITE_HEIGHT, STACK_DEPTH,
};
use crate::error::{Error, Result};
use crate::quirks::Quirks;
use crate::state::State;

/// What the program counter should do once an operation has run
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Flow {
    /// Advance to the following instruction
    Next,
    /// Advance past the following instruction
    Skip,
    /// Continue at an explicit address; the automatic advance is suppressed
    Jump(u16),
    /// Stay on the current instruction so it is executed again next cycle
    Wait,
}

impl Flow {
    /// The program counter after applying this flow to `pc`
    pub fn next_pc(self, pc: u16) -> u16 {
        match self {
            Flow::Next => pc.wrapping_add(0x2) & ADDRESS_MASK,
            Flow::Skip => pc.wrapping_add(0x4) & ADDRESS_MASK,
            Flow::Jump(addr) => addr & ADDRESS_MASK,
            Flow::Wait => pc,
        }
    }
}

fn skip_if(condition: bool) -> Flow {
    if condition {
        Flow::Skip
    } else {
        Flow::Next
    }
}

/// clear
/// A screen that is already blank doesn't request a redraw
pub fn clr(state: &mut State) -> Flow {
    let lit = state.frame_buffer.iter().flatten().any(|&p| p != 0);
    state.frame_buffer = [[0; DISPLAY_WIDTH]; DISPLAY_HEIGHT];
    state.draw_flag |= lit;
    Flow::Next
}

/// PC = STACK.pop()
/// Resumes at the instruction following the CALL
pub fn rts(state: &mut State) -> Result<Flow> {
    if state.sp == 0 {
        return Err(Error::StackUnderflow {
            address: state.pc,
            opcode: 0x00EE,
        });
    }
    state.sp -= 1;
    Ok(Flow::Jump(state.stack[state.sp as usize].wrapping_add(0x2)))
}

/// PC = addr
pub fn jump(addr: u16) -> Flow {
    Flow::Jump(addr)
}

/// STACK.push(PC); PC = addr
pub fn call(state: &mut State, addr: u16) -> Result<Flow> {
    if state.sp as usize == STACK_DEPTH {
        return Err(Error::StackOverflow {
            address: state.pc,
            opcode: 0x2000 | addr,
        });
    }
    state.stack[state.sp as usize] = state.pc;
    state.sp += 1;
    Ok(Flow::Jump(addr))
}

/// if Vx == kk then pc += 2
pub fn ske(state: &State, x: u8, kk: u8) -> Flow {
    skip_if(state.v[x as usize] == kk)
}

/// if Vx != kk then pc += 2
pub fn skne(state: &State, x: u8, kk: u8) -> Flow {
    skip_if(state.v[x as usize] != kk)
}

/// if Vx == Vy then pc += 2
pub fn skre(state: &State, x: u8, y: u8) -> Flow {
    skip_if(state.v[x as usize] == state.v[y as usize])
}

/// Vx = kk
pub fn load(state: &mut State, x: u8, kk: u8) -> Flow {
    state.v[x as usize] = kk;
    Flow::Next
}

/// Vx += kk; VF = overflow
pub fn add(state: &mut State, x: u8, kk: u8, quirks: &Quirks) -> Flow {
    let (res, over) = state.v[x as usize].overflowing_add(kk);
    state.v[x as usize] = res;
    if quirks.carry_on_add_byte {
        state.v[0xF] = over as u8;
    }
    Flow::Next
}

/// Vx = Vy
pub fn mv(state: &mut State, x: u8, y: u8) -> Flow {
    state.v[x as usize] = state.v[y as usize];
    Flow::Next
}

/// Vx |= Vy
pub fn or(state: &mut State, x: u8, y: u8) -> Flow {
    state.v[x as usize] |= state.v[y as usize];
    Flow::Next
}

/// Vx &= Vy
pub fn and(state: &mut State, x: u8, y: u8) -> Flow {
    state.v[x as usize] &= state.v[y as usize];
    Flow::Next
}

/// Vx ^= Vy
pub fn xor(state: &mut State, x: u8, y: u8) -> Flow {
    state.v[x as usize] ^= state.v[y as usize];
    Flow::Next
}

/// Vx += Vy; VF = overflow
pub fn addr(state: &mut State, x: u8, y: u8) -> Flow {
    let (res, over) = state.v[x as usize].overflowing_add(state.v[y as usize]);
    state.v[x as usize] = res;
    state.v[0xF] = over as u8;
    Flow::Next
}

/// Vx -= Vy; VF = !underflow
pub fn sub(state: &mut State, x: u8, y: u8) -> Flow {
    let (res, under) = state.v[x as usize].overflowing_sub(state.v[y as usize]);
    state.v[x as usize] = res;
    state.v[0xF] = !under as u8;
    Flow::Next
}

/// Vx >>= 1; VF = shifted out bit
pub fn shr(state: &mut State, x: u8, y: u8, quirks: &Quirks) -> Flow {
    let source = if quirks.shift_reads_vy {
        state.v[y as usize]
    } else {
        state.v[x as usize]
    };
    state.v[x as usize] = source >> 1;
    state.v[0xF] = source & 0x1;
    Flow::Next
}

/// Vx = Vy - Vx; VF = !underflow
pub fn subn(state: &mut State, x: u8, y: u8) -> Flow {
    let (res, under) = state.v[y as usize].overflowing_sub(state.v[x as usize]);
    state.v[x as usize] = res;
    state.v[0xF] = !under as u8;
    Flow::Next
}

/// Vx <<= 1; VF = shifted out bit
pub fn shl(state: &mut State, x: u8, y: u8, quirks: &Quirks) -> Flow {
    let source = if quirks.shift_reads_vy {
        state.v[y as usize]
    } else {
        state.v[x as usize]
    };
    state.v[x as usize] = source << 1;
    state.v[0xF] = (source >> 7) & 0x1;
    Flow::Next
}

/// if Vx != Vy then pc +=2
pub fn skrne(state: &State, x: u8, y: u8) -> Flow {
    skip_if(state.v[x as usize] != state.v[y as usize])
}

/// I = addr
pub fn loadi(state: &mut State, addr: u16) -> Flow {
    state.i = addr;
    Flow::Next
}

/// PC = V0 + addr
pub fn jumpi(state: &State, addr: u16) -> Flow {
    Flow::Jump(u16::from(state.v[0x0]) + addr)
}

/// Vx = rand_byte & kk
pub fn rand(state: &mut State, x: u8, kk: u8) -> Flow {
    let rand_byte: u8 = rand::random();
    state.v[x as usize] = rand_byte & kk;
    Flow::Next
}

/// draw_sprite(x=Vx y=Vy size=n)
/// XORs a sprite from memory i..i+n at position x, y on the FrameBuffer.
/// The starting position wraps onto the screen; pixels running past the edge
/// are clipped unless quirks say otherwise.
/// Sets VF if any pixels were erased; only a flipped pixel requests a redraw
pub fn draw(state: &mut State, x: u8, y: u8, n: u8, quirks: &Quirks) -> Flow {
    let origin_x = state.v[x as usize] as usize % DISPLAY_WIDTH;
    let origin_y = state.v[y as usize] as usize % DISPLAY_HEIGHT;
    let mut collision = 0x0;
    let mut flipped = false;

    for byte in 0..n as usize {
        let mut row = origin_y + byte;
        if row >= DISPLAY_HEIGHT {
            if quirks.clip_sprites {
                break;
            }
            row %= DISPLAY_HEIGHT;
        }
        let sprite = state.read(state.i.wrapping_add(byte as u16));
        for bit in 0..8 {
            let mut col = origin_x + bit;
            if col >= DISPLAY_WIDTH {
                if quirks.clip_sprites {
                    break;
                }
                col %= DISPLAY_WIDTH;
            }
            let pixel_value = (sprite >> (7 - bit)) & 1;
            collision |= pixel_value & state.frame_buffer[row][col];
            flipped |= pixel_value != 0;
            state.frame_buffer[row][col] ^= pixel_value;
        }
    }

    state.v[0xF] = collision;
    state.draw_flag |= flipped;
    Flow::Next
}

/// if pressed == Vx then pc += 2
/// A matching key is consumed
pub fn skpr(state: &mut State, x: u8) -> Flow {
    if state.pressed_key == Some(state.v[x as usize]) {
        state.pressed_key = None;
        Flow::Skip
    } else {
        Flow::Next
    }
}

/// if pressed != Vx then pc += 2
/// A matching key is consumed
pub fn skup(state: &mut State, x: u8) -> Flow {
    if state.pressed_key == Some(state.v[x as usize]) {
        state.pressed_key = None;
        Flow::Next
    } else {
        Flow::Skip
    }
}

/// Vx = DT
pub fn moved(state: &mut State, x: u8) -> Flow {
    state.v[x as usize] = state.delay_timer;
    Flow::Next
}

/// await keypress for Vx
/// Holds the program counter in place until the key latch is set
pub fn keyd(state: &mut State, x: u8) -> Flow {
    match state.pressed_key.take() {
        Some(key) => {
            state.v[x as usize] = key;
            state.register_needing_key = None;
            Flow::Next
        }
        None => {
            state.register_needing_key = Some(x);
            Flow::Wait
        }
    }
}

/// DT = Vx
pub fn loads(state: &mut State, x: u8) -> Flow {
    state.delay_timer = state.v[x as usize];
    Flow::Next
}

/// ST = Vx
pub fn ld(state: &mut State, x: u8) -> Flow {
    state.sound_timer = state.v[x as usize];
    Flow::Next
}

/// I += Vx; VF = I left the address space
pub fn addi(state: &mut State, x: u8, quirks: &Quirks) -> Flow {
    let sum = state.i + u16::from(state.v[x as usize]);
    state.i = sum & ADDRESS_MASK;
    if quirks.index_overflow_flag {
        state.v[0xF] = (sum > ADDRESS_MASK) as u8;
    }
    Flow::Next
}

/// I = Vx * 5
/// Set I to the memory address of the sprite for Vx
/// See constants::SPRITE_SHEET for more details
pub fn ldspr(state: &mut State, x: u8) -> Flow {
    state.i = u16::from(state.v[x as usize]) * SPRITE_HEIGHT;
    Flow::Next
}

/// mem[I..I+3] = bcd(Vx)
/// Store BCD repr of Vx in memory starting at address i
pub fn bcd(state: &mut State, x: u8) -> Flow {
    let value = state.v[x as usize];
    let digits = [value / 100, value / 10 % 10, value % 10];
    for (offset, digit) in digits.iter().enumerate() {
        state.write(state.i.wrapping_add(offset as u16), *digit);
    }
    Flow::Next
}

/// mem[I..=I+x] = V0..=Vx
pub fn stor(state: &mut State, x: u8, quirks: &Quirks) -> Flow {
    for reg in 0..=x as usize {
        state.write(state.i.wrapping_add(reg as u16), state.v[reg]);
    }
    if quirks.load_store_increments_index {
        state.i = state.i.wrapping_add(u16::from(x) + 1) & ADDRESS_MASK;
    }
    Flow::Next
}

/// V0..=Vx = mem[I..=I+x]
pub fn read(state: &mut State, x: u8, quirks: &Quirks) -> Flow {
    for reg in 0..=x as usize {
        state.v[reg] = state.read(state.i.wrapping_add(reg as u16));
    }
    if quirks.load_store_increments_index {
        state.i = state.i.wrapping_add(u16::from(x) + 1) & ADDRESS_MASK;
    }
    Flow::Next
}

#[cfg(test)]
mod test_operations {
    use super::*;

    #[test]
    fn test_flow_next_pc() {
        assert_eq!(Flow::Next.next_pc(0x200), 0x202);
        assert_eq!(Flow::Skip.next_pc(0x200), 0x204);
        assert_eq!(Flow::Jump(0x345).next_pc(0x200), 0x345);
        assert_eq!(Flow::Wait.next_pc(0x200), 0x200);
    }

    #[test]
    fn test_flow_wraps_at_end_of_memory() {
        assert_eq!(Flow::Next.next_pc(0xFFE), 0x000);
        assert_eq!(Flow::Skip.next_pc(0xFFE), 0x002);
        assert_eq!(Flow::Jump(0x10FF).next_pc(0x200), 0x0FF);
    }

    #[test]
    fn test_add_without_carry_quirk_keeps_vf() {
        let mut state = State::new();
        let quirks = Quirks {
            carry_on_add_byte: false,
            ..Quirks::default()
        };
        state.v[0x1] = 0xFF;
        state.v[0xF] = 0x7;
        add(&mut state, 0x1, 0x2, &quirks);
        assert_eq!(state.v[0x1], 0x1);
        assert_eq!(state.v[0xF], 0x7);
    }

    #[test]
    fn test_shift_reads_vy_quirk() {
        let mut state = State::new();
        let quirks = Quirks {
            shift_reads_vy: true,
            ..Quirks::default()
        };
        state.v[0x1] = 0x0;
        state.v[0x2] = 0x81;
        shr(&mut state, 0x1, 0x2, &quirks);
        assert_eq!(state.v[0x1], 0x40);
        assert_eq!(state.v[0xF], 0x1);
        shl(&mut state, 0x1, 0x2, &quirks);
        assert_eq!(state.v[0x1], 0x02);
        assert_eq!(state.v[0xF], 0x1);
        assert_eq!(state.v[0x2], 0x81);
    }

    #[test]
    fn test_draw_wraps_without_clip_quirk() {
        let mut state = State::new();
        let quirks = Quirks {
            clip_sprites: false,
            ..Quirks::default()
        };
        state.i = 0x300;
        state.memory[0x300] = 0xFF;
        state.memory[0x301] = 0x80;
        state.v[0x0] = 60;
        state.v[0x1] = 31;
        draw(&mut state, 0x0, 0x1, 2, &quirks);
        assert_eq!(state.frame_buffer[31][60..64], [1, 1, 1, 1]);
        assert_eq!(state.frame_buffer[31][0..4], [1, 1, 1, 1]);
        assert_eq!(state.frame_buffer[0][60], 1);
    }

    #[test]
    fn test_draw_clips_at_edges() {
        let mut state = State::new();
        state.i = 0x300;
        state.memory[0x300] = 0xFF;
        state.memory[0x301] = 0xFF;
        state.v[0x0] = 60;
        state.v[0x1] = 31;
        draw(&mut state, 0x0, 0x1, 2, &Quirks::default());
        assert_eq!(state.frame_buffer[31][60..64], [1, 1, 1, 1]);
        assert_eq!(state.frame_buffer[31][0..4], [0, 0, 0, 0]);
        assert!(state.frame_buffer[0].iter().all(|&p| p == 0));
    }

    #[test]
    fn test_draw_wraps_starting_position() {
        let mut state = State::new();
        state.i = 0x300;
        state.memory[0x300] = 0x80;
        state.v[0x0] = 64 + 3;
        state.v[0x1] = 32 + 2;
        draw(&mut state, 0x0, 0x1, 1, &Quirks::default());
        assert_eq!(state.frame_buffer[2][3], 1);
    }

    #[test]
    fn test_draw_without_lit_pixels_keeps_redraw_clear() {
        let mut state = State::new();
        state.i = 0x300;
        draw(&mut state, 0x0, 0x0, 0, &Quirks::default());
        assert!(!state.draw_flag);
        // a sprite made of zero bytes flips nothing either
        draw(&mut state, 0x0, 0x0, 4, &Quirks::default());
        assert!(!state.draw_flag);
        assert_eq!(state.v[0xF], 0x0);
    }

    #[test]
    fn test_clr_on_blank_screen_keeps_redraw_clear() {
        let mut state = State::new();
        clr(&mut state);
        assert!(!state.draw_flag);
        state.frame_buffer[3][7] = 1;
        clr(&mut state);
        assert!(state.draw_flag);
    }

    #[test]
    fn test_addi_without_overflow_quirk_keeps_vf() {
        let mut state = State::new();
        let quirks = Quirks {
            index_overflow_flag: false,
            ..Quirks::default()
        };
        state.i = 0xFFF;
        state.v[0x1] = 0x2;
        state.v[0xF] = 0x5;
        addi(&mut state, 0x1, &quirks);
        assert_eq!(state.i, 0x001);
        assert_eq!(state.v[0xF], 0x5);
    }

    #[test]
    fn test_load_store_increment_quirk() {
        let mut state = State::new();
        let quirks = Quirks {
            load_store_increments_index: true,
            ..Quirks::default()
        };
        state.i = 0x300;
        state.v[0x0..0x3].copy_from_slice(&[0x1, 0x2, 0x3]);
        stor(&mut state, 0x2, &quirks);
        assert_eq!(state.i, 0x303);
        assert_eq!(state.memory[0x300..0x303], [0x1, 0x2, 0x3]);
        state.i = 0x300;
        state.v = [0; 16];
        read(&mut state, 0x2, &quirks);
        assert_eq!(state.i, 0x303);
        assert_eq!(state.v[0x0..0x3], [0x1, 0x2, 0x3]);
    }

    #[test]
    fn test_stor_wraps_at_end_of_memory() {
        let mut state = State::new();
        state.i = 0xFFF;
        state.v[0x0] = 0xAA;
        state.v[0x1] = 0xBB;
        stor(&mut state, 0x1, &Quirks::default());
        assert_eq!(state.memory[0xFFF], 0xAA);
        assert_eq!(state.memory[0x000], 0xBB);
    }
}
