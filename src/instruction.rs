use std::fmt;

use crate::error::Result;
use crate::opcode::Opcode;
use crate::operations::{self, Flow};
use crate::quirks::Quirks;
use crate::state::State;

/// # Instruction
/// A decoded opcode: which operation to run and the operands it was encoded with.
///
/// Decoding is total. Words that don't name an operation become `Invalid`,
/// which executes as a no-op so trailing data in a ROM never stops playback.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Instruction {
    /// 00E0 CLS
    Clear,
    /// 00EE RET
    Return,
    /// 1nnn JP addr
    Jump { addr: u16 },
    /// 2nnn CALL addr
    Call { addr: u16 },
    /// 3xkk SE Vx, byte
    SkipEqualByte { x: u8, kk: u8 },
    /// 4xkk SNE Vx, byte
    SkipNotEqualByte { x: u8, kk: u8 },
    /// 5xyn SE Vx, Vy
    /// `n` is ignored but kept so the word re-encodes
    SkipEqualRegister { x: u8, y: u8, n: u8 },
    /// 6xkk LD Vx, byte
    LoadByte { x: u8, kk: u8 },
    /// 7xkk ADD Vx, byte
    AddByte { x: u8, kk: u8 },
    /// 8xy0 LD Vx, Vy
    Move { x: u8, y: u8 },
    /// 8xy1 OR Vx, Vy
    Or { x: u8, y: u8 },
    /// 8xy2 AND Vx, Vy
    And { x: u8, y: u8 },
    /// 8xy3 XOR Vx, Vy
    Xor { x: u8, y: u8 },
    /// 8xy4 ADD Vx, Vy
    AddRegister { x: u8, y: u8 },
    /// 8xy5 SUB Vx, Vy
    Sub { x: u8, y: u8 },
    /// 8xy6 SHR Vx {, Vy}
    ShiftRight { x: u8, y: u8 },
    /// 8xy7 SUBN Vx, Vy
    SubNegated { x: u8, y: u8 },
    /// 8xyE SHL Vx {, Vy}
    ShiftLeft { x: u8, y: u8 },
    /// 9xyn SNE Vx, Vy
    SkipNotEqualRegister { x: u8, y: u8, n: u8 },
    /// Annn LD I, addr
    LoadIndex { addr: u16 },
    /// Bnnn JP V0, addr
    JumpOffset { addr: u16 },
    /// Cxkk RND Vx, byte
    Random { x: u8, kk: u8 },
    /// Dxyn DRW Vx, Vy, nibble
    Draw { x: u8, y: u8, n: u8 },
    /// Ex9E SKP Vx
    SkipPressed { x: u8 },
    /// ExA1 SKNP Vx
    SkipNotPressed { x: u8 },
    /// Fx07 LD Vx, DT
    LoadDelay { x: u8 },
    /// Fx0A LD Vx, K
    AwaitKey { x: u8 },
    /// Fx15 LD DT, Vx
    SetDelay { x: u8 },
    /// Fx18 LD ST, Vx
    SetSound { x: u8 },
    /// Fx1E ADD I, Vx
    AddIndex { x: u8 },
    /// Fx29 LD F, Vx
    LoadSprite { x: u8 },
    /// Fx33 LD B, Vx
    StoreBcd { x: u8 },
    /// Fx55 LD [I], Vx
    StoreRegisters { x: u8 },
    /// Fx65 LD Vx, [I]
    LoadRegisters { x: u8 },
    /// Anything else, carrying the original word for diagnostics
    Invalid { opcode: u16 },
}

/// Selects the correct Instruction for a given Opcode
///
/// Families overlap under naive masking, so matching is ordered:
/// - full word for CLS and RET
/// - most significant nibble alone for 0x1..0x7 and 0x9..0xD
/// - least significant nibble within 0x8
/// - least significant byte within 0xE and 0xF
pub fn decode(op: u16) -> Instruction {
    use Instruction::*;

    let (x, y, n, kk, addr) = (op.x(), op.y(), op.n(), op.kk(), op.addr());
    match op.nibbles() {
        (0x0, 0x0, 0xE, 0x0) => Clear,
        (0x0, 0x0, 0xE, 0xE) => Return,
        (0x1, ..) => Jump { addr },
        (0x2, ..) => Call { addr },
        (0x3, ..) => SkipEqualByte { x, kk },
        (0x4, ..) => SkipNotEqualByte { x, kk },
        (0x5, ..) => SkipEqualRegister { x, y, n },
        (0x6, ..) => LoadByte { x, kk },
        (0x7, ..) => AddByte { x, kk },
        (0x9, ..) => SkipNotEqualRegister { x, y, n },
        (0xA, ..) => LoadIndex { addr },
        (0xB, ..) => JumpOffset { addr },
        (0xC, ..) => Random { x, kk },
        (0xD, ..) => Draw { x, y, n },
        (0x8, .., 0x0) => Move { x, y },
        (0x8, .., 0x1) => Or { x, y },
        (0x8, .., 0x2) => And { x, y },
        (0x8, .., 0x3) => Xor { x, y },
        (0x8, .., 0x4) => AddRegister { x, y },
        (0x8, .., 0x5) => Sub { x, y },
        (0x8, .., 0x6) => ShiftRight { x, y },
        (0x8, .., 0x7) => SubNegated { x, y },
        (0x8, .., 0xE) => ShiftLeft { x, y },
        (0xE, _, 0x9, 0xE) => SkipPressed { x },
        (0xE, _, 0xA, 0x1) => SkipNotPressed { x },
        (0xF, _, 0x0, 0x7) => LoadDelay { x },
        (0xF, _, 0x0, 0xA) => AwaitKey { x },
        (0xF, _, 0x1, 0x5) => SetDelay { x },
        (0xF, _, 0x1, 0x8) => SetSound { x },
        (0xF, _, 0x1, 0xE) => AddIndex { x },
        (0xF, _, 0x2, 0x9) => LoadSprite { x },
        (0xF, _, 0x3, 0x3) => StoreBcd { x },
        (0xF, _, 0x5, 0x5) => StoreRegisters { x },
        (0xF, _, 0x6, 0x5) => LoadRegisters { x },
        _ => Invalid { opcode: op },
    }
}

impl From<u16> for Instruction {
    fn from(op: u16) -> Self {
        decode(op)
    }
}

fn xy(family: u16, x: u8, y: u8, n: u16) -> u16 {
    family | u16::from(x) << 8 | u16::from(y) << 4 | n
}

fn xkk(family: u16, x: u8, kk: u8) -> u16 {
    family | u16::from(x) << 8 | u16::from(kk)
}

impl Instruction {
    /// Runs the instruction against `state`.
    ///
    /// The program counter is left alone; the returned `Flow` says where it goes next.
    pub fn execute(&self, state: &mut State, quirks: &Quirks) -> Result<Flow> {
        use Instruction::*;

        let flow = match *self {
            Clear => operations::clr(state),
            Return => operations::rts(state)?,
            Jump { addr } => operations::jump(addr),
            Call { addr } => operations::call(state, addr)?,
            SkipEqualByte { x, kk } => operations::ske(state, x, kk),
            SkipNotEqualByte { x, kk } => operations::skne(state, x, kk),
            SkipEqualRegister { x, y, .. } => operations::skre(state, x, y),
            LoadByte { x, kk } => operations::load(state, x, kk),
            AddByte { x, kk } => operations::add(state, x, kk, quirks),
            Move { x, y } => operations::mv(state, x, y),
            Or { x, y } => operations::or(state, x, y),
            And { x, y } => operations::and(state, x, y),
            Xor { x, y } => operations::xor(state, x, y),
            AddRegister { x, y } => operations::addr(state, x, y),
            Sub { x, y } => operations::sub(state, x, y),
            ShiftRight { x, y } => operations::shr(state, x, y, quirks),
            SubNegated { x, y } => operations::subn(state, x, y),
            ShiftLeft { x, y } => operations::shl(state, x, y, quirks),
            SkipNotEqualRegister { x, y, .. } => operations::skrne(state, x, y),
            LoadIndex { addr } => operations::loadi(state, addr),
            JumpOffset { addr } => operations::jumpi(state, addr),
            Random { x, kk } => operations::rand(state, x, kk),
            Draw { x, y, n } => operations::draw(state, x, y, n, quirks),
            SkipPressed { x } => operations::skpr(state, x),
            SkipNotPressed { x } => operations::skup(state, x),
            LoadDelay { x } => operations::moved(state, x),
            AwaitKey { x } => operations::keyd(state, x),
            SetDelay { x } => operations::loads(state, x),
            SetSound { x } => operations::ld(state, x),
            AddIndex { x } => operations::addi(state, x, quirks),
            LoadSprite { x } => operations::ldspr(state, x),
            StoreBcd { x } => operations::bcd(state, x),
            StoreRegisters { x } => operations::stor(state, x, quirks),
            LoadRegisters { x } => operations::read(state, x, quirks),
            Invalid { .. } => Flow::Next,
        };
        Ok(flow)
    }

    pub fn is_valid(&self) -> bool {
        !matches!(self, Instruction::Invalid { .. })
    }

    /// The assembly mnemonic without operands
    pub fn mnemonic(&self) -> &'static str {
        use Instruction::*;

        match self {
            Clear => "CLS",
            Return => "RET",
            Jump { .. } | JumpOffset { .. } => "JP",
            Call { .. } => "CALL",
            SkipEqualByte { .. } | SkipEqualRegister { .. } => "SE",
            SkipNotEqualByte { .. } | SkipNotEqualRegister { .. } => "SNE",
            LoadByte { .. }
            | Move { .. }
            | LoadIndex { .. }
            | LoadDelay { .. }
            | AwaitKey { .. }
            | SetDelay { .. }
            | SetSound { .. }
            | LoadSprite { .. }
            | StoreBcd { .. }
            | StoreRegisters { .. }
            | LoadRegisters { .. } => "LD",
            AddByte { .. } | AddRegister { .. } | AddIndex { .. } => "ADD",
            Or { .. } => "OR",
            And { .. } => "AND",
            Xor { .. } => "XOR",
            Sub { .. } => "SUB",
            ShiftRight { .. } => "SHR",
            SubNegated { .. } => "SUBN",
            ShiftLeft { .. } => "SHL",
            Random { .. } => "RND",
            Draw { .. } => "DRW",
            SkipPressed { .. } => "SKP",
            SkipNotPressed { .. } => "SKNP",
            Invalid { .. } => "???",
        }
    }

    /// Encodes the instruction back into its 16-bit word
    pub fn opcode(&self) -> u16 {
        use Instruction::*;

        match *self {
            Clear => 0x00E0,
            Return => 0x00EE,
            Jump { addr } => 0x1000 | addr,
            Call { addr } => 0x2000 | addr,
            SkipEqualByte { x, kk } => xkk(0x3000, x, kk),
            SkipNotEqualByte { x, kk } => xkk(0x4000, x, kk),
            SkipEqualRegister { x, y, n } => xy(0x5000, x, y, u16::from(n)),
            LoadByte { x, kk } => xkk(0x6000, x, kk),
            AddByte { x, kk } => xkk(0x7000, x, kk),
            Move { x, y } => xy(0x8000, x, y, 0x0),
            Or { x, y } => xy(0x8000, x, y, 0x1),
            And { x, y } => xy(0x8000, x, y, 0x2),
            Xor { x, y } => xy(0x8000, x, y, 0x3),
            AddRegister { x, y } => xy(0x8000, x, y, 0x4),
            Sub { x, y } => xy(0x8000, x, y, 0x5),
            ShiftRight { x, y } => xy(0x8000, x, y, 0x6),
            SubNegated { x, y } => xy(0x8000, x, y, 0x7),
            ShiftLeft { x, y } => xy(0x8000, x, y, 0xE),
            SkipNotEqualRegister { x, y, n } => xy(0x9000, x, y, u16::from(n)),
            LoadIndex { addr } => 0xA000 | addr,
            JumpOffset { addr } => 0xB000 | addr,
            Random { x, kk } => xkk(0xC000, x, kk),
            Draw { x, y, n } => xy(0xD000, x, y, u16::from(n)),
            SkipPressed { x } => xkk(0xE000, x, 0x9E),
            SkipNotPressed { x } => xkk(0xE000, x, 0xA1),
            LoadDelay { x } => xkk(0xF000, x, 0x07),
            AwaitKey { x } => xkk(0xF000, x, 0x0A),
            SetDelay { x } => xkk(0xF000, x, 0x15),
            SetSound { x } => xkk(0xF000, x, 0x18),
            AddIndex { x } => xkk(0xF000, x, 0x1E),
            LoadSprite { x } => xkk(0xF000, x, 0x29),
            StoreBcd { x } => xkk(0xF000, x, 0x33),
            StoreRegisters { x } => xkk(0xF000, x, 0x55),
            LoadRegisters { x } => xkk(0xF000, x, 0x65),
            Invalid { opcode } => opcode,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;

        let m = self.mnemonic();
        match *self {
            Clear | Return => write!(f, "{}", m),
            Jump { addr } | Call { addr } => write!(f, "{} {:#05X}", m, addr),
            SkipEqualByte { x, kk }
            | SkipNotEqualByte { x, kk }
            | LoadByte { x, kk }
            | AddByte { x, kk }
            | Random { x, kk } => write!(f, "{} V{:X}, {:#04X}", m, x, kk),
            SkipEqualRegister { x, y, .. }
            | Move { x, y }
            | Or { x, y }
            | And { x, y }
            | Xor { x, y }
            | AddRegister { x, y }
            | Sub { x, y }
            | SubNegated { x, y }
            | SkipNotEqualRegister { x, y, .. } => write!(f, "{} V{:X}, V{:X}", m, x, y),
            ShiftRight { x, y } | ShiftLeft { x, y } => write!(f, "{} V{:X} {{, V{:X}}}", m, x, y),
            LoadIndex { addr } => write!(f, "LD I, {:#05X}", addr),
            JumpOffset { addr } => write!(f, "JP V0, {:#05X}", addr),
            Draw { x, y, n } => write!(f, "DRW V{:X}, V{:X}, {}", x, y, n),
            SkipPressed { x } | SkipNotPressed { x } => write!(f, "{} V{:X}", m, x),
            LoadDelay { x } => write!(f, "LD V{:X}, DT", x),
            AwaitKey { x } => write!(f, "LD V{:X}, K", x),
            SetDelay { x } => write!(f, "LD DT, V{:X}", x),
            SetSound { x } => write!(f, "LD ST, V{:X}", x),
            AddIndex { x } => write!(f, "ADD I, V{:X}", x),
            LoadSprite { x } => write!(f, "LD F, V{:X}", x),
            StoreBcd { x } => write!(f, "LD B, V{:X}", x),
            StoreRegisters { x } => write!(f, "LD [I], V{:X}", x),
            LoadRegisters { x } => write!(f, "LD V{:X}, [I]", x),
            Invalid { opcode } => write!(f, "Invalid opcode {:#06X}", opcode),
        }
    }
}
