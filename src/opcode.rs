/// # Opcodes
///
/// A CHIP-8 opcode is one big-endian 16-bit word, written here as four nibbles `[f x y n]`.
/// `decode` matches on all four at once, in this order:
/// - `00E0` and `00EE` compare the whole word
/// - `1` through `7` and `9` through `D` look at `f` only; the rest of the word is operands
/// - `8` picks its ALU operation with `n`
/// - `E` and `F` pick their operation with the low byte `yn`
///
/// Operand fields overlap and a family only reads the ones it needs:
/// - `addr` is `[_ x y n]`, a 12-bit address for JP, CALL, LD I and JP V0
/// - `kk` is `[_ _ y n]`, an immediate byte
/// - `x` selects Vx, or the last register of V0..=Vx for bulk loads and stores
/// - `y` selects Vy
/// - `n` is a sprite height for DRW
pub trait Opcode {
    /// `(f, x, y, n)`
    fn nibbles(&self) -> (u8, u8, u8, u8);

    fn x(&self) -> u8;

    fn y(&self) -> u8;

    fn n(&self) -> u8;

    fn kk(&self) -> u8;

    fn addr(&self) -> u16;
}

impl Opcode for u16 {
    fn nibbles(&self) -> (u8, u8, u8, u8) {
        ((self >> 12) as u8, self.x(), self.y(), self.n())
    }

    fn x(&self) -> u8 {
        (self >> 8) as u8 & 0xF
    }

    fn y(&self) -> u8 {
        (self >> 4) as u8 & 0xF
    }

    fn n(&self) -> u8 {
        *self as u8 & 0xF
    }

    fn kk(&self) -> u8 {
        *self as u8
    }

    fn addr(&self) -> u16 {
        self & ADDR_MASK
    }
}

const ADDR_MASK: u16 = 0x0FFF;
