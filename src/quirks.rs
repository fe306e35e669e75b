/// # Quirks
/// Points where Chip-8 implementations disagree.
///
/// `Quirks::default()` selects the commonly accepted modern behavior:
/// every ADD sets VF, shifts operate on Vx in place, sprites clip at the
/// screen edge, ADD I reports overflow past 0xFFF, and bulk register
/// loads/stores leave I untouched.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Quirks {
    /// 7xkk sets VF to the carry out of the addition
    pub carry_on_add_byte: bool,
    /// 8xy6 and 8xyE shift Vy and store the result in Vx
    pub shift_reads_vy: bool,
    /// Sprite pixels beyond the screen edge are dropped rather than wrapped
    pub clip_sprites: bool,
    /// Fx1E sets VF when I leaves the 12-bit address space
    pub index_overflow_flag: bool,
    /// Fx55 and Fx65 leave I pointing just past the last byte transferred
    pub load_store_increments_index: bool,
}

impl Default for Quirks {
    fn default() -> Self {
        Quirks {
            carry_on_add_byte: true,
            shift_reads_vy: false,
            clip_sprites: true,
            index_overflow_flag: true,
            load_store_increments_index: false,
        }
    }
}

impl Quirks {
    /// Behavior of the original COSMAC VIP interpreter
    pub fn cosmac_vip() -> Self {
        Quirks {
            carry_on_add_byte: false,
            shift_reads_vy: true,
            clip_sprites: true,
            index_overflow_flag: false,
            load_store_increments_index: true,
        }
    }
}
