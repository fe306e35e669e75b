use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced by the Chip-8.
///
/// Unrecognised opcodes are deliberately absent: they decode to
/// `Instruction::Invalid` and execute as a no-op.
#[derive(Debug, Error)]
pub enum Error {
    /// The program does not fit between `PROGRAM_START` and the end of memory
    #[error("program is {size} bytes but only {capacity} bytes of program memory are available")]
    ProgramTooLarge { size: usize, capacity: usize },

    /// A CALL was made with all stack slots in use
    #[error("stack overflow at {address:#05X} executing {opcode:#06X}")]
    StackOverflow { address: u16, opcode: u16 },

    /// A RET was made with an empty stack
    #[error("stack underflow at {address:#05X} executing {opcode:#06X}")]
    StackUnderflow { address: u16, opcode: u16 },

    #[error("unable to read program: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the error was raised while executing an instruction
    pub fn is_runtime(&self) -> bool {
        matches!(
            self,
            Error::StackOverflow { .. } | Error::StackUnderflow { .. }
        )
    }
}
