pub use chip8::{Chip8, Dump};
pub use constants::CLOCK_SPEED;
pub use error::{Error, Result};
pub use instruction::{decode, Instruction};
pub use operations::Flow;
pub use quirks::Quirks;
pub use state::{FrameBuffer, State};

mod chip8;
pub mod constants;
mod error;
mod instruction;
mod opcode;
mod operations;
mod quirks;
pub mod state;
