use std::io;

use thiserror::Error;

/// Raised by an instruction that would leave the machine's address space.
/// The cycle stops and the host decides what to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MachineFault {
    #[error("memory access out of bounds at {address:#06X}")]
    MemoryOutOfBounds { address: usize },

    #[error("stack overflow calling a subroutine from {pc:#06X}")]
    StackOverflow { pc: u16 },

    #[error("stack underflow returning from {pc:#06X}")]
    StackUnderflow { pc: u16 },

    #[error("key {key:#04X} is not on the keypad")]
    InvalidKey { key: u8 },
}

#[derive(Debug, Error)]
pub enum RomLoadError {
    #[error("unable to read ROM: {0}")]
    Io(#[from] io::Error),

    #[error("ROM is {size} bytes but at most {max} fit in memory")]
    TooLarge { size: usize, max: usize },

    #[error("ROM is empty")]
    Empty,
}
