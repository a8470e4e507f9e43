//! # emu8
//! A CHIP-8 interpreter core.
//!
//! The host owns the clock: it loads a ROM, calls `Chip8::cycle` at whatever
//! rate it likes, feeds key presses in between, and renders the frame buffer.

pub use chip8::Chip8;
pub use config::{Config, SpriteEdge, TimerMode};
pub use error::{MachineFault, RomLoadError};
pub use instruction::Instruction;
pub use opcode::Opcode;
pub use state::{FrameBuffer, State};

mod chip8;
mod config;
pub mod constants;
mod error;
mod instruction;
mod opcode;
mod operations;
pub mod state;
