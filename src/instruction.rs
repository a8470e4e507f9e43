use std::fmt;

use crate::opcode::Opcode;

/// A decoded Chip-8 instruction with its operands.
///
/// `x` and `y` are register indices, `kk` an immediate byte, `addr` a 12-bit
/// address and `n` a sprite height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0
    Clear,
    /// 00EE
    Return,
    /// 1nnn
    Jump { addr: u16 },
    /// 2nnn
    Call { addr: u16 },
    /// 3xkk
    SkipEqImm { x: usize, kk: u8 },
    /// 4xkk
    SkipNeImm { x: usize, kk: u8 },
    /// 5xy0
    SkipEqReg { x: usize, y: usize },
    /// 6xkk
    LoadImm { x: usize, kk: u8 },
    /// 7xkk
    AddImm { x: usize, kk: u8 },
    /// 8xy0
    Move { x: usize, y: usize },
    /// 8xy1
    Or { x: usize, y: usize },
    /// 8xy2
    And { x: usize, y: usize },
    /// 8xy3
    Xor { x: usize, y: usize },
    /// 8xy4
    AddReg { x: usize, y: usize },
    /// 8xy5
    Sub { x: usize, y: usize },
    /// 8xy6
    ShiftRight { x: usize },
    /// 8xy7
    SubN { x: usize, y: usize },
    /// 8xyE
    ShiftLeft { x: usize },
    /// 9xy0
    SkipNeReg { x: usize, y: usize },
    /// Annn
    LoadIndex { addr: u16 },
    /// Bnnn
    JumpOffset { addr: u16 },
    /// Cxkk
    Random { x: usize, kk: u8 },
    /// Dxyn
    Draw { x: usize, y: usize, n: u8 },
    /// Ex9E
    SkipKeyPressed { x: usize },
    /// ExA1
    SkipKeyReleased { x: usize },
    /// Fx07
    ReadDelay { x: usize },
    /// Fx0A
    WaitKey { x: usize },
    /// Fx15
    SetDelay { x: usize },
    /// Fx18
    SetSound { x: usize },
    /// Fx1E
    AddIndex { x: usize },
    /// Fx29
    LoadGlyph { x: usize },
    /// Fx33
    StoreBcd { x: usize },
    /// Fx55
    StoreRegisters { x: usize },
    /// Fx65
    LoadRegisters { x: usize },
    /// Any word without a defined meaning; executes as a no-op
    Unknown(Opcode),
}

impl Instruction {
    /// Selects the Instruction for an Opcode.
    ///
    /// Families 0x0, 0x8 and 0xE are told apart by their last nibble alone and
    /// family 0xF by its last byte, so e.g. `0x0120` is still a clear.
    pub fn decode(op: Opcode) -> Self {
        use Instruction::*;

        let (x, y, n, kk, addr) = (op.x(), op.y(), op.n(), op.kk(), op.nnn());
        match op.nibbles() {
            (0x0, .., 0x0) => Clear,
            (0x0, .., 0xE) => Return,
            (0x1, ..) => Jump { addr },
            (0x2, ..) => Call { addr },
            (0x3, ..) => SkipEqImm { x, kk },
            (0x4, ..) => SkipNeImm { x, kk },
            (0x5, ..) => SkipEqReg { x, y },
            (0x6, ..) => LoadImm { x, kk },
            (0x7, ..) => AddImm { x, kk },
            (0x8, .., 0x0) => Move { x, y },
            (0x8, .., 0x1) => Or { x, y },
            (0x8, .., 0x2) => And { x, y },
            (0x8, .., 0x3) => Xor { x, y },
            (0x8, .., 0x4) => AddReg { x, y },
            (0x8, .., 0x5) => Sub { x, y },
            (0x8, .., 0x6) => ShiftRight { x },
            (0x8, .., 0x7) => SubN { x, y },
            (0x8, .., 0xE) => ShiftLeft { x },
            (0x9, ..) => SkipNeReg { x, y },
            (0xA, ..) => LoadIndex { addr },
            (0xB, ..) => JumpOffset { addr },
            (0xC, ..) => Random { x, kk },
            (0xD, ..) => Draw { x, y, n },
            (0xE, .., 0xE) => SkipKeyPressed { x },
            (0xE, .., 0x1) => SkipKeyReleased { x },
            (0xF, ..) => match kk {
                0x07 => ReadDelay { x },
                0x0A => WaitKey { x },
                0x15 => SetDelay { x },
                0x18 => SetSound { x },
                0x1E => AddIndex { x },
                0x29 => LoadGlyph { x },
                0x33 => StoreBcd { x },
                0x55 => StoreRegisters { x },
                0x65 => LoadRegisters { x },
                _ => Unknown(op),
            },
            _ => Unknown(op),
        }
    }
}

/// Conventional Chip-8 assembler mnemonics
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;

        match *self {
            Clear => write!(f, "CLS"),
            Return => write!(f, "RET"),
            Jump { addr } => write!(f, "JP {:#05X}", addr),
            Call { addr } => write!(f, "CALL {:#05X}", addr),
            SkipEqImm { x, kk } => write!(f, "SE V{:X}, {:#04X}", x, kk),
            SkipNeImm { x, kk } => write!(f, "SNE V{:X}, {:#04X}", x, kk),
            SkipEqReg { x, y } => write!(f, "SE V{:X}, V{:X}", x, y),
            LoadImm { x, kk } => write!(f, "LD V{:X}, {:#04X}", x, kk),
            AddImm { x, kk } => write!(f, "ADD V{:X}, {:#04X}", x, kk),
            Move { x, y } => write!(f, "LD V{:X}, V{:X}", x, y),
            Or { x, y } => write!(f, "OR V{:X}, V{:X}", x, y),
            And { x, y } => write!(f, "AND V{:X}, V{:X}", x, y),
            Xor { x, y } => write!(f, "XOR V{:X}, V{:X}", x, y),
            AddReg { x, y } => write!(f, "ADD V{:X}, V{:X}", x, y),
            Sub { x, y } => write!(f, "SUB V{:X}, V{:X}", x, y),
            ShiftRight { x } => write!(f, "SHR V{:X}", x),
            SubN { x, y } => write!(f, "SUBN V{:X}, V{:X}", x, y),
            ShiftLeft { x } => write!(f, "SHL V{:X}", x),
            SkipNeReg { x, y } => write!(f, "SNE V{:X}, V{:X}", x, y),
            LoadIndex { addr } => write!(f, "LD I, {:#05X}", addr),
            JumpOffset { addr } => write!(f, "JP V0, {:#05X}", addr),
            Random { x, kk } => write!(f, "RND V{:X}, {:#04X}", x, kk),
            Draw { x, y, n } => write!(f, "DRW V{:X}, V{:X}, {}", x, y, n),
            SkipKeyPressed { x } => write!(f, "SKP V{:X}", x),
            SkipKeyReleased { x } => write!(f, "SKNP V{:X}", x),
            ReadDelay { x } => write!(f, "LD V{:X}, DT", x),
            WaitKey { x } => write!(f, "LD V{:X}, K", x),
            SetDelay { x } => write!(f, "LD DT, V{:X}", x),
            SetSound { x } => write!(f, "LD ST, V{:X}", x),
            AddIndex { x } => write!(f, "ADD I, V{:X}", x),
            LoadGlyph { x } => write!(f, "LD F, V{:X}", x),
            StoreBcd { x } => write!(f, "LD B, V{:X}", x),
            StoreRegisters { x } => write!(f, "LD [I], V{:X}", x),
            LoadRegisters { x } => write!(f, "LD V{:X}, [I]", x),
            Unknown(op) => write!(f, "DW {:#06X}", op.0),
        }
    }
}
