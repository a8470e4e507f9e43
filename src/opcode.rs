use std::fmt;

/// # Opcodes
///
/// Chip-8 opcodes are 16 bits each, stored big-endian. Their behavior is cased on:
/// - `(n, _, _, _)` the instruction family; applies to all opcodes
/// - `(_, _, _, n)` the member of family 0x0, 0x8 or 0xE
/// - `(_, _, n, n)` the member of family 0xF
///
/// Nibbles not used to select the operation carry its operands.
/// - `(_, n, n, n)` a 12-bit address
/// - `(_, _, n, n)` an immediate byte assigned to and/or compared with Vx
/// - `(_, n, _, _)` the register Vx, or the last register of the range V0..=Vx
/// - `(_, _, n, _)` the register Vy
/// - `(_, _, _, n)` a sprite height
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Opcode(pub u16);

impl Opcode {
    /// Combines the two consecutive bytes of an instruction
    pub fn from_bytes(high: u8, low: u8) -> Self {
        Opcode(u16::from_be_bytes([high, low]))
    }

    /// Returns the Opcode's component nibbles, most significant first.
    pub fn nibbles(self) -> (u8, u8, u8, u8) {
        let [high, low] = self.0.to_be_bytes();
        (self.family(), high & 0xF, low >> 4, low & 0xF)
    }

    /// `[x___]`
    pub fn family(self) -> u8 {
        (self.0 >> 12) as u8
    }

    /// `[_x__]` as a register index
    pub fn x(self) -> usize {
        usize::from((self.0 >> 8) & 0xF)
    }

    /// `[__y_]` as a register index
    pub fn y(self) -> usize {
        usize::from((self.0 >> 4) & 0xF)
    }

    /// `[___n]`
    pub fn n(self) -> u8 {
        (self.0 & 0xF) as u8
    }

    /// `[__kk]`
    pub fn kk(self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    /// `[_nnn]`
    pub fn nnn(self) -> u16 {
        self.0 & 0x0FFF
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}", self.0)
    }
}
