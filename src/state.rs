use crate::constants::{
    DISPLAY_HEIGHT, DISPLAY_WIDTH, FLAG_REGISTER, FONT, FONT_START, KEY_COUNT, MEMORY_SIZE,
    PIXEL_OFF, PIXEL_ON, PROGRAM_START, REGISTER_COUNT, STACK_DEPTH,
};
use crate::error::MachineFault;
use crate::opcode::Opcode;

/// The FrameBuffer is indexed as [y][x]; each pixel is `PIXEL_ON` or `PIXEL_OFF`
pub type FrameBuffer = [[u32; DISPLAY_WIDTH]; DISPLAY_HEIGHT];

/// A snapshot of the Chip8 internal state
///
/// ## CPU
/// Registers
/// - (v) 16 primary 8-bit registers (V0..VF)
///     - the first 15 (V0..VE) are general purpose registers
///     - the 16th (VF) is overwritten by arithmetic, shift and draw instructions
/// - (i) a 16-bit memory address register
///
/// Counter
/// - (pc) a 16-bit program counter
///
/// Pointer
/// - (sp) an 8-bit stack pointer; the next free stack slot
///
/// Timers
/// - 2 8-bit timers (delay & sound) counting down to 0
///
/// ## Memory
/// - 16 slot stack of return addresses
/// - 4096 bytes of addressable memory
///     - 0x050..0x0A0 holds the font
///     - 0x200.. holds the loaded ROM
/// - 64x32 frame buffer
///
/// ## Input
/// - pressed status of keys 0..F, written by the host between cycles
///
/// Memory and stack are only reachable through accessors that fail with a
/// `MachineFault` instead of indexing out of bounds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct State {
    pub v: [u8; REGISTER_COUNT],
    pub i: u16,
    pub pc: u16,
    pub sp: u8,
    pub delay_timer: u8,
    pub sound_timer: u8,
    pub stack: [u16; STACK_DEPTH],
    pub memory: [u8; MEMORY_SIZE],
    pub frame_buffer: FrameBuffer,
    pub keys: [bool; KEY_COUNT],
    pub opcode: Opcode,
    pub draw_flag: bool,
}

impl State {
    pub fn new() -> Self {
        let mut memory = [0; MEMORY_SIZE];
        let font_start = usize::from(FONT_START);
        memory[font_start..font_start + FONT.len()].copy_from_slice(&FONT);

        State {
            v: [0; REGISTER_COUNT],
            i: 0,
            pc: PROGRAM_START,
            sp: 0,
            delay_timer: 0,
            sound_timer: 0,
            stack: [0; STACK_DEPTH],
            memory,
            frame_buffer: [[PIXEL_OFF; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
            keys: [false; KEY_COUNT],
            opcode: Opcode::default(),
            draw_flag: false,
        }
    }

    /// Reads `len` bytes starting at `address`
    pub fn read(&self, address: usize, len: usize) -> Result<&[u8], MachineFault> {
        let end = Self::checked_end(address, len)?;
        Ok(&self.memory[address..end])
    }

    /// Writes `bytes` starting at `address`; nothing is written if any byte would land out of bounds
    pub fn write(&mut self, address: usize, bytes: &[u8]) -> Result<(), MachineFault> {
        let end = Self::checked_end(address, bytes.len())?;
        self.memory[address..end].copy_from_slice(bytes);
        Ok(())
    }

    fn checked_end(address: usize, len: usize) -> Result<usize, MachineFault> {
        let end = address + len;
        if end > MEMORY_SIZE {
            Err(MachineFault::MemoryOutOfBounds {
                address: address.max(MEMORY_SIZE),
            })
        } else {
            Ok(end)
        }
    }

    /// Reads the big-endian instruction word at the program counter
    pub fn fetch(&self) -> Result<Opcode, MachineFault> {
        let bytes = self.read(usize::from(self.pc), 2)?;
        Ok(Opcode::from_bytes(bytes[0], bytes[1]))
    }

    /// Saves a return address in the next free stack slot
    pub fn push(&mut self, address: u16) -> Result<(), MachineFault> {
        let slot = self
            .stack
            .get_mut(usize::from(self.sp))
            .ok_or(MachineFault::StackOverflow { pc: self.pc })?;
        *slot = address;
        self.sp += 1;
        Ok(())
    }

    /// Removes and returns the most recently saved return address
    pub fn pop(&mut self) -> Result<u16, MachineFault> {
        let sp = self
            .sp
            .checked_sub(1)
            .ok_or(MachineFault::StackUnderflow { pc: self.pc })?;
        let address = *self
            .stack
            .get(usize::from(sp))
            .ok_or(MachineFault::StackUnderflow { pc: self.pc })?;
        self.sp = sp;
        Ok(address)
    }

    pub fn is_key_pressed(&self, key: u8) -> Result<bool, MachineFault> {
        self.keys
            .get(usize::from(key))
            .copied()
            .ok_or(MachineFault::InvalidKey { key })
    }

    /// The lowest-numbered key currently held down
    pub fn first_pressed_key(&self) -> Option<u8> {
        (0..KEY_COUNT as u8).find(|&key| self.keys[usize::from(key)])
    }

    /// Writes VF; `true` is stored as 1
    pub fn set_flag(&mut self, flag: bool) {
        self.v[FLAG_REGISTER] = u8::from(flag);
    }

    pub fn clear_screen(&mut self) {
        self.frame_buffer = [[PIXEL_OFF; DISPLAY_WIDTH]; DISPLAY_HEIGHT];
        self.draw_flag = true;
    }

    /// XORs a lit pixel into the frame buffer, returning whether it was already lit
    pub fn flip_pixel(&mut self, x: usize, y: usize) -> bool {
        let pixel = &mut self.frame_buffer[y][x];
        let was_on = *pixel == PIXEL_ON;
        *pixel ^= PIXEL_ON;
        self.draw_flag = true;
        was_on
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_preloads_font() {
        let state = State::new();
        assert_eq!(state.memory[0x050..0x0A0], FONT[..]);
        assert!(state.memory[..0x050].iter().all(|&b| b == 0));
        assert_eq!(state.pc, 0x200);
        assert_eq!(state.sp, 0);
    }

    #[test]
    fn test_fetch_combines_bytes() {
        let mut state = State::new();
        state.memory[0x200..0x202].copy_from_slice(&[0xAA, 0xBB]);
        assert_eq!(state.fetch(), Ok(Opcode(0xAABB)));
    }

    #[test]
    fn test_fetch_at_last_byte_faults() {
        let mut state = State::new();
        state.pc = 0x0FFF;
        assert_eq!(
            state.fetch(),
            Err(MachineFault::MemoryOutOfBounds { address: 0x1000 })
        );
    }

    #[test]
    fn test_write_out_of_bounds_leaves_memory_untouched() {
        let mut state = State::new();
        let before = state.memory;
        assert_eq!(
            state.write(0x0FFE, &[1, 2, 3]),
            Err(MachineFault::MemoryOutOfBounds { address: 0x1000 })
        );
        assert_eq!(state.memory[..], before[..]);
    }

    #[test]
    fn test_read_reports_start_when_entirely_out_of_bounds() {
        let state = State::new();
        assert_eq!(
            state.read(0x1234, 1),
            Err(MachineFault::MemoryOutOfBounds { address: 0x1234 })
        );
    }

    #[test]
    fn test_push_then_pop() {
        let mut state = State::new();
        state.push(0x0300).unwrap();
        assert_eq!(state.sp, 1);
        assert_eq!(state.stack[0], 0x0300);
        assert_eq!(state.pop(), Ok(0x0300));
        assert_eq!(state.sp, 0);
    }

    #[test]
    fn test_push_past_depth_overflows() {
        let mut state = State::new();
        for _ in 0..STACK_DEPTH {
            state.push(0x0300).unwrap();
        }
        assert_eq!(
            state.push(0x0300),
            Err(MachineFault::StackOverflow { pc: 0x200 })
        );
        assert_eq!(state.sp as usize, STACK_DEPTH);
    }

    #[test]
    fn test_pop_empty_underflows() {
        let mut state = State::new();
        assert_eq!(state.pop(), Err(MachineFault::StackUnderflow { pc: 0x200 }));
        assert_eq!(state.sp, 0);
    }

    #[test]
    fn test_first_pressed_key_scans_ascending() {
        let mut state = State::new();
        assert_eq!(state.first_pressed_key(), None);
        state.keys[0xC] = true;
        state.keys[0x3] = true;
        assert_eq!(state.first_pressed_key(), Some(0x3));
    }

    #[test]
    fn test_key_past_keypad_is_invalid() {
        let state = State::new();
        assert_eq!(
            state.is_key_pressed(0x10),
            Err(MachineFault::InvalidKey { key: 0x10 })
        );
    }

    #[test]
    fn test_flip_pixel_reports_previous_value() {
        let mut state = State::new();
        assert!(!state.flip_pixel(3, 4));
        assert_eq!(state.frame_buffer[4][3], PIXEL_ON);
        assert!(state.flip_pixel(3, 4));
        assert_eq!(state.frame_buffer[4][3], PIXEL_OFF);
    }
}
