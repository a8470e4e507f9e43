/// Bytes of addressable memory
pub const MEMORY_SIZE: usize = 4096;

/// Where ROMs are loaded and where execution starts
pub const PROGRAM_START: u16 = 0x200;

/// The largest ROM that fits between `PROGRAM_START` and the end of memory
pub const MAX_ROM_SIZE: usize = MEMORY_SIZE - PROGRAM_START as usize;

/// Number of nested subroutine calls the stack can hold
pub const STACK_DEPTH: usize = 16;

/// V0..VF
pub const REGISTER_COUNT: usize = 16;

/// VF doubles as the carry/borrow/collision flag
pub const FLAG_REGISTER: usize = 0xF;

/// Keys 0..F on the hexadecimal keypad
pub const KEY_COUNT: usize = 16;

pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;

pub const PIXEL_OFF: u32 = 0x0000_0000;
pub const PIXEL_ON: u32 = 0xFFFF_FFFF;

/// Default CPU clock rate for hosts that pace `Chip8::cycle`
pub const CYCLES_PER_SECOND: u32 = 500;

/// Conventional rate at which the delay and sound timers count down
pub const TIMER_HZ: u32 = 60;

/// Address of the first font glyph
pub const FONT_START: u16 = 0x050;

/// Each glyph is 5 rows of 8 pixels
pub const FONT_GLYPH_SIZE: u16 = 5;

/// # Font
/// Sprites for the hexadecimal digits 0..F, one byte per row.
///
/// The high nibble of each byte holds the glyph; e.g. the "0" glyph
/// ```text
/// 0xF0 -> ****
/// 0x90 -> *  *
/// 0x90 -> *  *
/// 0x90 -> *  *
/// 0xF0 -> ****
/// ```
pub const FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];
