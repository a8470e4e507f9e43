use rand::Rng;

use crate::config::SpriteEdge;
use crate::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH, FONT_GLYPH_SIZE, FONT_START};
use crate::error::MachineFault;
use crate::instruction::Instruction;
use crate::state::State;

/// Applies a decoded instruction to `state`.
///
/// The program counter already points past the instruction, so jumps simply
/// overwrite it and skips add another 2.
pub fn execute<R: Rng>(
    instruction: Instruction,
    state: &mut State,
    rng: &mut R,
    sprite_edge: SpriteEdge,
) -> Result<(), MachineFault> {
    use Instruction::*;

    match instruction {
        Clear => state.clear_screen(),
        Return => ret(state)?,
        Jump { addr } => state.pc = addr,
        Call { addr } => call(state, addr)?,
        SkipEqImm { x, kk } => skip_if(&mut state.pc, state.v[x] == kk),
        SkipNeImm { x, kk } => skip_if(&mut state.pc, state.v[x] != kk),
        SkipEqReg { x, y } => skip_if(&mut state.pc, state.v[x] == state.v[y]),
        LoadImm { x, kk } => state.v[x] = kk,
        AddImm { x, kk } => state.v[x] = state.v[x].wrapping_add(kk),
        Move { x, y } => state.v[x] = state.v[y],
        Or { x, y } => state.v[x] |= state.v[y],
        And { x, y } => state.v[x] &= state.v[y],
        Xor { x, y } => state.v[x] ^= state.v[y],
        AddReg { x, y } => add(state, x, y),
        Sub { x, y } => sub(state, x, y),
        ShiftRight { x } => shr(state, x),
        SubN { x, y } => subn(state, x, y),
        ShiftLeft { x } => shl(state, x),
        SkipNeReg { x, y } => skip_if(&mut state.pc, state.v[x] != state.v[y]),
        LoadIndex { addr } => state.i = addr,
        JumpOffset { addr } => state.pc = u16::from(state.v[0x0]) + addr,
        Random { x, kk } => state.v[x] = rng.random::<u8>() & kk,
        Draw { x, y, n } => draw(state, x, y, n, sprite_edge)?,
        SkipKeyPressed { x } => {
            let pressed = state.is_key_pressed(state.v[x])?;
            skip_if(&mut state.pc, pressed);
        }
        SkipKeyReleased { x } => {
            let pressed = state.is_key_pressed(state.v[x])?;
            skip_if(&mut state.pc, !pressed);
        }
        ReadDelay { x } => state.v[x] = state.delay_timer,
        WaitKey { x } => wait_key(state, x),
        SetDelay { x } => state.delay_timer = state.v[x],
        SetSound { x } => state.sound_timer = state.v[x],
        AddIndex { x } => state.i = state.i.wrapping_add(u16::from(state.v[x])),
        LoadGlyph { x } => state.i = FONT_START + FONT_GLYPH_SIZE * u16::from(state.v[x]),
        StoreBcd { x } => bcd(state, x)?,
        StoreRegisters { x } => stor(state, x)?,
        LoadRegisters { x } => read(state, x)?,
        Unknown(op) => {
            log::warn!("ignoring unknown opcode {} at {:04X}", op, state.pc.wrapping_sub(2))
        }
    }
    Ok(())
}

/// if condition then pc += 2
fn skip_if(pc: &mut u16, condition: bool) {
    if condition {
        *pc = pc.wrapping_add(2);
    }
}

/// PC = STACK.pop()
fn ret(state: &mut State) -> Result<(), MachineFault> {
    state.pc = state.pop()?;
    Ok(())
}

/// STACK.push(PC); PC = addr
fn call(state: &mut State, addr: u16) -> Result<(), MachineFault> {
    state.push(state.pc)?;
    state.pc = addr;
    Ok(())
}

/// VF = carry; Vx += Vy
fn add(state: &mut State, x: usize, y: usize) {
    let (sum, carry) = state.v[x].overflowing_add(state.v[y]);
    state.set_flag(carry);
    state.v[x] = sum;
}

/// VF = Vx > Vy; Vx -= Vy
fn sub(state: &mut State, x: usize, y: usize) {
    let (vx, vy) = (state.v[x], state.v[y]);
    state.set_flag(vx > vy);
    state.v[x] = vx.wrapping_sub(vy);
}

/// VF = Vy > Vx; Vx = Vy - Vx
fn subn(state: &mut State, x: usize, y: usize) {
    let (vx, vy) = (state.v[x], state.v[y]);
    state.set_flag(vy > vx);
    state.v[x] = vy.wrapping_sub(vx);
}

/// VF = lsb(Vx); Vx >>= 1
fn shr(state: &mut State, x: usize) {
    let vx = state.v[x];
    state.set_flag(vx & 0x1 == 0x1);
    state.v[x] = vx >> 1;
}

/// VF = msb(Vx); Vx <<= 1
fn shl(state: &mut State, x: usize) {
    let vx = state.v[x];
    state.set_flag(vx & 0x80 == 0x80);
    state.v[x] = vx << 1;
}

/// draw_sprite(x=Vx y=Vy size=n)
/// XORs the sprite at mem[I..I+n] onto the FrameBuffer with its origin wrapped.
/// Sets VF if any lit pixel is erased.
fn draw(
    state: &mut State,
    x: usize,
    y: usize,
    n: u8,
    sprite_edge: SpriteEdge,
) -> Result<(), MachineFault> {
    let origin_x = usize::from(state.v[x]) % DISPLAY_WIDTH;
    let origin_y = usize::from(state.v[y]) % DISPLAY_HEIGHT;
    let mut sprite = [0; 0xF];
    let rows = usize::from(n);
    sprite[..rows].copy_from_slice(state.read(usize::from(state.i), rows)?);

    let mut collision = false;
    for (row, byte) in sprite[..rows].iter().enumerate() {
        for bit in 0..8 {
            if byte & (0x80 >> bit) == 0 {
                continue;
            }
            let (px, py) = (origin_x + bit, origin_y + row);
            let (px, py) = match sprite_edge {
                SpriteEdge::Clip if px >= DISPLAY_WIDTH || py >= DISPLAY_HEIGHT => continue,
                SpriteEdge::Clip => (px, py),
                SpriteEdge::Wrap => (px % DISPLAY_WIDTH, py % DISPLAY_HEIGHT),
            };
            collision |= state.flip_pixel(px, py);
        }
    }
    state.set_flag(collision);
    state.draw_flag = true;
    Ok(())
}

/// await keypress for Vx
/// Rewinds the pc onto this instruction until some key is held.
fn wait_key(state: &mut State, x: usize) {
    match state.first_pressed_key() {
        Some(key) => state.v[x] = key,
        None => state.pc = state.pc.wrapping_sub(2),
    }
}

/// mem[I..I+3] = bcd(Vx)
fn bcd(state: &mut State, x: usize) -> Result<(), MachineFault> {
    let vx = state.v[x];
    state.write(usize::from(state.i), &[vx / 100, vx / 10 % 10, vx % 10])
}

/// mem[I..=I+x] = V0..=Vx
fn stor(state: &mut State, x: usize) -> Result<(), MachineFault> {
    let registers = state.v;
    state.write(usize::from(state.i), &registers[..=x])
}

/// V0..=Vx = mem[I..=I+x]
fn read(state: &mut State, x: usize) -> Result<(), MachineFault> {
    let mut registers = state.v;
    registers[..=x].copy_from_slice(state.read(usize::from(state.i), x + 1)?);
    state.v = registers;
    Ok(())
}
