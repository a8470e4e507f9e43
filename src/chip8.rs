use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, trace, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::{Config, TimerMode};
use crate::constants::{KEY_COUNT, MAX_ROM_SIZE, PROGRAM_START};
use crate::error::{MachineFault, RomLoadError};
use crate::instruction::Instruction;
use crate::opcode::Opcode;
use crate::operations;
use crate::state::{FrameBuffer, State};

/// # Chip-8
/// Chip-8 is a virtual machine and corresponding interpreted language.
///
/// Tracks:
///  - current `state`
///  - the random byte source used by `Cxkk`
///  - how many cycles have passed since the timers last ticked
///
/// Supplies interfaces for:
/// - loading roms
/// - pressing and releasing keys
/// - advancing the CPU and its timers
/// - inspecting its frame buffer for rendering by some display
pub struct Chip8 {
    state: State,
    rng: StdRng,
    config: Config,
    cycles_since_tick: u8,
}

impl Chip8 {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let seed = config.seed.unwrap_or_else(clock_seed);
        debug!("starting machine with {:?} and seed {}", config, seed);
        Chip8 {
            state: State::new(),
            rng: StdRng::seed_from_u64(seed),
            config,
            cycles_since_tick: 0,
        }
    }

    /// Returns to the freshly constructed state; the loaded ROM is discarded
    pub fn reset(&mut self) {
        debug!("resetting machine");
        self.state = State::new();
        self.cycles_since_tick = 0;
    }

    /// Copies a ROM into memory at 0x200
    ///
    /// # Arguments
    /// * `rom` the raw program bytes
    pub fn load_rom(&mut self, rom: &[u8]) -> Result<(), RomLoadError> {
        if rom.is_empty() {
            return Err(RomLoadError::Empty);
        }
        if rom.len() > MAX_ROM_SIZE {
            return Err(RomLoadError::TooLarge {
                size: rom.len(),
                max: MAX_ROM_SIZE,
            });
        }
        let start = usize::from(PROGRAM_START);
        self.state.memory[start..start + rom.len()].copy_from_slice(rom);
        debug!("loaded {} byte ROM at {:04X}", rom.len(), PROGRAM_START);
        Ok(())
    }

    /// Load a rom from a source
    ///
    /// # Arguments
    /// * `reader` a reader that yields a ROM
    pub fn load_rom_from<R: Read>(&mut self, reader: &mut R) -> Result<(), RomLoadError> {
        let mut rom = Vec::with_capacity(MAX_ROM_SIZE);
        // One byte past the limit is enough to tell an oversized ROM apart
        reader.take(MAX_ROM_SIZE as u64 + 1).read_to_end(&mut rom)?;
        self.load_rom(&rom)
    }

    /// Load a rom from a file on disk
    pub fn load_rom_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), RomLoadError> {
        let mut file = File::open(path.as_ref())?;
        self.load_rom_from(&mut file)
    }

    /// Advances the machine by a single cycle
    /// - gets and executes the next opcode
    /// - counts the timers down according to the configured `TimerMode`
    pub fn cycle(&mut self) -> Result<(), MachineFault> {
        self.step()?;
        match self.config.timer_mode {
            TimerMode::PerCycle => self.tick_timers(),
            TimerMode::Divided(cycles) => {
                self.cycles_since_tick += 1;
                if self.cycles_since_tick >= cycles.max(1) {
                    self.cycles_since_tick = 0;
                    self.tick_timers();
                }
            }
            TimerMode::Manual => {}
        }
        Ok(())
    }

    /// Fetches, decodes and executes one instruction without touching the timers
    pub fn step(&mut self) -> Result<Instruction, MachineFault> {
        let pc = self.state.pc;
        let op = self.state.fetch()?;
        self.state.opcode = op;
        self.state.pc = pc.wrapping_add(2);

        let instruction = Instruction::decode(op);
        trace!("{:04X} {} {}", pc, op, instruction);
        operations::execute(
            instruction,
            &mut self.state,
            &mut self.rng,
            self.config.sprite_edge,
        )?;
        Ok(instruction)
    }

    /// Decrements the delay and sound timers, stopping at 0
    pub fn tick_timers(&mut self) {
        self.state.delay_timer = self.state.delay_timer.saturating_sub(1);
        self.state.sound_timer = self.state.sound_timer.saturating_sub(1);
    }

    /// Set the pressed status of key
    ///
    /// # Arguments
    /// * `key` the 8-bit representation of the key that was pressed
    pub fn key_press(&mut self, key: u8) {
        self.set_key(key, true);
    }

    /// Unset the pressed status of key
    ///
    /// # Arguments
    /// * `key` the 8-bit representation of the key that was released
    pub fn key_release(&mut self, key: u8) {
        self.set_key(key, false);
    }

    pub fn set_key(&mut self, key: u8, pressed: bool) {
        match self.state.keys.get_mut(usize::from(key)) {
            Some(slot) => *slot = pressed,
            None => warn!("ignoring key {:#04X}; the keypad has {} keys", key, KEY_COUNT),
        }
    }

    pub fn is_key_pressed(&self, key: u8) -> bool {
        self.state.is_key_pressed(key).unwrap_or(false)
    }

    pub fn frame_buffer(&self) -> &FrameBuffer {
        &self.state.frame_buffer
    }

    /// Returns the FrameBuffer if it changed since it was last taken
    pub fn take_frame(&mut self) -> Option<&FrameBuffer> {
        if self.state.draw_flag {
            self.state.draw_flag = false;
            Some(&self.state.frame_buffer)
        } else {
            None
        }
    }

    /// Whether the pixel at (x, y) is lit; coordinates off the screen are never lit
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.state
            .frame_buffer
            .get(y)
            .and_then(|row| row.get(x))
            .is_some_and(|&pixel| pixel != 0)
    }

    pub fn delay_timer(&self) -> u8 {
        self.state.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.state.sound_timer
    }

    /// A tone should play while the sound timer is running
    pub fn is_sound_active(&self) -> bool {
        self.state.sound_timer > 0
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// The most recently fetched opcode
    pub fn opcode(&self) -> Opcode {
        self.state.opcode
    }

    pub fn pc(&self) -> u16 {
        self.state.pc
    }
}

impl Default for Chip8 {
    fn default() -> Self {
        Self::new()
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or_default()
}
