use std::error::Error;
use std::time::{Duration, Instant};

use log::info;
use sdl2::event::Event;
use sdl2::keyboard::Keycode;

use display::Display;
use emu8::{Chip8, Config, MachineFault, SpriteEdge, TimerMode};

use crate::keymap::keymap;
use crate::Args;

const TITLE: &str = "Emu-8";

pub fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let mut config = Config::default()
        .with_timer_mode(TimerMode::Manual)
        .with_sprite_edge(if args.sprite_wrap {
            SpriteEdge::Wrap
        } else {
            SpriteEdge::Clip
        });
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    let mut chip8 = Chip8::with_config(config);

    // Load ROM
    chip8.load_rom_file(&args.rom)?;
    info!("loaded ROM {}", args.rom.display());

    // Get SDL2 context
    let sdl = sdl2::init()?;
    let mut display = Display::new(&sdl, TITLE, args.scale)?;
    let mut events = sdl.event_pump()?;

    // Set initial timing
    let cycle_time = Duration::from_secs(1) / args.cycles_per_second.max(1);
    let timer_time = Duration::from_secs(1) / args.timer_hz.max(1);
    let mut last_cycle = Instant::now();
    let mut last_timer_tick = Instant::now();

    // Whether or not the default clock speed should be respected
    let mut fast_forward = false;
    let mut beeping = false;

    'event: loop {
        // Render the current frame only if it changed
        if let Some(frame) = chip8.take_frame() {
            display.render(frame)?;
        }

        // Handle input
        for event in events.poll_iter() {
            match event {
                Event::Quit { .. } => break 'event,
                Event::KeyDown {
                    keycode: Some(key), ..
                } => match (key, keymap(key)) {
                    (_, Some(kc)) => chip8.key_press(kc),
                    (Keycode::Space, _) => fast_forward = true,
                    (Keycode::Escape, _) => break 'event,
                    _ => continue,
                },
                Event::KeyUp {
                    keycode: Some(key), ..
                } => match (key, keymap(key)) {
                    (_, Some(kc)) => chip8.key_release(kc),
                    (Keycode::Space, _) => fast_forward = false,
                    _ => continue,
                },
                _ => continue,
            };
        }

        // Update state
        if let Err(fault) = chip8.cycle() {
            return Err(halt_message(&chip8, fault).into());
        }
        let ticks = timer_ticks_due(last_timer_tick.elapsed(), timer_time);
        for _ in 0..ticks {
            chip8.tick_timers();
        }
        last_timer_tick += timer_time * ticks;
        if chip8.is_sound_active() != beeping {
            beeping = chip8.is_sound_active();
            display.set_status(if beeping { "♪" } else { "" })?;
        }

        // Handle timing
        let elapsed_cycle_time = last_cycle.elapsed();
        if !fast_forward && cycle_time > elapsed_cycle_time {
            std::thread::sleep(cycle_time - elapsed_cycle_time);
        }
        last_cycle = Instant::now();
    }

    info!("window closed");
    Ok(())
}

/// Describes a fault along with the instruction that raised it
fn halt_message(chip8: &Chip8, fault: MachineFault) -> String {
    format!(
        "halting on {} (opcode {} at {:04X})",
        fault,
        chip8.opcode(),
        chip8.pc().wrapping_sub(2)
    )
}

/// Number of whole timer periods that fit in `elapsed`
fn timer_ticks_due(elapsed: Duration, period: Duration) -> u32 {
    let due = elapsed.as_nanos() / period.as_nanos().max(1);
    u32::try_from(due).unwrap_or(u32::MAX)
}
