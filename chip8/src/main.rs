use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::error;

use emu8::constants::{CYCLES_PER_SECOND, TIMER_HZ};

mod keymap;
mod run;

#[derive(Parser, Debug)]
#[command(version, about = "Run a CHIP-8 ROM in an SDL2 window", long_about = None)]
pub struct Args {
    /// Path to the ROM to run
    rom: PathBuf,

    /// Instructions executed per second
    #[arg(short, long, default_value_t = CYCLES_PER_SECOND)]
    cycles_per_second: u32,

    /// Rate at which the delay and sound timers count down
    #[arg(short, long, default_value_t = TIMER_HZ)]
    timer_hz: u32,

    /// Window pixels per CHIP-8 pixel
    #[arg(short, long, default_value_t = 10)]
    scale: u32,

    /// Seed for the random number instruction
    #[arg(long)]
    seed: Option<u64>,

    /// Wrap sprites that cross the screen edge instead of clipping them
    #[arg(long)]
    sprite_wrap: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();
    match run::run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
