/// When `Chip8::cycle` counts the delay and sound timers down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimerMode {
    /// Once after every instruction
    #[default]
    PerCycle,
    /// Once every `n` instructions; approximates 60Hz from a faster CPU clock.
    /// `Divided(0)` ticks after every instruction, like `PerCycle`
    Divided(u8),
    /// Never; the host calls `Chip8::tick_timers` at its own rate
    Manual,
}

/// What happens to sprite pixels that fall past the right or bottom edge.
///
/// The sprite origin always wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpriteEdge {
    /// Pixels past the edge are dropped
    #[default]
    Clip,
    /// Pixels past the edge reappear on the opposite side
    Wrap,
}

/// Behavioural knobs for a `Chip8`, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Config {
    pub timer_mode: TimerMode,
    pub sprite_edge: SpriteEdge,
    /// Seed for the random byte source; `None` seeds from the system clock
    pub seed: Option<u64>,
}

impl Config {
    pub fn with_timer_mode(self, timer_mode: TimerMode) -> Self {
        Config { timer_mode, ..self }
    }

    pub fn with_sprite_edge(self, sprite_edge: SpriteEdge) -> Self {
        Config {
            sprite_edge,
            ..self
        }
    }

    pub fn with_seed(self, seed: u64) -> Self {
        Config {
            seed: Some(seed),
            ..self
        }
    }
}
