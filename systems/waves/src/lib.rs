#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic wave controller responsible for emitting wave spawn commands.

use lane_defence_core::{Command, Event, TICKS_PER_SECOND};

/// Level a fresh session starts at.
pub const FIRST_LEVEL: u32 = 1;

/// Monsters spawned per level of a wave.
pub const MONSTERS_PER_LEVEL: u32 = 2;

/// Configuration parameters required to construct the wave controller.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    wave_interval_ticks: u32,
}

impl Config {
    /// Creates a new configuration that forces a wave every `wave_interval_ticks`.
    #[must_use]
    pub const fn new(wave_interval_ticks: u32) -> Self {
        Self {
            wave_interval_ticks,
        }
    }
}

/// Pure system that owns the level counter and the wave countdown.
#[derive(Debug)]
pub struct Waves {
    wave_interval_ticks: u32,
    current_level: u32,
    next_wave_timer: u32,
    opened: bool,
}

impl Waves {
    /// Creates a new wave controller using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            wave_interval_ticks: config.wave_interval_ticks,
            current_level: FIRST_LEVEL,
            next_wave_timer: config.wave_interval_ticks,
            opened: false,
        }
    }

    /// Level of the most recent wave.
    #[must_use]
    pub fn current_level(&self) -> u32 {
        self.current_level
    }

    /// Ticks left before the next wave is forced.
    #[must_use]
    pub fn next_wave_timer(&self) -> u32 {
        self.next_wave_timer
    }

    /// Whole seconds left before the next wave is forced, rounded up.
    #[must_use]
    pub fn seconds_until_next_wave(&self) -> u32 {
        self.next_wave_timer.div_ceil(TICKS_PER_SECOND)
    }

    /// Consumes events and the live monster count to emit spawn commands.
    ///
    /// `Event::SessionReset` restores the initial level and countdown. A wave
    /// is only evaluated when the events contain `Event::TimeAdvanced` and the
    /// session is running. The first evaluation after a start is the opening
    /// wave: it spawns the current level even though the field is empty,
    /// without raising it. Afterwards a wave launches when the countdown runs
    /// out or the field is clear, and only a cleared field raises the level.
    pub fn handle(
        &mut self,
        events: &[Event],
        started: bool,
        active_monsters: usize,
        out: &mut Vec<Command>,
    ) {
        let mut ticked = false;
        for event in events {
            match event {
                Event::SessionReset { .. } => self.reset(),
                Event::TimeAdvanced { .. } => ticked = true,
                _ => {}
            }
        }

        if !ticked || !started {
            return;
        }

        if !self.opened {
            self.opened = true;
        } else if active_monsters == 0 {
            self.current_level = self.current_level.saturating_add(1);
        } else if self.next_wave_timer > 0 {
            self.next_wave_timer -= 1;
            return;
        }

        self.next_wave_timer = self.wave_interval_ticks;
        out.push(Command::SpawnWave {
            level: self.current_level,
            count: self.current_level.saturating_mul(MONSTERS_PER_LEVEL),
        });
    }

    fn reset(&mut self) {
        self.current_level = FIRST_LEVEL;
        self.next_wave_timer = self.wave_interval_ticks;
        self.opened = false;
    }
}
