//! Session configuration.

use crate::error::ConfigError;
use crate::merge::MERGE_THRESHOLD;
use std::ops::RangeInclusive;

/// Largest palette the front end can colour.
pub const MAX_PALETTE: u8 = 6;

/// Upper bound on board radius; radius 8 already has 217 cells.
pub const MAX_RADIUS: u32 = 8;

/// Progress needed to finish `level`.
pub const fn level_target(level: u32) -> u32 {
    100 * level
}

/// Options that shape a session (board size, spawn generation, threshold).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub radius: u32,
    pub palette_size: u8,
    /// Units per generated stack.
    pub stack_size: RangeInclusive<usize>,
    /// Distinct colours picked for one generated stack (repeats allowed).
    pub distinct_colors: RangeInclusive<usize>,
    pub merge_threshold: usize,
    pub option_slots: usize,
    /// Spawn RNG seed; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            radius: 2,
            palette_size: MAX_PALETTE,
            stack_size: 3..=6,
            distinct_colors: 1..=3,
            merge_threshold: MERGE_THRESHOLD,
            option_slots: 3,
            seed: None,
        }
    }
}

impl SessionConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.radius == 0 || self.radius > MAX_RADIUS {
            return Err(ConfigError::Radius {
                got: self.radius,
                max: MAX_RADIUS,
            });
        }
        if self.palette_size == 0 || self.palette_size > MAX_PALETTE {
            return Err(ConfigError::PaletteSize {
                got: self.palette_size,
                max: MAX_PALETTE,
            });
        }
        check_range("stack size", &self.stack_size)?;
        check_range("distinct colours", &self.distinct_colors)?;
        if self.merge_threshold < 2 {
            return Err(ConfigError::Threshold);
        }
        if self.option_slots == 0 {
            return Err(ConfigError::Slots);
        }
        Ok(())
    }
}

fn check_range(name: &'static str, range: &RangeInclusive<usize>) -> Result<(), ConfigError> {
    let (lo, hi) = (*range.start(), *range.end());
    if lo == 0 || lo > hi {
        return Err(ConfigError::Range { name, lo, hi });
    }
    Ok(())
}
