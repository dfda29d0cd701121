//! Placement-option generation with an injectable, seedable RNG.

use crate::board::Unit;
use crate::config::SessionConfig;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::RangeInclusive;

/// Chance, per unit, of switching to another of the stack's picked colours.
const SWITCH_CHANCE: f64 = 0.3;

#[derive(Debug, Clone)]
pub struct Spawner {
    rng: StdRng,
    palette_size: u8,
    stack_size: RangeInclusive<usize>,
    distinct_colors: RangeInclusive<usize>,
}

impl Spawner {
    pub fn new(config: &SessionConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::with_rng(rng, config)
    }

    pub fn with_rng(rng: StdRng, config: &SessionConfig) -> Self {
        Self {
            rng,
            palette_size: config.palette_size.max(1),
            stack_size: config.stack_size.clone(),
            distinct_colors: config.distinct_colors.clone(),
        }
    }

    /// One stack, bottom to top. Picks a handful of colours (repeats allowed),
    /// starts with the first and occasionally hops between them.
    pub fn next_stack(&mut self) -> Vec<Unit> {
        let size = self.rng.random_range(self.stack_size.clone());
        let picks: Vec<u8> = (0..self.rng.random_range(self.distinct_colors.clone()))
            .map(|_| self.rng.random_range(0..self.palette_size))
            .collect();

        let mut current = picks[0];
        let mut stack = Vec::with_capacity(size);
        for _ in 0..size {
            if self.rng.random_bool(SWITCH_CHANCE) {
                current = picks[self.rng.random_range(0..picks.len())];
            }
            stack.push(Unit::new(current));
        }
        stack
    }

    /// Uniform index in `0..len`; used by headless autoplay.
    pub fn pick(&mut self, len: usize) -> usize {
        self.rng.random_range(0..len)
    }
}
