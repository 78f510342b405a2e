//! Random number service
//!
//! Die faces and cast forces are drawn through [`RandomSource`] so a run can be
//! reproduced from its seed, or replayed from a fixed script.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Uniform random draws used by the game
pub trait RandomSource {
    /// Uniform integer in `[min, max]` (inclusive)
    fn uniform_int(&mut self, min: i32, max: i32) -> i32;

    /// Uniform float in `[min, max)`
    fn uniform_float(&mut self, min: f32, max: f32) -> f32;

    /// Positive magnitude in `[min, max)`
    fn positive_float(&mut self, min: f32, max: f32) -> f32 {
        self.uniform_float(min.abs(), max.abs())
    }

    /// Negative magnitude in `(-max, -min]`
    fn negative_float(&mut self, min: f32, max: f32) -> f32 {
        -self.positive_float(min, max)
    }
}

/// Seeded PCG generator
#[derive(Debug, Clone)]
pub struct GameRng {
    seed: u64,
    rng: Pcg32,
}

impl GameRng {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Seed this generator was created with
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RandomSource for GameRng {
    fn uniform_int(&mut self, min: i32, max: i32) -> i32 {
        if min >= max {
            return min;
        }
        self.rng.random_range(min..=max)
    }

    fn uniform_float(&mut self, min: f32, max: f32) -> f32 {
        if min >= max {
            return min;
        }
        self.rng.random_range(min..max)
    }
}

/// Replays scripted integers, falling back to a seeded generator when exhausted
///
/// Scripted values are clamped into the requested range. Floats always come
/// from the fallback so cast forces stay plausible.
#[derive(Debug, Clone)]
pub struct ScriptedRng {
    ints: VecDeque<i32>,
    fallback: GameRng,
}

impl ScriptedRng {
    pub fn new(ints: impl IntoIterator<Item = i32>) -> Self {
        Self {
            ints: ints.into_iter().collect(),
            fallback: GameRng::new(0),
        }
    }

    /// Queue more integers at the end of the script
    pub fn extend(&mut self, ints: impl IntoIterator<Item = i32>) {
        self.ints.extend(ints);
    }

    /// Number of scripted integers not yet consumed
    pub fn remaining(&self) -> usize {
        self.ints.len()
    }
}

impl RandomSource for ScriptedRng {
    fn uniform_int(&mut self, min: i32, max: i32) -> i32 {
        match self.ints.pop_front() {
            Some(v) => v.clamp(min, max.max(min)),
            None => self.fallback.uniform_int(min, max),
        }
    }

    fn uniform_float(&mut self, min: f32, max: f32) -> f32 {
        self.fallback.uniform_float(min, max)
    }
}
