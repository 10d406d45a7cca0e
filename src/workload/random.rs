//! Pluggable randomness for workload generation
//!
//! Drivers ask a [`RandomSourceFactory`] for one independent
//! [`RandomSource`] per task. The default [`SeededRandom`] factory derives each
//! task's `StdRng` from a base seed, so a seeded run picks the same per-task
//! sequence every time; interleaving across tasks still depends on the
//! scheduler.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of random choices for one task
pub trait RandomSource: Send + 'static {
    /// Uniform index in `0..bound`; `bound` must be non-zero
    fn pick(&mut self, bound: usize) -> usize;

    /// Fair coin flip
    fn coin(&mut self) -> bool;

    /// Two distinct uniform indices in `0..bound`; `bound` must be at least 2
    fn pick_pair(&mut self, bound: usize) -> (usize, usize) {
        let first = self.pick(bound);
        let mut second = self.pick(bound - 1);
        if second >= first {
            second += 1;
        }
        (first, second)
    }
}

impl RandomSource for StdRng {
    fn pick(&mut self, bound: usize) -> usize {
        self.gen_range(0..bound)
    }

    fn coin(&mut self) -> bool {
        self.gen_bool(0.5)
    }
}

/// Hands out one random source per task
pub trait RandomSourceFactory: Send + Sync {
    type Source: RandomSource;

    /// Source for the task with the given index
    fn for_task(&self, task: usize) -> Self::Source;
}

/// `StdRng`-backed factory, optionally seeded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeededRandom {
    seed: Option<u64>,
}

impl SeededRandom {
    /// Factory whose task sources derive from `seed`
    pub fn seeded(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }

    /// Factory drawing from OS entropy
    pub fn from_entropy() -> Self {
        Self { seed: None }
    }

    pub fn new(seed: Option<u64>) -> Self {
        Self { seed }
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}

impl RandomSourceFactory for SeededRandom {
    type Source = StdRng;

    fn for_task(&self, task: usize) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(task as u64)),
            None => StdRng::from_entropy(),
        }
    }
}

/// Source that always gives the same answers, for deterministic tests
#[cfg(test)]
#[derive(Debug, Clone, Copy)]
pub(crate) struct ConstantRandom {
    pub heads: bool,
}

#[cfg(test)]
impl RandomSource for ConstantRandom {
    fn pick(&mut self, _bound: usize) -> usize {
        0
    }

    fn coin(&mut self) -> bool {
        self.heads
    }
}

#[cfg(test)]
impl RandomSourceFactory for ConstantRandom {
    type Source = ConstantRandom;

    fn for_task(&self, _task: usize) -> ConstantRandom {
        *self
    }
}
