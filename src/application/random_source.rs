// Injectable randomness for the simulation
use rand::{Rng, SeedableRng, rngs::SmallRng};

/// Every random draw the engine makes goes through this seam.
pub trait RandomSource: Send + Sync {
    /// Uniform integer in `[low, high]`, both ends inclusive.
    fn int_between(&mut self, low: i64, high: i64) -> i64;

    /// `true` with the given probability.
    fn chance(&mut self, probability: f64) -> bool;

    /// Uniform index in `[0, len)`; `len` is never zero.
    fn index(&mut self, len: usize) -> usize;
}

pub struct SeededRandom {
    rng: SmallRng,
}

impl SeededRandom {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self { rng }
    }
}

impl RandomSource for SeededRandom {
    fn int_between(&mut self, low: i64, high: i64) -> i64 {
        if low >= high {
            return low;
        }
        self.rng.gen_range(low..=high)
    }

    fn chance(&mut self, probability: f64) -> bool {
        self.rng.gen_bool(probability.clamp(0.0, 1.0))
    }

    fn index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }
}

#[cfg(test)]
pub mod scripted {
    use super::RandomSource;
    use std::collections::VecDeque;

    /// Replays queued draws; once a queue runs dry it answers with the
    /// midpoint of the range, `false`, and index 0.
    #[derive(Default)]
    pub struct ScriptedRandom {
        pub ints: VecDeque<i64>,
        pub chances: VecDeque<bool>,
        pub indices: VecDeque<usize>,
    }

    impl ScriptedRandom {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_ints(mut self, ints: &[i64]) -> Self {
            self.ints.extend(ints);
            self
        }

        pub fn with_chances(mut self, chances: &[bool]) -> Self {
            self.chances.extend(chances);
            self
        }

        pub fn with_indices(mut self, indices: &[usize]) -> Self {
            self.indices.extend(indices);
            self
        }
    }

    impl RandomSource for ScriptedRandom {
        fn int_between(&mut self, low: i64, high: i64) -> i64 {
            self.ints.pop_front().unwrap_or(low + (high - low) / 2)
        }

        fn chance(&mut self, _probability: f64) -> bool {
            self.chances.pop_front().unwrap_or(false)
        }

        fn index(&mut self, len: usize) -> usize {
            self.indices.pop_front().unwrap_or(0).min(len - 1)
        }
    }
}
