//! Deterministic utilities for reproducible training
//!
//! Provides an LCG-based RNG for seeded shuffles and the ordering used to
//! break ties between equally good splits.

use std::num::Wrapping;

/// Linear Congruential Generator for deterministic pseudo-randomness
/// Uses the glibc constants over a 64-bit state and emits the high bits
#[derive(Clone, Debug)]
pub struct LcgRng {
    state: Wrapping<i64>,
}

impl LcgRng {
    const MULTIPLIER: i64 = 1103515245;
    const INCREMENT: i64 = 12345;

    pub fn new(seed: u64) -> Self {
        Self {
            state: Wrapping(seed as i64),
        }
    }

    /// Next value in `[0, 2^31)`
    pub fn next_u31(&mut self) -> u64 {
        self.state = self.state * Wrapping(Self::MULTIPLIER) + Wrapping(Self::INCREMENT);
        (self.state.0 as u64) >> 33
    }

    /// Uniform-ish value in `[0, bound)`; 0 when `bound` is 0
    pub fn next_below(&mut self, bound: usize) -> usize {
        if bound == 0 {
            return 0;
        }
        (self.next_u31() % bound as u64) as usize
    }

    /// Fisher-Yates shuffle driven by this generator
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.next_below(i + 1);
            items.swap(i, j);
        }
    }
}

/// Deterministic tie-breaker for split selection
///
/// Lower feature index wins, then lower threshold rank, then
/// missing-goes-right over missing-goes-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SplitTieBreaker {
    pub feature_idx: usize,
    pub threshold_rank: usize,
    pub default_left: bool,
}

impl SplitTieBreaker {
    pub fn new(feature_idx: usize, threshold_rank: usize, default_left: bool) -> Self {
        Self {
            feature_idx,
            threshold_rank,
            default_left,
        }
    }
}
