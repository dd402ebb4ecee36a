//! Seeded train/test partition
//!
//! Row indices are shuffled with [`LcgRng`] and the first
//! `ceil(n * test_fraction)` become the test set. The same seed over the
//! same number of rows always yields the same partition.

use offerlab_gbdt::LcgRng;

use crate::errors::{Result, TrainerError};

pub const DEFAULT_TEST_FRACTION: f64 = 0.2;
pub const DEFAULT_SEED: u64 = 42;

/// Row indices of each partition, in shuffled order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

pub fn train_test_split(rows: usize, test_fraction: f64, seed: u64) -> Result<Split> {
    if !(0.0..1.0).contains(&test_fraction) {
        return Err(TrainerError::InvalidSplit(format!(
            "test_fraction must be in [0, 1), got {test_fraction}"
        )));
    }

    let mut indices: Vec<usize> = (0..rows).collect();
    LcgRng::new(seed).shuffle(&mut indices);

    let test_size = ((rows as f64) * test_fraction).ceil() as usize;
    let train = indices.split_off(test_size.min(rows));
    Ok(Split { train, test: indices })
}
