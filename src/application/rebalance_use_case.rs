// ============================================================
// Layer 2 — RebalanceUseCase
// ============================================================
// Writes a copy of a training CSV with negatives oversampled so
// that positives make up `ratio` of the rows.
//
// This is the data-side alternative to class weights: train on
// the rebalanced file with `--balance-mode none` to avoid
// correcting for the same mismatch twice.

use anyhow::Result;
use std::path::PathBuf;

use crate::data::{loader::CsvPairLoader, rebalancer::oversample_negatives};
use crate::domain::traits::PairSource;
use crate::infra::submission::write_pairs;

pub struct RebalanceUseCase {
    input_path:  PathBuf,
    output_path: PathBuf,
    ratio:       f64,
    seed:        u64,
}

impl RebalanceUseCase {
    pub fn new(input_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>, ratio: f64, seed: u64) -> Self {
        Self {
            input_path:  input_path.into(),
            output_path: output_path.into(),
            ratio,
            seed,
        }
    }

    /// Returns the number of rows written.
    pub fn execute(&self) -> Result<usize> {
        let pairs    = CsvPairLoader::new(&self.input_path).load_all()?;
        let balanced = oversample_negatives(&pairs, self.ratio, self.seed)?;
        write_pairs(&self.output_path, &balanced)?;
        Ok(balanced.len())
    }
}
