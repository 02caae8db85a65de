// ============================================================
// Layer 3 — Pipeline Configuration Errors
// ============================================================
// Errors that make a run meaningless before any training starts.
// They are raised as early as possible and never recovered from.
//
// Everything else (file I/O, CSV parsing, the scorer itself) is
// reported through anyhow at the layer where it happens.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PipelineError {
    /// Every training label is the same class, so no positive
    /// rate in (0, 1) can be observed.
    #[error("degenerate training labels: observed positive rate is {rate}")]
    DegenerateLabels { rate: f64 },

    /// A probability-like setting outside its allowed range.
    #[error("{name} is out of range, got {value}")]
    RateOutOfRange { name: &'static str, value: f64 },

    /// A size or count setting that must be at least 1.
    #[error("{name} must be positive")]
    NonPositive { name: &'static str },

    /// No question text at all to build a vocabulary from.
    #[error("corpus is empty: no tokens to build a vocabulary from")]
    EmptyCorpus,

    /// No labelled rows were supplied where training data was required.
    #[error("training set is empty")]
    EmptyTrainingSet,

    /// A row in a labelled-only operation had no label.
    #[error("row {id} has no is_duplicate label")]
    MissingLabel { id: u64 },

    /// Parallel arrays that must line up do not.
    #[error("length mismatch: {what} has {actual} rows, expected {expected}")]
    LengthMismatch {
        what:     &'static str,
        expected: usize,
        actual:   usize,
    },

    /// An encoded sequence whose length differs from the configured one.
    #[error("sequence at row {row} has length {actual}, expected {expected}")]
    SequenceLength {
        row:      usize,
        expected: usize,
        actual:   usize,
    },

    /// Rebalancing needs at least one row of each class.
    #[error("cannot rebalance: {positives} positives and {negatives} negatives")]
    CannotRebalance { positives: usize, negatives: usize },
}

/// Validate that a size or count setting is at least 1.
pub fn ensure_positive(name: &'static str, value: usize) -> Result<usize, PipelineError> {
    if value > 0 {
        Ok(value)
    } else {
        Err(PipelineError::NonPositive { name })
    }
}

/// Validate that `value` lies strictly inside (0, 1).
pub fn ensure_open_unit(name: &'static str, value: f64) -> Result<f64, PipelineError> {
    if value > 0.0 && value < 1.0 {
        Ok(value)
    } else {
        Err(PipelineError::RateOutOfRange { name, value })
    }
}
