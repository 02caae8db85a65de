// ============================================================
// Layer 3 — Class-Balance Correction
// ============================================================
// The training data has a different share of duplicates than the
// data we are scored on. Two statistics describe the mismatch:
//
//   p_train — observed positive rate in the training labels
//   p_test  — positive rate of the deployment distribution
//
// From them we derive two *alternative* corrections:
//
//   1. Class weights for the loss (applied before/while fitting)
//        w(0) = (1 - p_test) / (1 - p_train)
//        w(1) =      p_test  /      p_train
//
//   2. Posterior re-weighting of a raw score s (after predicting)
//        pa = p_test / p_train
//        pb = (1 - p_test) / (1 - p_train)
//        r  = pa*s / (pa*s + pb*(1 - s))
//
// Using both corrects twice. `BalanceMode` picks at most one.
//
// Reference: Saerens et al. (2002) — adjusting classifier outputs
//            to new a priori probabilities

use serde::{Deserialize, Serialize};

use crate::domain::error::{ensure_open_unit, PipelineError};

/// Which correction (if any) a run applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BalanceMode {
    /// Weight the loss per class during fitting
    #[default]
    ClassWeights,
    /// Train unweighted, re-weight predicted probabilities
    Reweight,
    /// No correction
    None,
}

/// Per-class loss weights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassWeights {
    pub negative: f64,
    pub positive: f64,
}

impl ClassWeights {
    /// Both classes weigh 1.0.
    pub fn uniform() -> Self {
        Self { negative: 1.0, positive: 1.0 }
    }

    pub fn for_label(&self, is_duplicate: bool) -> f64 {
        if is_duplicate { self.positive } else { self.negative }
    }
}

/// The (p_train, p_test) statistic pair for one run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassBalance {
    observed_positive_rate: f64,
    target_positive_rate:   f64,
}

impl ClassBalance {
    pub fn new(observed_positive_rate: f64, target_positive_rate: f64) -> Result<Self, PipelineError> {
        if !(observed_positive_rate > 0.0 && observed_positive_rate < 1.0) {
            return Err(PipelineError::DegenerateLabels { rate: observed_positive_rate });
        }
        let target_positive_rate = ensure_open_unit("target_positive_rate", target_positive_rate)?;
        Ok(Self { observed_positive_rate, target_positive_rate })
    }

    /// Derive p_train from a column of labels.
    pub fn from_labels(labels: &[bool], target_positive_rate: f64) -> Result<Self, PipelineError> {
        if labels.is_empty() {
            return Err(PipelineError::EmptyTrainingSet);
        }
        let positives = labels.iter().filter(|&&y| y).count();
        Self::new(positives as f64 / labels.len() as f64, target_positive_rate)
    }

    pub fn observed_positive_rate(&self) -> f64 {
        self.observed_positive_rate
    }

    pub fn target_positive_rate(&self) -> f64 {
        self.target_positive_rate
    }

    pub fn class_weights(&self) -> ClassWeights {
        ClassWeights {
            negative: (1.0 - self.target_positive_rate) / (1.0 - self.observed_positive_rate),
            positive: self.target_positive_rate / self.observed_positive_rate,
        }
    }

    /// Map a score produced under the training prior to a probability
    /// under the target prior.
    pub fn reweight(&self, score: f64) -> f64 {
        let w  = self.class_weights();
        let pa = w.positive * score;
        let pb = w.negative * (1.0 - score);
        pa / (pa + pb)
    }

    pub fn reweight_all(&self, scores: &[f64]) -> Vec<f64> {
        scores.iter().map(|&s| self.reweight(s)).collect()
    }
}
