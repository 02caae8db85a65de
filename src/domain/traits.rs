// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The pipeline talks to its collaborators only through these
// traits:
//   - PairSource → where question pairs come from (CSV today)
//   - Scorer     → anything that can be fitted on encoded pairs
//                  and then return a duplicate probability
//
// The Siamese LSTM in the ml layer is one Scorer. Tests use
// small hand-written scorers so the pipeline can be checked
// without a GPU.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::{ensure, Result};

use crate::domain::class_balance::ClassWeights;
use crate::domain::question_pair::QuestionPair;
use crate::domain::sequence::{EncodedSequence, TrainingSet};

// ─── PairSource ───────────────────────────────────────────────────────────────
/// Any component that can produce question pairs.
pub trait PairSource {
    fn load_all(&self) -> Result<Vec<QuestionPair>>;
}

// ─── Scorer ───────────────────────────────────────────────────────────────────
/// A trainable model mapping an ordered pair of encoded questions
/// to a duplicate probability in [0, 1].
pub trait Scorer {
    /// Fit on `train`, optionally monitoring `valid`.
    /// `weights` are per-class loss weights; `None` means unweighted.
    fn fit(
        &mut self,
        train:   &TrainingSet,
        valid:   Option<&TrainingSet>,
        weights: Option<ClassWeights>,
    ) -> Result<()>;

    /// Score each row `(seq1[i], seq2[i])`, in input order.
    fn predict(&self, seq1: &[EncodedSequence], seq2: &[EncodedSequence]) -> Result<Vec<f64>>;

    /// Score both orderings and average them:
    ///   (score(a, b) + score(b, a)) / 2
    fn predict_symmetric(
        &self,
        seq1: &[EncodedSequence],
        seq2: &[EncodedSequence],
    ) -> Result<Vec<f64>> {
        ensure!(
            seq1.len() == seq2.len(),
            "predict_symmetric: {} left sequences but {} right sequences",
            seq1.len(),
            seq2.len()
        );
        let forward  = self.predict(seq1, seq2)?;
        let backward = self.predict(seq2, seq1)?;
        ensure!(
            forward.len() == seq1.len() && backward.len() == seq1.len(),
            "scorer returned {} / {} scores for {} rows",
            forward.len(),
            backward.len(),
            seq1.len()
        );
        Ok(forward
            .iter()
            .zip(backward.iter())
            .map(|(f, b)| (f + b) / 2.0)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deliberately order-sensitive: score depends on the first id of
    /// the left sequence only.
    struct LeftBiased;

    impl Scorer for LeftBiased {
        fn fit(&mut self, _: &TrainingSet, _: Option<&TrainingSet>, _: Option<ClassWeights>) -> Result<()> {
            Ok(())
        }

        fn predict(&self, seq1: &[EncodedSequence], _seq2: &[EncodedSequence]) -> Result<Vec<f64>> {
            Ok(seq1.iter().map(|s| s.ids()[0] as f64 / 10.0).collect())
        }
    }

    fn seq(id: u32) -> EncodedSequence {
        EncodedSequence::from_ids(vec![id], 1).unwrap()
    }

    #[test]
    fn test_predict_symmetric_averages_both_orders() {
        let out = LeftBiased
            .predict_symmetric(&[seq(2), seq(8)], &[seq(6), seq(0)])
            .unwrap();
        assert!((out[0] - 0.4).abs() < 1e-12);
        assert!((out[1] - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_predict_symmetric_is_order_invariant() {
        let a = LeftBiased.predict_symmetric(&[seq(3)], &[seq(9)]).unwrap();
        let b = LeftBiased.predict_symmetric(&[seq(9)], &[seq(3)]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_predict_symmetric_rejects_ragged_input() {
        assert!(LeftBiased.predict_symmetric(&[seq(1)], &[]).is_err());
    }
}
