// ============================================================
// Layer 4 — Negative Oversampling
// ============================================================
// An alternative to class weights: physically change the label
// mix of the training file so positives make up `ratio` of it.
//
// With P positives the target negative count is
//     K = floor(P / ratio - P)
// The negatives are repeated K / n_neg whole times, then the first
// K % n_neg negatives are appended. Positives are kept as they are.
// The combined rows are shuffled with a seeded RNG.
//
// Example: 3 positives, 2 negatives, ratio 0.25
//   K = floor(3 / 0.25 - 3) = 9
//   negatives × 4 (8 rows) + first 1 negative → 9 negatives
//   result: 12 rows, 3 / 12 = 25% positive

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::domain::error::{ensure_open_unit, PipelineError};
use crate::domain::question_pair::QuestionPair;

pub fn oversample_negatives(
    pairs: &[QuestionPair],
    ratio: f64,
    seed:  u64,
) -> Result<Vec<QuestionPair>, PipelineError> {
    let ratio = ensure_open_unit("ratio", ratio)?;

    let mut positives = Vec::new();
    let mut negatives = Vec::new();
    for pair in pairs {
        match pair.is_duplicate {
            Some(true)  => positives.push(pair.clone()),
            Some(false) => negatives.push(pair.clone()),
            None        => return Err(PipelineError::MissingLabel { id: pair.id }),
        }
    }

    if positives.is_empty() || negatives.is_empty() {
        return Err(PipelineError::CannotRebalance {
            positives: positives.len(),
            negatives: negatives.len(),
        });
    }

    let p      = positives.len() as f64;
    let target = (p / ratio - p).floor() as usize;
    let whole  = target / negatives.len();
    let rest   = target % negatives.len();

    let mut balanced = positives;
    balanced.reserve(target);
    for _ in 0..whole {
        balanced.extend(negatives.iter().cloned());
    }
    balanced.extend(negatives[..rest].iter().cloned());

    let mut rng = StdRng::seed_from_u64(seed);
    balanced.shuffle(&mut rng);

    tracing::info!(
        "Rebalanced {} rows → {} rows ({} negatives for {} positives)",
        pairs.len(),
        balanced.len(),
        target,
        p as usize,
    );

    Ok(balanced)
}
