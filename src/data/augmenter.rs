// ============================================================
// Layer 4 — Symmetric Augmenter
// ============================================================
// "Is A a duplicate of B?" has the same answer as "Is B a
// duplicate of A?". Training on both orderings teaches the scorer
// that the slot a question arrives in carries no information.
//
// Layout of the output for N input rows:
//   rows 0..N    → the original (seq1, seq2, label)
//   rows N..2N   → row i - N with seq1 and seq2 swapped
//
// Only labelled training data is augmented.

use crate::domain::sequence::TrainingSet;

pub fn augment(set: &TrainingSet) -> TrainingSet {
    let (s1, s2, labels) = set.clone().into_parts();

    let mut seq1 = s1.clone();
    seq1.extend(s2.iter().cloned());

    let mut seq2 = s2;
    seq2.extend(s1);

    let mut doubled = labels.clone();
    doubled.extend(labels);

    TrainingSet::from_aligned(seq1, seq2, doubled, set.seq_len())
}
