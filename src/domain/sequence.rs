// ============================================================
// Layer 3 — Encoded Sequences and Training Sets
// ============================================================
// EncodedSequence: a question turned into exactly `len` token ids.
// TrainingSet:     parallel (seq1, seq2, label) columns.
//
// Both types check their invariants on construction, so any
// value that exists is already well-formed.

use crate::domain::error::PipelineError;

/// Token id used for padding and for out-of-vocabulary words.
pub const PAD_ID: u32 = 0;

/// A fixed-length sequence of vocabulary ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncodedSequence(Vec<u32>);

impl EncodedSequence {
    /// Wrap ids that are already exactly `expected_len` long.
    pub fn from_ids(ids: Vec<u32>, expected_len: usize) -> Result<Self, PipelineError> {
        if ids.len() != expected_len {
            return Err(PipelineError::SequenceLength {
                row:      0,
                expected: expected_len,
                actual:   ids.len(),
            });
        }
        Ok(Self(ids))
    }

    /// Used by the encoder, which guarantees the length itself.
    pub(crate) fn from_padded(ids: Vec<u32>) -> Self {
        Self(ids)
    }

    pub fn ids(&self) -> &[u32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of non-padding ids.
    pub fn token_count(&self) -> usize {
        self.0.iter().filter(|&&id| id != PAD_ID).count()
    }
}

/// Labelled sequence pairs in column form.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSet {
    seq1:    Vec<EncodedSequence>,
    seq2:    Vec<EncodedSequence>,
    labels:  Vec<bool>,
    seq_len: usize,
}

impl TrainingSet {
    /// Build a set, checking that the three columns line up and
    /// every sequence has length `seq_len`.
    pub fn new(
        seq1:    Vec<EncodedSequence>,
        seq2:    Vec<EncodedSequence>,
        labels:  Vec<bool>,
        seq_len: usize,
    ) -> Result<Self, PipelineError> {
        let n = seq1.len();
        if seq2.len() != n {
            return Err(PipelineError::LengthMismatch {
                what: "seq2", expected: n, actual: seq2.len(),
            });
        }
        if labels.len() != n {
            return Err(PipelineError::LengthMismatch {
                what: "labels", expected: n, actual: labels.len(),
            });
        }
        check_lengths(&seq1, seq_len)?;
        check_lengths(&seq2, seq_len)?;
        Ok(Self { seq1, seq2, labels, seq_len })
    }

    /// Columns built from an existing valid set (reordered or mirrored).
    pub(crate) fn from_aligned(
        seq1:    Vec<EncodedSequence>,
        seq2:    Vec<EncodedSequence>,
        labels:  Vec<bool>,
        seq_len: usize,
    ) -> Self {
        debug_assert!(seq1.len() == labels.len() && seq2.len() == labels.len());
        Self { seq1, seq2, labels, seq_len }
    }

    pub fn seq1(&self) -> &[EncodedSequence] {
        &self.seq1
    }

    pub fn seq2(&self) -> &[EncodedSequence] {
        &self.seq2
    }

    pub fn labels(&self) -> &[bool] {
        &self.labels
    }

    pub fn seq_len(&self) -> usize {
        self.seq_len
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Iterate rows as `(seq1, seq2, label)`.
    pub fn rows(&self) -> impl Iterator<Item = (&EncodedSequence, &EncodedSequence, bool)> + '_ {
        self.seq1
            .iter()
            .zip(self.seq2.iter())
            .zip(self.labels.iter())
            .map(|((a, b), &y)| (a, b, y))
    }

    pub fn into_parts(self) -> (Vec<EncodedSequence>, Vec<EncodedSequence>, Vec<bool>) {
        (self.seq1, self.seq2, self.labels)
    }
}

/// Verify every sequence in `seqs` has length `expected`.
pub fn check_lengths(seqs: &[EncodedSequence], expected: usize) -> Result<(), PipelineError> {
    match seqs.iter().position(|s| s.len() != expected) {
        Some(row) => Err(PipelineError::SequenceLength {
            row,
            expected,
            actual: seqs[row].len(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(ids: &[u32]) -> EncodedSequence {
        EncodedSequence::from_ids(ids.to_vec(), ids.len()).unwrap()
    }

    #[test]
    fn test_from_ids_rejects_wrong_length() {
        let err = EncodedSequence::from_ids(vec![1, 2], 3).unwrap_err();
        assert_eq!(err, PipelineError::SequenceLength { row: 0, expected: 3, actual: 2 });
    }

    #[test]
    fn test_token_count_ignores_padding() {
        assert_eq!(seq(&[0, 0, 4, 9]).token_count(), 2);
    }

    #[test]
    fn test_training_set_rejects_mismatched_columns() {
        let err = TrainingSet::new(
            vec![seq(&[1, 2])],
            vec![seq(&[3, 4]), seq(&[5, 6])],
            vec![true],
            2,
        ).unwrap_err();
        assert!(matches!(err, PipelineError::LengthMismatch { what: "seq2", .. }));

        let err = TrainingSet::new(vec![seq(&[1, 2])], vec![seq(&[3, 4])], vec![], 2).unwrap_err();
        assert!(matches!(err, PipelineError::LengthMismatch { what: "labels", .. }));
    }

    #[test]
    fn test_training_set_rejects_wrong_sequence_length() {
        let err = TrainingSet::new(
            vec![seq(&[1, 2]), seq(&[1, 2, 3])],
            vec![seq(&[3, 4]), seq(&[3, 4])],
            vec![true, false],
            2,
        ).unwrap_err();
        assert_eq!(err, PipelineError::SequenceLength { row: 1, expected: 2, actual: 3 });
    }

    #[test]
    fn test_rows_iterates_in_order() {
        let set = TrainingSet::new(
            vec![seq(&[1]), seq(&[2])],
            vec![seq(&[3]), seq(&[4])],
            vec![true, false],
            1,
        ).unwrap();
        let rows: Vec<_> = set.rows().map(|(a, b, y)| (a.ids()[0], b.ids()[0], y)).collect();
        assert_eq!(rows, vec![(1, 3, true), (2, 4, false)]);
    }
}
