// ============================================================
// Layer 4 — Sequence Encoder
// ============================================================
// Turns a normalised question into exactly `len` token ids.
//
//   tokens ≥ len → keep the LAST `len` ids (drop from the front)
//   tokens < len → pad with 0 on the LEFT
//
// Example with len = 5:
//   "how do i learn rust"          → [ h,  d,  i,  l,  r]
//   "learn rust"                   → [ 0,  0,  0,  l,  r]
//   "so how do i learn rust fast"  → [ d,  i,  l,  r,  f]
//
// Pre-padding keeps the end of the question next to the final
// state of the recurrent encoder.

use crate::data::vocabulary::Vocabulary;
use crate::domain::sequence::{EncodedSequence, PAD_ID};

pub fn encode(text: &str, vocab: &Vocabulary, len: usize) -> EncodedSequence {
    let ids: Vec<u32> = text.split_whitespace().map(|t| vocab.id(t)).collect();

    let kept = &ids[ids.len().saturating_sub(len)..];
    let mut padded = vec![PAD_ID; len - kept.len()];
    padded.extend_from_slice(kept);

    EncodedSequence::from_padded(padded)
}

/// Encode every text in order.
pub fn encode_all<S: AsRef<str>>(texts: &[S], vocab: &Vocabulary, len: usize) -> Vec<EncodedSequence> {
    texts.iter().map(|t| encode(t.as_ref(), vocab, len)).collect()
}
