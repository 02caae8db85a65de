// ============================================================
// Layer 4 — Pair Batcher
// ============================================================
// Implements Burn's Batcher trait to convert a Vec<PairSample>
// into tensors for the Siamese model.
//
// How batching works here:
//   Input:  N PairSamples, each with two sequences of length S
//   Output: PairBatch with
//             seq1, seq2 : [N, S]  (Int)
//             labels     : [N]     (Float, 0.0 / 1.0)
//             weights    : [N]     (Float, per-sample loss weight)
//
// Every sequence is already padded to S by the encoder, so
// flattening and reshaping is enough.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::PairSample;
use crate::domain::sequence::EncodedSequence;

#[derive(Debug, Clone)]
pub struct PairBatch<B: Backend> {
    pub seq1:    Tensor<B, 2, Int>,
    pub seq2:    Tensor<B, 2, Int>,
    pub labels:  Tensor<B, 1>,
    pub weights: Tensor<B, 1>,
}

#[derive(Clone, Debug)]
pub struct PairBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> PairBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

/// Stack equal-length id rows into an `[rows, seq_len]` Int tensor.
pub fn ids_tensor<B: Backend, I>(rows: I, seq_len: usize, device: &B::Device) -> Tensor<B, 2, Int>
where
    I: IntoIterator,
    I::Item: AsRef<[u32]>,
{
    let flat: Vec<i32> = rows
        .into_iter()
        .flat_map(|r| r.as_ref().iter().map(|&x| x as i32).collect::<Vec<_>>())
        .collect();
    let n = if seq_len == 0 { 0 } else { flat.len() / seq_len };

    Tensor::<B, 1, Int>::from_ints(flat.as_slice(), device).reshape([n, seq_len])
}

/// Same as [`ids_tensor`] for a slice of encoded sequences.
pub fn sequences_tensor<B: Backend>(seqs: &[EncodedSequence], seq_len: usize, device: &B::Device) -> Tensor<B, 2, Int> {
    ids_tensor::<B, _>(seqs.iter().map(|s| s.ids()), seq_len, device)
}

impl<B: Backend> Batcher<PairSample, PairBatch<B>> for PairBatcher<B> {
    fn batch(&self, items: Vec<PairSample>) -> PairBatch<B> {
        let seq_len = items[0].seq1.len();

        let seq1 = ids_tensor::<B, _>(items.iter().map(|s| &s.seq1), seq_len, &self.device);
        let seq2 = ids_tensor::<B, _>(items.iter().map(|s| &s.seq2), seq_len, &self.device);

        let labels: Vec<f32>  = items.iter().map(|s| s.label).collect();
        let weights: Vec<f32> = items.iter().map(|s| s.weight).collect();

        PairBatch {
            seq1,
            seq2,
            labels:  Tensor::<B, 1>::from_floats(labels.as_slice(), &self.device),
            weights: Tensor::<B, 1>::from_floats(weights.as_slice(), &self.device),
        }
    }
}
