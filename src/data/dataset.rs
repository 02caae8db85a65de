use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

use crate::domain::class_balance::ClassWeights;
use crate::domain::sequence::TrainingSet;

/// One encoded pair with its label and loss weight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairSample {
    pub seq1:   Vec<u32>,
    pub seq2:   Vec<u32>,
    pub label:  f32,
    pub weight: f32,
}

pub struct PairDataset {
    samples: Vec<PairSample>,
}

impl PairDataset {
    pub fn new(samples: Vec<PairSample>) -> Self { Self { samples } }

    /// Flatten a TrainingSet into samples, attaching the class weight
    /// for each row's label.
    pub fn from_training_set(set: &TrainingSet, weights: ClassWeights) -> Self {
        let samples = set
            .rows()
            .map(|(a, b, y)| PairSample {
                seq1:   a.ids().to_vec(),
                seq2:   b.ids().to_vec(),
                label:  if y { 1.0 } else { 0.0 },
                weight: weights.for_label(y) as f32,
            })
            .collect();
        Self { samples }
    }

    pub fn sample_count(&self) -> usize { self.samples.len() }
}

impl Dataset<PairSample> for PairDataset {
    fn get(&self, index: usize) -> Option<PairSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
