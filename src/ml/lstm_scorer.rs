// ============================================================
// Layer 5 — Siamese LSTM Scorer
// ============================================================
// Wraps the Burn model behind the domain `Scorer` trait so the
// pipeline never sees tensors.
//
//   fit     → builds datasets (class weights attached per row),
//             runs the training loop, keeps the best epoch
//   predict → runs the best model on B::InnerBackend in chunks
//             of `predict_batch_size` rows
//
// Chunking only bounds memory: every row is scored on its own,
// so the output does not depend on the chunk size.

use anyhow::{anyhow, bail, ensure, Result};
use burn::{module::AutodiffModule, tensor::backend::AutodiffBackend};

use crate::data::{batcher::sequences_tensor, dataset::PairDataset};
use crate::domain::{
    class_balance::ClassWeights,
    sequence::{check_lengths, EncodedSequence, TrainingSet},
    traits::Scorer,
};
use crate::infra::{checkpoint::CheckpointManager, metrics::MetricsLogger};
use crate::ml::{
    model::{SiameseLstm, SiameseLstmConfig},
    trainer::{train, TrainingSettings, TrainingSinks},
};

pub struct LstmScorer<B: AutodiffBackend> {
    config:             SiameseLstmConfig,
    settings:           TrainingSettings,
    predict_batch_size: usize,
    embeddings:         Option<Vec<f32>>,
    checkpoints:        Option<CheckpointManager>,
    metrics:            Option<MetricsLogger>,
    device:             B::Device,
    model:              Option<SiameseLstm<B::InnerBackend>>,
}

impl<B: AutodiffBackend> LstmScorer<B> {
    pub fn new(
        config:             SiameseLstmConfig,
        settings:           TrainingSettings,
        predict_batch_size: usize,
        device:             B::Device,
    ) -> Self {
        Self {
            config,
            settings,
            predict_batch_size: predict_batch_size.max(1),
            embeddings:         None,
            checkpoints:        None,
            metrics:            None,
            device,
            model:              None,
        }
    }

    /// Start both towers from a pretrained, frozen embedding table.
    pub fn with_embeddings(mut self, table: Vec<f32>) -> Self {
        self.embeddings = Some(table);
        self
    }

    /// Save the best epoch and per-epoch metrics under `ckpt.dir()`.
    pub fn with_checkpoints(mut self, ckpt: CheckpointManager) -> Result<Self> {
        self.metrics     = Some(MetricsLogger::new(ckpt.dir())?);
        self.checkpoints = Some(ckpt);
        Ok(self)
    }

    /// Rebuild a fitted scorer from a checkpoint directory written
    /// by a previous `fit`.
    pub fn from_checkpoint(
        config:             SiameseLstmConfig,
        ckpt:               &CheckpointManager,
        predict_batch_size: usize,
        device:             B::Device,
    ) -> Result<Self> {
        let model = config.init::<B::InnerBackend>(&device);
        let model = ckpt.load_best(model, &device)?;

        let mut scorer = Self::new(config, TrainingSettings::default(), predict_batch_size, device);
        scorer.model = Some(model);
        Ok(scorer)
    }

    pub fn is_fitted(&self) -> bool {
        self.model.is_some()
    }

    fn initial_model(&self) -> Result<SiameseLstm<B>> {
        match &self.embeddings {
            Some(table) => {
                let expected = self.config.table_size * self.config.embedding_dim;
                ensure!(
                    table.len() == expected,
                    "embedding table has {} values, expected {} ({} x {})",
                    table.len(),
                    expected,
                    self.config.table_size,
                    self.config.embedding_dim
                );
                Ok(self.config.init_with_embeddings::<B>(table, &self.device))
            }
            None => Ok(self.config.init::<B>(&self.device)),
        }
    }
}

impl<B: AutodiffBackend> Scorer for LstmScorer<B> {
    fn fit(
        &mut self,
        train_set: &TrainingSet,
        valid:     Option<&TrainingSet>,
        weights:   Option<ClassWeights>,
    ) -> Result<()> {
        let weights = weights.unwrap_or_else(ClassWeights::uniform);
        tracing::info!(
            "Fitting on {} pairs ({} validation), class weights neg={:.4} pos={:.4}",
            train_set.len(),
            valid.map_or(0, TrainingSet::len),
            weights.negative,
            weights.positive,
        );

        let train_data = PairDataset::from_training_set(train_set, weights);
        // validation loss is reported unweighted
        let valid_data = valid.map(|v| PairDataset::from_training_set(v, ClassWeights::uniform()));

        let best = train(
            self.initial_model()?,
            train_data,
            valid_data,
            &self.settings,
            TrainingSinks {
                checkpoints: self.checkpoints.as_ref(),
                metrics:     self.metrics.as_ref(),
            },
            &self.device,
        )?;

        self.model = Some(best.valid());
        Ok(())
    }

    fn predict(&self, seq1: &[EncodedSequence], seq2: &[EncodedSequence]) -> Result<Vec<f64>> {
        let Some(model) = &self.model else {
            bail!("predict called before fit");
        };
        ensure!(
            seq1.len() == seq2.len(),
            "{} left sequences but {} right sequences",
            seq1.len(),
            seq2.len()
        );
        let Some(first) = seq1.first() else {
            return Ok(Vec::new());
        };

        let seq_len = first.len();
        check_lengths(seq1, seq_len)?;
        check_lengths(seq2, seq_len)?;

        let mut scores = Vec::with_capacity(seq1.len());
        for (left, right) in seq1
            .chunks(self.predict_batch_size)
            .zip(seq2.chunks(self.predict_batch_size))
        {
            let probs = model.forward(
                sequences_tensor::<B::InnerBackend>(left, seq_len, &self.device),
                sequences_tensor::<B::InnerBackend>(right, seq_len, &self.device),
            );
            let chunk: Vec<f32> = probs
                .into_data()
                .to_vec::<f32>()
                .map_err(|e| anyhow!("Cannot read predictions: {e:?}"))?;
            scores.extend(chunk.into_iter().map(f64::from));
        }

        tracing::debug!("Scored {} pairs", scores.len());
        Ok(scores)
    }
}
