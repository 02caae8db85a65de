// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Train + validation loop using Burn's DataLoader and Adam.
//
// Backend notes:
//   - Training runs on an AutodiffBackend so gradients exist
//   - model.valid() returns the model on B::InnerBackend, with
//     dropout switched off
//   - the validation batcher must therefore use B::InnerBackend
//
// Early stopping: the monitored loss is validation loss when a
// validation set exists, otherwise training loss. The best model
// so far is kept in memory (and on disk when a checkpoint
// manager is given) and returned at the end, so callers always
// predict with the best epoch rather than the last one.
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::{ensure, Result};
use burn::{
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use serde::{Deserialize, Serialize};

use crate::data::{batcher::PairBatcher, dataset::PairDataset};
use crate::infra::{
    checkpoint::{BestEpoch, CheckpointManager},
    metrics::{EpochMetrics, MetricsLogger},
};
use crate::ml::model::SiameseLstm;

/// Optimisation settings for one `fit`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingSettings {
    pub epochs:     usize,
    pub batch_size: usize,
    pub lr:         f64,
    pub patience:   usize,
    pub seed:       u64,
}

impl Default for TrainingSettings {
    fn default() -> Self {
        Self {
            epochs:     5,
            batch_size: 2048,
            lr:         1e-3,
            patience:   3,
            seed:       42,
        }
    }
}

/// Where per-epoch artefacts go. Both are optional so tests can
/// train without touching the filesystem.
#[derive(Default)]
pub struct TrainingSinks<'a> {
    pub checkpoints: Option<&'a CheckpointManager>,
    pub metrics:     Option<&'a MetricsLogger>,
}

/// Returns the model from the epoch with the lowest monitored loss.
pub fn train<B: AutodiffBackend>(
    mut model: SiameseLstm<B>,
    train_set: PairDataset,
    valid_set: Option<PairDataset>,
    settings:  &TrainingSettings,
    sinks:     TrainingSinks<'_>,
    device:    &B::Device,
) -> Result<SiameseLstm<B>> {
    ensure!(train_set.sample_count() > 0, "cannot train on an empty dataset");
    ensure!(settings.batch_size > 0, "batch_size must be positive");

    // ── Adam optimiser ────────────────────────────────────────────────────────
    // m = β1*m + (1-β1)*g        (mean)
    // v = β2*v + (1-β2)*g²       (variance)
    // θ = θ - lr * m / (√v + ε)  (update)
    let mut optim = AdamConfig::new()
        .with_epsilon(1e-8)
        .init::<B, SiameseLstm<B>>();

    // ── Training data loader (AutodiffBackend) ────────────────────────────────
    let train_loader = DataLoaderBuilder::new(PairBatcher::<B>::new(device.clone()))
        .batch_size(settings.batch_size)
        .shuffle(settings.seed)
        .num_workers(1)
        .build(train_set);

    // ── Validation data loader (InnerBackend, no autodiff overhead) ───────────
    let val_loader = valid_set
        .filter(|v| v.sample_count() > 0)
        .map(|v| {
            DataLoaderBuilder::new(PairBatcher::<B::InnerBackend>::new(device.clone()))
                .batch_size(settings.batch_size)
                .num_workers(1)
                .build(v)
        });

    let mut best_model = model.clone();
    let mut best_loss  = f64::INFINITY;
    let mut stale      = 0usize;

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 1..=settings.epochs {

        // ── Training phase ────────────────────────────────────────────────────
        let mut train_loss_sum = 0.0f64;
        let mut train_batches  = 0usize;

        for batch in train_loader.iter() {
            let (loss, _) = model.forward_loss(batch.seq1, batch.seq2, batch.labels, batch.weights);

            train_loss_sum += loss.clone().into_scalar().elem::<f64>();
            train_batches  += 1;

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(settings.lr, model, grads);
        }

        let avg_train_loss = if train_batches > 0 {
            train_loss_sum / train_batches as f64
        } else { f64::NAN };

        // ── Validation phase ──────────────────────────────────────────────────
        let (val_loss, val_acc) = match &val_loader {
            Some(loader) => {
                let model_valid = model.valid();

                let mut loss_sum = 0.0f64;
                let mut batches  = 0usize;
                let mut correct  = 0usize;
                let mut total    = 0usize;

                for batch in loader.iter() {
                    total += batch.labels.dims()[0];

                    let (loss, probs) = model_valid.forward_loss(
                        batch.seq1,
                        batch.seq2,
                        batch.labels.clone(),
                        batch.weights,
                    );
                    loss_sum += loss.into_scalar().elem::<f64>();
                    batches  += 1;

                    let hits: i64 = probs
                        .greater_equal_elem(0.5)
                        .equal(batch.labels.greater_equal_elem(0.5))
                        .int()
                        .sum()
                        .into_scalar()
                        .elem::<i64>();
                    correct += hits as usize;
                }

                (
                    if batches > 0 { loss_sum / batches as f64 } else { f64::NAN },
                    if total   > 0 { correct as f64 / total as f64 } else { 0.0 },
                )
            }
            None => (f64::NAN, f64::NAN),
        };

        tracing::info!(
            "Epoch {:>3}/{} | train_loss={:.4} | val_loss={:.4} | val_acc={:.1}%",
            epoch, settings.epochs, avg_train_loss, val_loss, val_acc * 100.0,
        );

        let metrics = EpochMetrics::new(epoch, avg_train_loss, val_loss, val_acc);
        if let Some(logger) = sinks.metrics {
            logger.log(&metrics)?;
        }

        // ── Early stopping on the monitored loss ──────────────────────────────
        if metrics.is_improvement(best_loss) {
            best_loss  = metrics.monitored_loss();
            best_model = model.clone();
            stale      = 0;
            if let Some(ckpt) = sinks.checkpoints {
                ckpt.save_best(&best_model, BestEpoch { epoch, val_loss: best_loss })?;
            }
        } else {
            stale += 1;
            if stale >= settings.patience {
                tracing::info!(
                    "No improvement for {} epochs, stopping after epoch {}",
                    stale, epoch,
                );
                break;
            }
        }
    }

    tracing::info!("Training complete (best loss {:.4})", best_loss);
    Ok(best_model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::PairSample;
    use crate::ml::model::SiameseLstmConfig;
    use burn::backend::{Autodiff, NdArray};

    type TestBackend = Autodiff<NdArray>;

    fn samples(n: usize) -> PairDataset {
        PairDataset::new(
            (0..n)
                .map(|i| PairSample {
                    seq1:   vec![0, 1, (i % 4) as u32 + 1],
                    seq2:   vec![2, 3, (i % 4) as u32 + 1],
                    label:  (i % 2) as f32,
                    weight: 1.0,
                })
                .collect(),
        )
    }

    fn settings(epochs: usize) -> TrainingSettings {
        TrainingSettings { epochs, batch_size: 4, lr: 1e-2, patience: 2, seed: 7 }
    }

    fn tiny_model() -> SiameseLstm<TestBackend> {
        SiameseLstmConfig::new(5)
            .with_embedding_dim(4)
            .with_lstm_units(3)
            .with_dense_units(2)
            .init(&Default::default())
    }

    #[test]
    fn test_train_writes_metrics_and_checkpoint() {
        let dir     = tempfile::tempdir().unwrap();
        let ckpt    = CheckpointManager::new(dir.path()).unwrap();
        let metrics = MetricsLogger::new(dir.path()).unwrap();

        train(
            tiny_model(),
            samples(8),
            Some(samples(4)),
            &settings(2),
            TrainingSinks { checkpoints: Some(&ckpt), metrics: Some(&metrics) },
            &Default::default(),
        )
        .unwrap();

        let rows = std::fs::read_to_string(metrics.csv_path()).unwrap();
        assert_eq!(rows.lines().count(), 3); // header + 2 epochs
        assert!(ckpt.best_epoch().unwrap().epoch >= 1);
    }

    #[test]
    fn test_train_without_validation() {
        let model = train(
            tiny_model(),
            samples(6),
            None,
            &settings(1),
            TrainingSinks::default(),
            &Default::default(),
        );
        assert!(model.is_ok());
    }

    #[test]
    fn test_empty_dataset_is_rejected() {
        let result = train(
            tiny_model(),
            PairDataset::new(Vec::new()),
            None,
            &settings(1),
            TrainingSinks::default(),
            &Default::default(),
        );
        assert!(result.is_err());
    }
}
