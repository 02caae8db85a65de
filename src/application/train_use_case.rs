// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load train + test CSVs          (Layer 4 - data)
//   Step 2: Normalise question text         (Layer 4 - data)
//   Step 3: Class balance, fail fast        (Layer 3 - domain)
//   Step 4: Build + save vocabulary         (Layer 4 / 6)
//   Step 5: Encode both questions           (Layer 4 - data)
//   Step 6: Split train/validation          (Layer 4 - data)
//   Step 7: Augment with swapped pairs      (Layer 4 - data)
//   Step 8: Fit the scorer                  (Layer 5 - ml)
//   Step 9: Predict symmetrically, correct  (Layer 3 / 5)
//   Step 10: Write submission CSV(s)        (Layer 6 - infra)
//
// Every configuration problem (degenerate labels, bad rates,
// empty corpus) is raised before the scorer is built.
//
// Reference: Rust Book §13 (Iterators and Closures)
//            Burn Book §5 (Training)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::application::TrainBackend;
use crate::data::{
    augmenter::augment,
    encoder::encode_all,
    loader::CsvPairLoader,
    normalizer::Normalizer,
    splitter::split_train_val,
    vocabulary::Vocabulary,
};
use crate::domain::{
    class_balance::{BalanceMode, ClassBalance},
    error::{ensure_open_unit, ensure_positive, PipelineError},
    question_pair::QuestionPair,
    sequence::{EncodedSequence, TrainingSet},
    traits::{PairSource, Scorer},
};
use crate::infra::{
    checkpoint::CheckpointManager,
    embeddings::load_embedding_table,
    submission::write_predictions,
    vocab_store::VocabStore,
};
use crate::ml::{
    lstm_scorer::LstmScorer,
    model::SiameseLstmConfig,
    trainer::TrainingSettings,
};

// ─── Training Configuration ──────────────────────────────────────────────────
// All settings for a training run.
// Serialisable so it can be saved next to the checkpoint and
// reloaded by `predict` to rebuild the same model and encoder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub train_path:             PathBuf,
    pub test_path:              PathBuf,
    pub submission_path:        PathBuf,
    pub train_predictions_path: Option<PathBuf>,
    pub checkpoint_dir:         PathBuf,
    pub embeddings_path:        Option<PathBuf>,
    pub max_seq_len:            usize,
    pub max_vocab_size:         usize,
    pub embedding_dim:          usize,
    pub lstm_units:             usize,
    pub dense_units:            usize,
    pub dropout:                f64,
    pub epochs:                 usize,
    pub batch_size:             usize,
    pub predict_batch_size:     usize,
    pub lr:                     f64,
    pub validation_fraction:    f64,
    pub patience:               usize,
    pub seed:                   u64,
    pub target_positive_rate:   f64,
    pub augment:                bool,
    pub balance_mode:           BalanceMode,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            train_path:             PathBuf::from("data/train.csv"),
            test_path:              PathBuf::from("data/test.csv"),
            submission_path:        PathBuf::from("submission.csv"),
            train_predictions_path: None,
            checkpoint_dir:         PathBuf::from("checkpoints"),
            embeddings_path:        None,
            max_seq_len:            40,
            max_vocab_size:         200_000,
            embedding_dim:          300,
            lstm_units:             225,
            dense_units:            125,
            dropout:                0.25,
            epochs:                 5,
            batch_size:             2048,
            predict_batch_size:     8192,
            lr:                     1e-3,
            validation_fraction:    0.1,
            patience:               3,
            seed:                   42,
            target_positive_rate:   0.1746,
            augment:                true,
            balance_mode:           BalanceMode::ClassWeights,
        }
    }
}

impl TrainConfig {
    /// Reject settings that would only fail halfway through a run.
    pub fn validate(&self) -> Result<(), PipelineError> {
        for (name, value) in [
            ("max_seq_len",        self.max_seq_len),
            ("max_vocab_size",     self.max_vocab_size),
            ("embedding_dim",      self.embedding_dim),
            ("lstm_units",         self.lstm_units),
            ("dense_units",        self.dense_units),
            ("epochs",             self.epochs),
            ("batch_size",         self.batch_size),
            ("predict_batch_size", self.predict_batch_size),
        ] {
            ensure_positive(name, value)?;
        }
        ensure_open_unit("target_positive_rate", self.target_positive_rate)?;
        if !(0.0..1.0).contains(&self.validation_fraction) {
            return Err(PipelineError::RateOutOfRange {
                name:  "validation_fraction",
                value: self.validation_fraction,
            });
        }
        if !(0.0..1.0).contains(&self.dropout) {
            return Err(PipelineError::RateOutOfRange { name: "dropout", value: self.dropout });
        }
        Ok(())
    }

    pub fn model_config(&self, table_size: usize) -> SiameseLstmConfig {
        SiameseLstmConfig::new(table_size)
            .with_embedding_dim(self.embedding_dim)
            .with_lstm_units(self.lstm_units)
            .with_dense_units(self.dense_units)
            .with_dropout(self.dropout)
    }

    pub fn training_settings(&self) -> TrainingSettings {
        TrainingSettings {
            epochs:     self.epochs,
            batch_size: self.batch_size,
            lr:         self.lr,
            patience:   self.patience,
            seed:       self.seed,
        }
    }
}

/// What a run produced, for the CLI summary.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainReport {
    pub observed_positive_rate: f64,
    pub vocab_size:             usize,
    pub train_rows:             usize,
    pub valid_rows:             usize,
    pub prediction_mean:        f64,
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline with the Siamese LSTM on the GPU backend.
    pub fn execute(&self) -> Result<TrainReport> {
        let cfg = &self.config;
        self.execute_with(|vocab| {
            let device = burn::backend::wgpu::WgpuDevice::default();
            tracing::info!("Using WGPU device: {:?}", device);

            let ckpt   = CheckpointManager::new(&cfg.checkpoint_dir)?;
            let scorer = LstmScorer::<TrainBackend>::new(
                cfg.model_config(vocab.table_size()),
                cfg.training_settings(),
                cfg.predict_batch_size,
                device,
            )
            .with_checkpoints(ckpt)?;

            match &cfg.embeddings_path {
                Some(path) => {
                    let table = load_embedding_table(path, vocab, cfg.embedding_dim)?;
                    Ok(scorer.with_embeddings(table.weights))
                }
                None => Ok(scorer),
            }
        })
    }

    /// Run the pipeline with any scorer. `make_scorer` is called once
    /// the vocabulary is known, after all configuration checks.
    pub fn execute_with<S, F>(&self, make_scorer: F) -> Result<TrainReport>
    where
        S: Scorer,
        F: FnOnce(&Vocabulary) -> Result<S>,
    {
        let cfg = &self.config;
        cfg.validate()?;

        // ── Step 1: Load pairs ────────────────────────────────────────────────
        let train_raw = CsvPairLoader::new(&cfg.train_path).load_all()?;
        let test_raw  = CsvPairLoader::new(&cfg.test_path).load_all()?;

        // ── Step 2: Normalise ─────────────────────────────────────────────────
        let normalizer = Normalizer::new().context("Failed to compile normalisation rules")?;
        let train_pairs: Vec<QuestionPair> = train_raw
            .iter()
            .map(|p| p.map_text(|t| normalizer.normalize(t)))
            .collect();
        let test_pairs: Vec<QuestionPair> = test_raw
            .iter()
            .map(|p| p.map_text(|t| normalizer.normalize(t)))
            .collect();

        // ── Step 3: Labels + class balance ────────────────────────────────────
        let labels = train_pairs
            .iter()
            .map(|p| p.is_duplicate.ok_or(PipelineError::MissingLabel { id: p.id }))
            .collect::<Result<Vec<bool>, _>>()?;
        let balance = ClassBalance::from_labels(&labels, cfg.target_positive_rate)?;
        tracing::info!(
            "Positive rate: observed {:.4}, target {:.4} ({:?})",
            balance.observed_positive_rate(),
            balance.target_positive_rate(),
            cfg.balance_mode,
        );

        // ── Step 4: Vocabulary on train + test text ───────────────────────────
        let corpus: Vec<&str> = train_pairs
            .iter()
            .chain(test_pairs.iter())
            .flat_map(|p| [p.question1.as_str(), p.question2.as_str()])
            .collect();
        let vocab = Vocabulary::build(&corpus, cfg.max_vocab_size);
        if vocab.is_empty() {
            return Err(PipelineError::EmptyCorpus.into());
        }
        tracing::info!("Vocabulary: {} words (cap {})", vocab.len(), cfg.max_vocab_size);

        VocabStore::new(&cfg.checkpoint_dir).save(&vocab)?;
        let ckpt = CheckpointManager::new(&cfg.checkpoint_dir)?;
        ckpt.save_config(cfg)?;
        ckpt.save_balance(&balance)?;

        // ── Step 5: Encode ────────────────────────────────────────────────────
        let (train_seq1, train_seq2) = encode_pairs(&train_pairs, &vocab, cfg.max_seq_len);
        let (test_seq1, test_seq2)   = encode_pairs(&test_pairs, &vocab, cfg.max_seq_len);
        tracing::info!(
            "Encoded {} train / {} test pairs, sequence length {}",
            train_seq1.len(),
            test_seq1.len(),
            cfg.max_seq_len,
        );

        // ── Step 6: Train / validation split (before augmentation) ────────────
        let (train_idx, valid_idx) = split_train_val(
            (0..labels.len()).collect(),
            1.0 - cfg.validation_fraction,
            cfg.seed,
        );
        let train_set = select_rows(&train_idx, &train_seq1, &train_seq2, &labels, cfg.max_seq_len)?;
        let valid_set = select_rows(&valid_idx, &train_seq1, &train_seq2, &labels, cfg.max_seq_len)?;
        if train_set.is_empty() {
            return Err(PipelineError::EmptyTrainingSet.into());
        }

        // ── Step 7: Augment ───────────────────────────────────────────────────
        let train_set = if cfg.augment { augment(&train_set) } else { train_set };
        tracing::info!("Training rows: {} ({} validation)", train_set.len(), valid_set.len());

        // ── Step 8: Fit ───────────────────────────────────────────────────────
        let weights = match cfg.balance_mode {
            BalanceMode::ClassWeights => Some(balance.class_weights()),
            BalanceMode::Reweight | BalanceMode::None => None,
        };
        let mut scorer = make_scorer(&vocab)?;
        let valid = (!valid_set.is_empty()).then_some(&valid_set);
        scorer.fit(&train_set, valid, weights)?;

        // ── Step 9 + 10: Predict, correct, write ──────────────────────────────
        let test_scores = score(&scorer, &test_seq1, &test_seq2, cfg.balance_mode, &balance)?;
        let test_ids: Vec<u64> = test_pairs.iter().map(|p| p.id).collect();
        write_predictions(&cfg.submission_path, &test_ids, &test_scores)?;

        if let Some(path) = &cfg.train_predictions_path {
            let in_sample = score(&scorer, &train_seq1, &train_seq2, cfg.balance_mode, &balance)?;
            let train_ids: Vec<u64> = train_pairs.iter().map(|p| p.id).collect();
            write_predictions(path, &train_ids, &in_sample)?;
        }

        let prediction_mean = test_scores.iter().sum::<f64>() / test_scores.len().max(1) as f64;
        tracing::info!("Mean test prediction: {:.4}", prediction_mean);

        Ok(TrainReport {
            observed_positive_rate: balance.observed_positive_rate(),
            vocab_size:             vocab.len(),
            train_rows:             train_set.len(),
            valid_rows:             valid_set.len(),
            prediction_mean,
        })
    }
}

pub(crate) fn encode_pairs(
    pairs:   &[QuestionPair],
    vocab:   &Vocabulary,
    seq_len: usize,
) -> (Vec<EncodedSequence>, Vec<EncodedSequence>) {
    let q1: Vec<&str> = pairs.iter().map(|p| p.question1.as_str()).collect();
    let q2: Vec<&str> = pairs.iter().map(|p| p.question2.as_str()).collect();
    (encode_all(&q1, vocab, seq_len), encode_all(&q2, vocab, seq_len))
}

/// Symmetric prediction, then posterior re-weighting when the run
/// is configured for it.
pub(crate) fn score<S: Scorer>(
    scorer:  &S,
    seq1:    &[EncodedSequence],
    seq2:    &[EncodedSequence],
    mode:    BalanceMode,
    balance: &ClassBalance,
) -> Result<Vec<f64>> {
    let raw = scorer.predict_symmetric(seq1, seq2)?;
    Ok(match mode {
        BalanceMode::Reweight => balance.reweight_all(&raw),
        BalanceMode::ClassWeights | BalanceMode::None => raw,
    })
}

fn select_rows(
    rows:    &[usize],
    seq1:    &[EncodedSequence],
    seq2:    &[EncodedSequence],
    labels:  &[bool],
    seq_len: usize,
) -> Result<TrainingSet, PipelineError> {
    TrainingSet::new(
        rows.iter().map(|&i| seq1[i].clone()).collect(),
        rows.iter().map(|&i| seq2[i].clone()).collect(),
        rows.iter().map(|&i| labels[i]).collect(),
        seq_len,
    )
}
