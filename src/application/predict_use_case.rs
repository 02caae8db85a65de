// ============================================================
// Layer 2 — PredictUseCase
// ============================================================
// Scores a new evaluation CSV with a model trained earlier.
//
// Everything needed to reproduce the training-time encoding is
// read back from the checkpoint directory:
//
//   train_config.json   → sequence length, model shape, balance mode
//   vocab.json          → the exact token ids used in training
//   class_balance.json  → p_train / p_test for re-weighting
//   model_best.mpk.gz   → weights of the best epoch
//
// The same normaliser and symmetric averaging as `train` are
// applied, so a pair scored here gets the score `train` would
// have written for it.

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::application::{
    train_use_case::{encode_pairs, score, TrainConfig},
    TrainBackend,
};
use crate::data::{loader::CsvPairLoader, normalizer::Normalizer, vocabulary::Vocabulary};
use crate::domain::{
    class_balance::ClassBalance,
    question_pair::QuestionPair,
    traits::{PairSource, Scorer},
};
use crate::infra::{checkpoint::CheckpointManager, submission::write_predictions, vocab_store::VocabStore};
use crate::ml::lstm_scorer::LstmScorer;

pub struct PredictUseCase {
    checkpoint_dir: PathBuf,
    input_path:     PathBuf,
    output_path:    PathBuf,
}

impl PredictUseCase {
    pub fn new(
        checkpoint_dir: impl Into<PathBuf>,
        input_path:     impl Into<PathBuf>,
        output_path:    impl Into<PathBuf>,
    ) -> Self {
        Self {
            checkpoint_dir: checkpoint_dir.into(),
            input_path:     input_path.into(),
            output_path:    output_path.into(),
        }
    }

    /// Score with the saved Siamese LSTM. Returns the number of rows.
    pub fn execute(&self) -> Result<usize> {
        let saved  = self.load_saved()?;
        let device = burn::backend::wgpu::WgpuDevice::default();

        let scorer = LstmScorer::<TrainBackend>::from_checkpoint(
            saved.config.model_config(saved.vocab.table_size()),
            &saved.ckpt,
            saved.config.predict_batch_size,
            device,
        )?;
        self.score_file(&scorer, &saved)
    }

    /// Score with any fitted scorer, using the encoding settings
    /// stored in the checkpoint directory.
    pub fn execute_with<S: Scorer>(&self, scorer: &S) -> Result<usize> {
        let saved = self.load_saved()?;
        self.score_file(scorer, &saved)
    }

    fn load_saved(&self) -> Result<SavedRun> {
        let ckpt = CheckpointManager::new(&self.checkpoint_dir)?;
        Ok(SavedRun {
            config:  ckpt.load_config()?,
            balance: ckpt.load_balance()?,
            vocab:   VocabStore::new(&self.checkpoint_dir).load()?,
            ckpt,
        })
    }

    fn score_file<S: Scorer>(&self, scorer: &S, saved: &SavedRun) -> Result<usize> {
        let normalizer = Normalizer::new().context("Failed to compile normalisation rules")?;
        let pairs: Vec<QuestionPair> = CsvPairLoader::new(&self.input_path)
            .load_all()?
            .iter()
            .map(|p| p.map_text(|t| normalizer.normalize(t)))
            .collect();

        let cfg = &saved.config;
        let (seq1, seq2) = encode_pairs(&pairs, &saved.vocab, cfg.max_seq_len);
        let scores = score(scorer, &seq1, &seq2, cfg.balance_mode, &saved.balance)?;

        let ids: Vec<u64> = pairs.iter().map(|p| p.id).collect();
        write_predictions(&self.output_path, &ids, &scores)?;
        Ok(scores.len())
    }
}

/// Everything a previous `train` left in the checkpoint directory,
/// read once per prediction run.
struct SavedRun {
    ckpt:    CheckpointManager,
    config:  TrainConfig,
    balance: ClassBalance,
    vocab:   Vocabulary,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        class_balance::{BalanceMode, ClassWeights},
        sequence::{EncodedSequence, TrainingSet},
    };

    /// Scores 0.5 when both sides encode identically, 0 otherwise.
    struct SameIds;

    impl Scorer for SameIds {
        fn fit(&mut self, _: &TrainingSet, _: Option<&TrainingSet>, _: Option<ClassWeights>) -> Result<()> {
            Ok(())
        }

        fn predict(&self, seq1: &[EncodedSequence], seq2: &[EncodedSequence]) -> Result<Vec<f64>> {
            Ok(seq1.iter().zip(seq2).map(|(a, b)| if a == b { 0.5 } else { 0.0 }).collect())
        }
    }

    fn write_checkpoint(dir: &std::path::Path, mode: BalanceMode) {
        let ckpt = CheckpointManager::new(dir).unwrap();
        ckpt.save_config(&TrainConfig { max_seq_len: 4, balance_mode: mode, ..TrainConfig::default() }).unwrap();
        ckpt.save_balance(&ClassBalance::new(0.37, 0.1746).unwrap()).unwrap();
        VocabStore::new(dir)
            .save(&Vocabulary::build(&["what is up", "who are you"], 100))
            .unwrap();
    }

    #[test]
    fn test_scores_new_file_with_saved_vocabulary() {
        let dir = tempfile::tempdir().unwrap();
        write_checkpoint(dir.path(), BalanceMode::ClassWeights);
        let input  = dir.path().join("new.csv");
        let output = dir.path().join("out.csv");
        std::fs::write(&input, "test_id,question1,question2\n3,What's up?,what is up\n4,who,what\n").unwrap();

        let rows = PredictUseCase::new(dir.path(), &input, &output).execute_with(&SameIds).unwrap();
        assert_eq!(rows, 2);

        let text = std::fs::read_to_string(&output).unwrap();
        assert_eq!(text, "test_id,is_duplicate\n3,0.5\n4,0.0\n");
    }

    #[test]
    fn test_reweight_mode_is_replayed() {
        let dir = tempfile::tempdir().unwrap();
        write_checkpoint(dir.path(), BalanceMode::Reweight);
        let input  = dir.path().join("new.csv");
        let output = dir.path().join("out.csv");
        std::fs::write(&input, "test_id,question1,question2\n0,who,who\n").unwrap();

        PredictUseCase::new(dir.path(), &input, &output).execute_with(&SameIds).unwrap();

        let expected = ClassBalance::new(0.37, 0.1746).unwrap().reweight(0.5);
        let text = std::fs::read_to_string(&output).unwrap();
        assert_eq!(text.lines().nth(1).unwrap(), format!("0,{expected}"));
    }

    #[test]
    fn test_missing_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        let use_case = PredictUseCase::new(dir.path().join("nothing"), "in.csv", "out.csv");
        assert!(use_case.execute_with(&SameIds).is_err());
    }
}
