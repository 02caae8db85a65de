// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores model weights using Burn's named MessagePack
// recorder at full precision (f32), so a reloaded model scores
// exactly like the one kept in memory after training.
//
// Only the BEST model (lowest validation loss so far) is kept on
// disk; each improvement overwrites it. Files:
//
//   checkpoints/
//     model_best.mpk.gz    ← weights of the best epoch
//     best_epoch.json      ← {"epoch": 3, "val_loss": 0.41}
//     train_config.json    ← hyperparameters to rebuild the model
//     class_balance.json   ← p_train / p_test, for re-weighting at predict time
//     vocab.json           ← written by VocabStore
//
// The config is saved separately because the model has to be
// constructed with the right shape before weights can be loaded
// into it.
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use burn::{
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkGzFileRecorder, Recorder},
};
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}};

use crate::application::train_use_case::TrainConfig;
use crate::domain::class_balance::ClassBalance;
use crate::ml::model::SiameseLstm;

const MODEL_FILE:   &str = "model_best";
const BEST_FILE:    &str = "best_epoch.json";
const CONFIG_FILE:  &str = "train_config.json";
const BALANCE_FILE: &str = "class_balance.json";

type ModelRecorder = NamedMpkGzFileRecorder<FullPrecisionSettings>;

/// Which epoch produced the saved weights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BestEpoch {
    pub epoch:    usize,
    pub val_loss: f64,
}

pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create a manager rooted at `dir`, creating the directory.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create checkpoint dir '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Overwrite the best checkpoint with `model`.
    pub fn save_best<B: Backend>(&self, model: &SiameseLstm<B>, best: BestEpoch) -> Result<()> {
        let path = self.dir.join(MODEL_FILE);

        ModelRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save checkpoint to '{}'", path.display()))?;

        fs::write(self.dir.join(BEST_FILE), serde_json::to_string(&best)?)
            .with_context(|| format!("Failed to write {BEST_FILE}"))?;

        tracing::debug!("Saved checkpoint: epoch {} (val_loss={:.4})", best.epoch, best.val_loss);
        Ok(())
    }

    /// Load the best checkpoint into `model`, which must have the
    /// architecture recorded in `train_config.json`.
    pub fn load_best<B: Backend>(&self, model: SiameseLstm<B>, device: &B::Device) -> Result<SiameseLstm<B>> {
        let best = self.best_epoch()?;
        let path = self.dir.join(MODEL_FILE);

        tracing::info!("Loading checkpoint from epoch {} (val_loss={:.4})", best.epoch, best.val_loss);

        let record = ModelRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!("Cannot load checkpoint '{}'. Have you trained the model first?", path.display())
            })?;

        Ok(model.load_record(record))
    }

    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;
        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join(CONFIG_FILE);
        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read config from '{}'. Make sure you have run 'train' before 'predict'.",
                path.display()
            )
        })?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn save_balance(&self, balance: &ClassBalance) -> Result<()> {
        fs::write(self.dir.join(BALANCE_FILE), serde_json::to_string(balance)?)
            .with_context(|| format!("Failed to write {BALANCE_FILE}"))?;
        Ok(())
    }

    pub fn load_balance(&self) -> Result<ClassBalance> {
        let s = fs::read_to_string(self.dir.join(BALANCE_FILE))
            .with_context(|| format!("Cannot find '{BALANCE_FILE}'. Have you run 'train' first?"))?;
        Ok(serde_json::from_str(&s)?)
    }

    pub fn best_epoch(&self) -> Result<BestEpoch> {
        let s = fs::read_to_string(self.dir.join(BEST_FILE))
            .with_context(|| format!("Cannot find '{BEST_FILE}'. Have you run 'train' first?"))?;
        Ok(serde_json::from_str(&s)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::model::SiameseLstmConfig;
    use burn::backend::NdArray;

    #[test]
    fn test_config_roundtrip() {
        let dir  = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path()).unwrap();
        let cfg  = TrainConfig { max_seq_len: 12, ..TrainConfig::default() };
        ckpt.save_config(&cfg).unwrap();
        assert_eq!(ckpt.load_config().unwrap().max_seq_len, 12);
    }

    #[test]
    fn test_balance_roundtrip() {
        let dir     = tempfile::tempdir().unwrap();
        let ckpt    = CheckpointManager::new(dir.path()).unwrap();
        let balance = ClassBalance::new(0.37, 0.1746).unwrap();
        ckpt.save_balance(&balance).unwrap();
        assert_eq!(ckpt.load_balance().unwrap(), balance);
    }

    #[test]
    fn test_missing_checkpoint_is_reported() {
        let dir  = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path()).unwrap();
        assert!(ckpt.best_epoch().is_err());
        assert!(ckpt.load_config().is_err());
    }

    #[test]
    fn test_model_roundtrip() {
        let dir    = tempfile::tempdir().unwrap();
        let ckpt   = CheckpointManager::new(dir.path()).unwrap();
        let device = Default::default();
        let cfg    = SiameseLstmConfig::new(5).with_embedding_dim(3).with_lstm_units(2).with_dense_units(2);

        let saved = cfg.init::<NdArray>(&device);
        ckpt.save_best(&saved, BestEpoch { epoch: 2, val_loss: 0.5 }).unwrap();
        assert_eq!(ckpt.best_epoch().unwrap().epoch, 2);

        let fresh  = cfg.init::<NdArray>(&device);
        let loaded = ckpt.load_best(fresh, &device).unwrap();
        let a: Vec<f32> = saved.head.weight.val().into_data().iter::<f32>().collect();
        let b: Vec<f32> = loaded.head.weight.val().into_data().iter::<f32>().collect();
        assert_eq!(a, b);
    }
}
