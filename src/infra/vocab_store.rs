// ============================================================
// Layer 6 — Vocabulary Store
// ============================================================
// Persists the vocabulary next to the checkpoint so `predict`
// encodes text with exactly the ids the model was trained on.
//
// File: <checkpoint_dir>/vocab.json
//   {"words": ["the", "what", "is", ...]}   (position + 1 = id)

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::data::vocabulary::Vocabulary;

const VOCAB_FILE: &str = "vocab.json";

pub struct VocabStore {
    dir: PathBuf,
}

impl VocabStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(VOCAB_FILE)
    }

    pub fn save(&self, vocab: &Vocabulary) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create '{}'", self.dir.display()))?;
        let path = self.path();
        std::fs::write(&path, serde_json::to_string(vocab)?)
            .with_context(|| format!("Cannot write vocabulary to '{}'", path.display()))?;
        tracing::info!("Vocabulary ({} words) saved to '{}'", vocab.len(), path.display());
        Ok(())
    }

    pub fn load(&self) -> Result<Vocabulary> {
        load_from(&self.path())
    }
}

fn load_from(path: &Path) -> Result<Vocabulary> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read vocabulary from '{}'", path.display()))?;
    let vocab: Vocabulary = serde_json::from_str(&json)
        .with_context(|| format!("Malformed vocabulary file '{}'", path.display()))?;
    Ok(vocab.reindex())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_keeps_ids() {
        let dir   = tempfile::tempdir().unwrap();
        let store = VocabStore::new(dir.path());
        let vocab = Vocabulary::build(&["b a a", "c"], 10);

        store.save(&vocab).unwrap();
        let back = store.load().unwrap();

        assert_eq!(back.id("a"), 1);
        assert_eq!(back.id("b"), 2);
        assert_eq!(back.id("zzz"), 0);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(VocabStore::new(dir.path()).load().is_err());
    }
}
