// ============================================================
// Layer 4 — Question Pair Loader
// ============================================================
// Reads question pairs from CSV using the csv crate + serde.
//
// Two layouts are accepted:
//   training:   id,qid1,qid2,question1,question2,is_duplicate
//   evaluation: test_id,question1,question2
//
// Columns we do not need (qid1, qid2) are ignored. An empty
// question cell becomes the placeholder "na" rather than failing
// the row; the normalizer and vocabulary then treat it like any
// other word.
//
// Reference: csv crate documentation (Reader::deserialize)
//            Rust Book §9 (Error Handling)

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::{io::Read, path::PathBuf};

use crate::domain::question_pair::{QuestionPair, MISSING_TEXT};
use crate::domain::traits::PairSource;

/// One raw CSV row before placeholders and label parsing.
#[derive(Debug, Deserialize)]
struct PairRecord {
    #[serde(alias = "test_id")]
    id: u64,

    question1: Option<String>,

    question2: Option<String>,

    #[serde(default)]
    is_duplicate: Option<u8>,
}

impl PairRecord {
    fn into_pair(self, line: usize) -> Result<QuestionPair> {
        let label = match self.is_duplicate {
            None    => None,
            Some(0) => Some(false),
            Some(1) => Some(true),
            Some(v) => bail!("row {line}: is_duplicate must be 0 or 1, got {v}"),
        };
        Ok(QuestionPair::with_placeholders(self.id, self.question1, self.question2, label))
    }
}

/// Loads every row of a question-pair CSV file.
pub struct CsvPairLoader {
    path: PathBuf,
}

impl CsvPairLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PairSource for CsvPairLoader {
    fn load_all(&self) -> Result<Vec<QuestionPair>> {
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.path)
            .with_context(|| format!("Cannot open '{}'", self.path.display()))?;

        let pairs = read_pairs(reader)
            .with_context(|| format!("Cannot parse '{}'", self.path.display()))?;

        let missing = pairs
            .iter()
            .filter(|p| p.question1 == MISSING_TEXT || p.question2 == MISSING_TEXT)
            .count();
        if missing > 0 {
            tracing::debug!("{} rows had a missing question (filled with placeholder)", missing);
        }

        tracing::info!("Loaded {} pairs from '{}'", pairs.len(), self.path.display());
        Ok(pairs)
    }
}

/// Deserialize all rows from any CSV reader.
fn read_pairs<R: Read>(mut reader: csv::Reader<R>) -> Result<Vec<QuestionPair>> {
    let mut pairs = Vec::new();
    for (i, record) in reader.deserialize::<PairRecord>().enumerate() {
        // +2: one for the header, one for 1-based line numbers
        let line   = i + 2;
        let record = record.with_context(|| format!("Malformed row at line {line}"))?;
        pairs.push(record.into_pair(line)?);
    }
    Ok(pairs)
}
