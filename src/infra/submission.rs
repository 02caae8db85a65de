// ============================================================
// Layer 6 — Submission Writer
// ============================================================
// Writes one probability per question pair:
//
//   test_id,is_duplicate
//   0,0.0412
//   1,0.7719
//
// Rows keep the order of the input file. The same writer is used
// for in-sample predictions on the training set (keyed by `id`)
// which feed later model stacking.
//
// `write_pairs` writes labelled question pairs back out in the
// training layout (id,question1,question2,is_duplicate) so a
// rebalanced file can be fed straight into `train`.

use anyhow::{ensure, Context, Result};
use serde::Serialize;
use std::{io::Write, path::Path};

use crate::domain::question_pair::QuestionPair;

#[derive(Debug, Serialize)]
struct PredictionRow {
    test_id:      u64,
    is_duplicate: f64,
}

pub fn write_predictions(path: &Path, ids: &[u64], probabilities: &[f64]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create '{}'", parent.display()))?;
    }
    let file = std::fs::File::create(path)
        .with_context(|| format!("Cannot create '{}'", path.display()))?;
    write_to(file, ids, probabilities)?;

    let mean = probabilities.iter().sum::<f64>() / probabilities.len().max(1) as f64;
    tracing::info!(
        "Wrote {} predictions to '{}' (mean {:.4})",
        probabilities.len(),
        path.display(),
        mean,
    );
    Ok(())
}

#[derive(Debug, Serialize)]
struct PairRow<'a> {
    id:           u64,
    question1:    &'a str,
    question2:    &'a str,
    is_duplicate: Option<u8>,
}

pub fn write_pairs(path: &Path, pairs: &[QuestionPair]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Cannot create '{}'", path.display()))?;
    for pair in pairs {
        writer.serialize(PairRow {
            id:           pair.id,
            question1:    &pair.question1,
            question2:    &pair.question2,
            is_duplicate: pair.is_duplicate.map(u8::from),
        })?;
    }
    writer.flush()?;
    tracing::info!("Wrote {} pairs to '{}'", pairs.len(), path.display());
    Ok(())
}

fn write_to<W: Write>(out: W, ids: &[u64], probabilities: &[f64]) -> Result<()> {
    ensure!(
        ids.len() == probabilities.len(),
        "{} ids but {} predictions",
        ids.len(),
        probabilities.len()
    );
    let mut writer = csv::Writer::from_writer(out);
    for (&test_id, &is_duplicate) in ids.iter().zip(probabilities) {
        writer.serialize(PredictionRow { test_id, is_duplicate })?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_and_order() {
        let mut buf = Vec::new();
        write_to(&mut buf, &[10, 3], &[0.25, 0.5]).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "test_id,is_duplicate\n10,0.25\n3,0.5\n");
    }

    #[test]
    fn test_length_mismatch() {
        assert!(write_to(Vec::new(), &[1, 2], &[0.1]).is_err());
    }

    #[test]
    fn test_pairs_reload_with_loader() {
        use crate::data::loader::CsvPairLoader;
        use crate::domain::traits::PairSource;

        let dir   = tempfile::tempdir().unwrap();
        let path  = dir.path().join("pairs.csv");
        let pairs = vec![
            QuestionPair::new(4, "is it, really?", "na", Some(true)),
            QuestionPair::new(9, "a", "b", Some(false)),
        ];
        write_pairs(&path, &pairs).unwrap();
        assert_eq!(CsvPairLoader::new(&path).load_all().unwrap(), pairs);
    }

    #[test]
    fn test_creates_parent_directory() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("submission.csv");
        write_predictions(&path, &[0], &[0.9]).unwrap();
        assert!(path.exists());
    }
}
