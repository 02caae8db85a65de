// ============================================================
// Layer 6 — Pretrained Word Vectors
// ============================================================
// Reads word vectors in the plain-text word2vec / GloVe format:
//
//   [optional header]  3000000 300
//   word v1 v2 ... vD
//   word v1 v2 ... vD
//
// or, for files ending in `.bin`, the binary word2vec format:
//
//   "3000000 300\n"
//   word<space><D little-endian f32>[\n]   (repeated count times)
//
// and lays them out as an embedding table indexed by vocabulary
// id: row 0 (padding) and every word without a vector stay zero.
//
// Only words present in the vocabulary are kept, so memory is
// bounded by the vocabulary size rather than the vector file.

use anyhow::{bail, Context, Result};
use std::{
    fs::File,
    io::{BufRead, BufReader, Read},
    path::Path,
};

use crate::data::vocabulary::Vocabulary;

/// Row-major `[vocab.table_size(), dim]` table plus a hit count.
#[derive(Debug, Clone)]
pub struct EmbeddingTable {
    pub dim:     usize,
    pub weights: Vec<f32>,
    pub found:   usize,
}

pub fn load_embedding_table(path: &Path, vocab: &Vocabulary, dim: usize) -> Result<EmbeddingTable> {
    let file = File::open(path)
        .with_context(|| format!("Cannot open word vectors '{}'", path.display()))?;
    let reader = BufReader::new(file);
    let binary = path.extension().and_then(|e| e.to_str()) == Some("bin");
    let table  = if binary {
        read_binary_table(reader, vocab, dim)
    } else {
        read_table(reader, vocab, dim)
    }
    .with_context(|| format!("Cannot read word vectors '{}'", path.display()))?;

    tracing::info!(
        "Word vectors: {}/{} vocabulary words found ({} dims)",
        table.found,
        vocab.len(),
        dim,
    );
    Ok(table)
}

fn read_table<R: BufRead>(reader: R, vocab: &Vocabulary, dim: usize) -> Result<EmbeddingTable> {
    let mut weights = vec![0.0f32; vocab.table_size() * dim];
    let mut found   = 0usize;

    for (i, line) in reader.lines().enumerate() {
        let line  = line?;
        let mut parts = line.split_whitespace();
        let Some(word) = parts.next() else { continue };

        let rest: Vec<&str> = parts.collect();
        // word2vec header: "<count> <dim>"
        if i == 0 && rest.len() == 1 {
            continue;
        }

        let id = vocab.id(word);
        if id == 0 {
            continue;
        }
        if rest.len() != dim {
            bail!("line {}: '{}' has {} values, expected {}", i + 1, word, rest.len(), dim);
        }

        let row = &mut weights[id as usize * dim..(id as usize + 1) * dim];
        for (slot, value) in row.iter_mut().zip(rest) {
            *slot = value
                .parse()
                .with_context(|| format!("line {}: bad number '{}'", i + 1, value))?;
        }
        found += 1;
    }

    Ok(EmbeddingTable { dim, weights, found })
}

fn read_binary_table<R: BufRead>(mut reader: R, vocab: &Vocabulary, dim: usize) -> Result<EmbeddingTable> {
    let mut header = String::new();
    reader.read_line(&mut header)?;
    let (count, file_dim) = match header.split_whitespace().collect::<Vec<_>>()[..] {
        [count, file_dim] => (
            count.parse::<usize>().with_context(|| format!("bad header '{}'", header.trim()))?,
            file_dim.parse::<usize>().with_context(|| format!("bad header '{}'", header.trim()))?,
        ),
        _ => bail!("bad header '{}', expected '<count> <dim>'", header.trim()),
    };
    if file_dim != dim {
        bail!("vectors have {} dims, expected {}", file_dim, dim);
    }

    let mut weights = vec![0.0f32; vocab.table_size() * dim];
    let mut found   = 0usize;
    let mut word    = Vec::new();
    let mut vector  = vec![0u8; dim * 4];

    for n in 0..count {
        word.clear();
        reader.read_until(b' ', &mut word)?;
        if word.pop() != Some(b' ') {
            bail!("file ends after {} of {} words", n, count);
        }
        reader
            .read_exact(&mut vector)
            .with_context(|| format!("word {}: truncated vector", n + 1))?;

        // vectors may be followed by a newline before the next word
        let word = String::from_utf8_lossy(word.strip_prefix(b"\n").unwrap_or(&word));
        let id   = vocab.id(&word);
        if id == 0 {
            continue;
        }

        let row = &mut weights[id as usize * dim..(id as usize + 1) * dim];
        for (slot, bytes) in row.iter_mut().zip(vector.chunks_exact(4)) {
            *slot = f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        }
        found += 1;
    }

    Ok(EmbeddingTable { dim, weights, found })
}
