// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Files on disk that outlive a single run:
//
//   checkpoint.rs   — best model weights (full-precision mpk.gz) plus
//                     the TrainConfig needed to rebuild the model
//
//   vocab_store.rs  — the vocabulary, so predict uses the same
//                     token ids as training
//
//   embeddings.rs   — pretrained word vectors → embedding table
//
//   metrics.rs      — per-epoch loss / accuracy CSV
//
//   submission.rs   — id,probability output CSVs
//
// Reference: Rust Book §9 (Error Handling with anyhow)
//            Burn Book §5 (Checkpointing)

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Vocabulary persistence
pub mod vocab_store;

/// Pretrained word-vector loading
pub mod embeddings;

/// Training metrics CSV logger
pub mod metrics;

/// Prediction CSV writer
pub mod submission;
