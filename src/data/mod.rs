// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between the raw CSV rows and tensor batches.
//
//   train.csv / test.csv
//       │
//       ▼
//   CsvPairLoader      → QuestionPair rows ("na" for missing text)
//       │
//       ▼
//   Normalizer         → ordered find/replace cleaning chain
//       │
//       ▼
//   Vocabulary         → token → id, built on train + test text
//       │
//       ▼
//   encoder            → fixed-length, left-padded id sequences
//       │
//       ▼
//   splitter           → seeded train / validation split
//       │
//       ▼
//   augmenter          → (a, b) and (b, a) for every labelled row
//       │
//       ▼
//   PairDataset        → implements Burn's Dataset trait
//       │
//       ▼
//   PairBatcher        → stacks samples into tensor batches
//
// rebalancer is a side path: it rewrites a training file with
// negatives oversampled to a target positive share.
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Loads question pairs from CSV
pub mod loader;

/// Ordered text-cleaning rules
pub mod normalizer;

/// Frequency-ranked, capped vocabulary
pub mod vocabulary;

/// Fixed-length sequence encoding
pub mod encoder;

/// Swapped-order training augmentation
pub mod augmenter;

/// Seeded train/validation split
pub mod splitter;

/// Negative oversampling to a target positive share
pub mod rebalancer;

/// Implements Burn's Dataset trait for encoded pairs
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;
