// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Pure Rust types and traits describing the problem:
// question pairs, encoded sequences, class-balance statistics,
// and the Scorer abstraction.
//
// Rules for this layer:
//   - NO Burn framework types
//   - NO file I/O
//   - Only plain structs, enums, traits and arithmetic
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

/// A question pair row, labelled or not
pub mod question_pair;

/// Fixed-length encoded sequences and labelled training sets
pub mod sequence;

/// Class weights and posterior re-weighting
pub mod class_balance;

/// Configuration errors raised before training
pub mod error;

/// PairSource and Scorer abstractions
pub mod traits;
