// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates all the other layers to accomplish
// one goal per CLI command.
//
// Rules for this layer:
//   - No ML math or model code here
//   - No UI or printing here (that's Layer 1)
//   - No direct file parsing (that's Layer 4 and 6)
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

/// Backend used by the binary: Wgpu with autodiff for training,
/// its inner backend for inference.
pub type TrainBackend = burn::backend::Autodiff<burn::backend::Wgpu>;

// The training + submission workflow
pub mod train_use_case;

// Scoring a new file with a saved checkpoint
pub mod predict_use_case;

// Writing an oversampled training file
pub mod rebalance_use_case;
