// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All Burn model code lives here. The rest of the pipeline
// only talks to it through the domain `Scorer` trait.
//
// What's in this layer:
//
//   model.rs       — Siamese LSTM
//                    • two Embedding → LSTM towers
//                    • concat of final hidden states
//                    • Dropout → Dense(ReLU) → Dropout → Dense(1)
//                    • sigmoid probability, weighted BCE loss
//
//   trainer.rs     — The training loop
//                    Forward pass, loss, backward pass, Adam
//                    step, validation, early stopping, best
//                    checkpoint
//
//   lstm_scorer.rs — Scorer implementation
//                    fit / predict over encoded sequences,
//                    rebuild from a checkpoint for `predict`
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)
//            Hochreiter & Schmidhuber (1997) Long Short-Term Memory

/// Siamese LSTM architecture
pub mod model;

/// Training loop with validation, early stopping and checkpointing
pub mod trainer;

/// Scorer trait implementation backed by the model
pub mod lstm_scorer;
