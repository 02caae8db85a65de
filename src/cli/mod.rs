// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All business logic is delegated to Layer 2 (application).
//
// Three commands are supported:
//   1. `train`     — trains the model, writes a submission
//   2. `predict`   — scores a new CSV with a saved checkpoint
//   3. `rebalance` — writes an oversampled training CSV
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, PredictArgs, RebalanceArgs, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "question-dedup",
    version,
    about = "Train a Siamese LSTM to detect duplicate question pairs, then score new pairs."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)     => run_train(args),
            Commands::Predict(args)   => run_predict(args),
            Commands::Rebalance(args) => run_rebalance(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting training on '{}'", args.train.display());
    let submission = args.submission.clone();

    let report = TrainUseCase::new(args.into()).execute()?;

    println!(
        "Training complete. {} training rows, {} validation rows, vocabulary {} words.",
        report.train_rows, report.valid_rows, report.vocab_size,
    );
    println!(
        "Submission written to {} (mean prediction {:.4}).",
        submission.display(),
        report.prediction_mean,
    );
    Ok(())
}

fn run_predict(args: PredictArgs) -> Result<()> {
    use crate::application::predict_use_case::PredictUseCase;

    let rows = PredictUseCase::new(&args.checkpoint_dir, &args.input, &args.output).execute()?;
    println!("Scored {} pairs → {}", rows, args.output.display());
    Ok(())
}

fn run_rebalance(args: RebalanceArgs) -> Result<()> {
    use crate::application::rebalance_use_case::RebalanceUseCase;

    let rows = RebalanceUseCase::new(&args.input, &args.output, args.ratio, args.seed).execute()?;
    println!("Wrote {} rows → {}", rows, args.output.display());
    Ok(())
}
