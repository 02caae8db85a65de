// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the three subcommands: `train`, `predict`, `rebalance`
// and all their configurable flags.
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for missing args
//   - type conversion (string → usize, f64, enums, etc.)
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::application::train_use_case::TrainConfig;
use crate::domain::class_balance::BalanceMode;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the Siamese LSTM and write a submission file
    Train(TrainArgs),

    /// Score a question-pair CSV with a trained checkpoint
    Predict(PredictArgs),

    /// Oversample negatives in a training CSV to a target positive share
    Rebalance(RebalanceArgs),
}

/// Class-imbalance correction, as a command-line value.
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum BalanceArg {
    /// Weight the loss per class while training
    ClassWeights,
    /// Train unweighted, re-weight predicted probabilities
    Reweight,
    /// No correction
    None,
}

impl From<BalanceArg> for BalanceMode {
    fn from(a: BalanceArg) -> Self {
        match a {
            BalanceArg::ClassWeights => BalanceMode::ClassWeights,
            BalanceArg::Reweight     => BalanceMode::Reweight,
            BalanceArg::None         => BalanceMode::None,
        }
    }
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Labelled pairs: id,qid1,qid2,question1,question2,is_duplicate
    #[arg(long, default_value = "data/train.csv")]
    pub train: PathBuf,

    /// Evaluation pairs: test_id,question1,question2
    #[arg(long, default_value = "data/test.csv")]
    pub test: PathBuf,

    /// Where to write test_id,is_duplicate
    #[arg(long, default_value = "submission.csv")]
    pub submission: PathBuf,

    /// Also write in-sample predictions for the training pairs here
    #[arg(long)]
    pub train_predictions: Option<PathBuf>,

    /// Directory for the best checkpoint, vocabulary and metrics
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: PathBuf,

    /// Pretrained word vectors: word2vec / GloVe text, or binary
    /// word2vec when the file ends in .bin; embedding tables start
    /// from them and stay frozen
    #[arg(long)]
    pub embeddings: Option<PathBuf>,

    /// Tokens per question; longer questions keep their last tokens
    #[arg(long, default_value_t = 40)]
    pub max_seq_len: usize,

    /// Most frequent words kept in the vocabulary
    #[arg(long, default_value_t = 200_000)]
    pub max_vocab_size: usize,

    /// Must match the vector size when --embeddings is given
    #[arg(long, default_value_t = 300)]
    pub embedding_dim: usize,

    #[arg(long, default_value_t = 225)]
    pub lstm_units: usize,

    #[arg(long, default_value_t = 125)]
    pub dense_units: usize,

    #[arg(long, default_value_t = 0.25)]
    pub dropout: f64,

    /// Upper bound; early stopping may end training sooner
    #[arg(long, default_value_t = 5)]
    pub epochs: usize,

    #[arg(long, default_value_t = 2048)]
    pub batch_size: usize,

    /// Rows per forward pass at prediction time
    #[arg(long, default_value_t = 8192)]
    pub predict_batch_size: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    /// Share of labelled pairs held out for validation
    #[arg(long, default_value_t = 0.1)]
    pub validation_fraction: f64,

    /// Epochs without validation improvement before stopping
    #[arg(long, default_value_t = 3)]
    pub patience: usize,

    /// Seed for the split and batch shuffling
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Positive rate expected in the evaluation data
    #[arg(long, default_value_t = 0.1746)]
    pub target_positive_rate: f64,

    /// Train on the labelled pairs only, without swapped copies
    #[arg(long)]
    pub no_augment: bool,

    #[arg(long, value_enum, default_value_t = BalanceArg::ClassWeights)]
    pub balance_mode: BalanceArg,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            train_path:             a.train,
            test_path:              a.test,
            submission_path:        a.submission,
            train_predictions_path: a.train_predictions,
            checkpoint_dir:         a.checkpoint_dir,
            embeddings_path:        a.embeddings,
            max_seq_len:            a.max_seq_len,
            max_vocab_size:         a.max_vocab_size,
            embedding_dim:          a.embedding_dim,
            lstm_units:             a.lstm_units,
            dense_units:            a.dense_units,
            dropout:                a.dropout,
            epochs:                 a.epochs,
            batch_size:             a.batch_size,
            predict_batch_size:     a.predict_batch_size,
            lr:                     a.lr,
            validation_fraction:    a.validation_fraction,
            patience:               a.patience,
            seed:                   a.seed,
            target_positive_rate:   a.target_positive_rate,
            augment:                !a.no_augment,
            balance_mode:           a.balance_mode.into(),
        }
    }
}

/// All arguments for the `predict` command
#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Pairs to score: test_id (or id),question1,question2
    #[arg(long)]
    pub input: PathBuf,

    #[arg(long, default_value = "predictions.csv")]
    pub output: PathBuf,

    /// Directory written by a previous `train`
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: PathBuf,
}

/// All arguments for the `rebalance` command
#[derive(Args, Debug)]
pub struct RebalanceArgs {
    #[arg(long)]
    pub input: PathBuf,

    #[arg(long)]
    pub output: PathBuf,

    /// Share of positives in the output
    #[arg(long, default_value_t = 0.165)]
    pub ratio: f64,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    #[test]
    fn test_train_defaults_match_config_defaults() {
        let cli = Cli::try_parse_from(["question-dedup", "train"]).unwrap();
        let Commands::Train(args) = cli.command else { panic!("expected train") };
        let cfg: TrainConfig = args.into();
        let default = TrainConfig::default();

        assert_eq!(cfg.max_seq_len, default.max_seq_len);
        assert_eq!(cfg.max_vocab_size, default.max_vocab_size);
        assert_eq!(cfg.batch_size, default.batch_size);
        assert_eq!(cfg.target_positive_rate, default.target_positive_rate);
        assert_eq!(cfg.balance_mode, default.balance_mode);
        assert!(cfg.augment);
    }

    #[test]
    fn test_balance_mode_flag() {
        let cli = Cli::try_parse_from(["question-dedup", "train", "--balance-mode", "reweight", "--no-augment"]).unwrap();
        let Commands::Train(args) = cli.command else { panic!("expected train") };
        let cfg: TrainConfig = args.into();
        assert_eq!(cfg.balance_mode, BalanceMode::Reweight);
        assert!(!cfg.augment);
    }

    #[test]
    fn test_predict_requires_input() {
        assert!(Cli::try_parse_from(["question-dedup", "predict"]).is_err());
    }
}
