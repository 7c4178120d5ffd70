// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the three subcommands, `train`, `serve` and `predict`,
// and all their configurable flags.
//
// `serve` also reads its options from the environment so it can
// be configured in a container without a wrapper script:
//
//   SLEEP_QUALITY_ARTIFACT   path to the artifact
//   SLEEP_QUALITY_HOST       bind address
//   SLEEP_QUALITY_PORT       bind port
//
// Reference: Rust Book §12 (Building a CLI Program)

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::application::train_use_case::TrainConfig;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the sleep quality model on the CSV dataset
    Train(TrainArgs),

    /// Serve predictions over HTTP from a trained artifact
    Serve(ServeArgs),

    /// Score one JSON record from a file (or '-' for stdin)
    Predict(PredictArgs),
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// CSV export of the sleep health and lifestyle dataset
    #[arg(long, default_value = "Sleep_health_and_lifestyle_dataset.csv")]
    pub dataset: String,

    /// Where to write the fitted pipeline
    #[arg(long, default_value = "sleep_model.json")]
    pub artifact: String,

    /// CSV file that gets one row of hold-out metrics per run
    #[arg(long, default_value = "metrics.csv")]
    pub metrics_csv: String,

    /// Skip writing the metrics CSV
    #[arg(long)]
    pub no_metrics: bool,

    /// Fraction of rows held out for evaluation
    #[arg(long, default_value_t = 0.2)]
    pub test_fraction: f64,

    /// Number of trees in the forest
    #[arg(long, default_value_t = 100)]
    pub n_trees: usize,

    /// Seed for the train/test shuffle and the forest
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Maximum tree depth (unlimited when omitted)
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Minimum training rows in each leaf
    #[arg(long, default_value_t = 1)]
    pub min_samples_leaf: usize,

    /// Used for every row when the dataset has no Body Temperature column
    #[arg(long, default_value_t = 98.6)]
    pub default_body_temperature: f64,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            dataset_path:             a.dataset,
            artifact_path:            a.artifact,
            metrics_csv:              (!a.no_metrics).then_some(a.metrics_csv),
            test_fraction:            a.test_fraction,
            n_trees:                  a.n_trees,
            seed:                     a.seed,
            max_depth:                a.max_depth,
            min_samples_leaf:         a.min_samples_leaf,
            default_body_temperature: a.default_body_temperature,
        }
    }
}

/// All arguments for the `serve` command
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Trained artifact to load at startup
    #[arg(long, env = "SLEEP_QUALITY_ARTIFACT", default_value = "sleep_model.json")]
    pub artifact: PathBuf,

    /// Address to bind
    #[arg(long, env = "SLEEP_QUALITY_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to bind
    #[arg(long, env = "SLEEP_QUALITY_PORT", default_value_t = 5001)]
    pub port: u16,
}

/// All arguments for the `predict` command
#[derive(Args, Debug)]
pub struct PredictArgs {
    /// JSON file holding one record, or '-' to read stdin
    #[arg(long, default_value = "-")]
    pub input: String,

    /// Trained artifact to score with
    #[arg(long, default_value = "sleep_model.json")]
    pub artifact: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    #[test]
    fn test_train_defaults_match_config_defaults() {
        let cli = Cli::try_parse_from(["sleep-quality", "train"]).unwrap();
        let Commands::Train(args) = cli.command else {
            panic!("expected train");
        };
        assert_eq!(TrainConfig::from(args), TrainConfig::default());
    }

    #[test]
    fn test_no_metrics_flag_disables_log() {
        let cli = Cli::try_parse_from(["sleep-quality", "train", "--no-metrics", "--n-trees", "7"])
            .unwrap();
        let Commands::Train(args) = cli.command else {
            panic!("expected train");
        };
        let cfg = TrainConfig::from(args);
        assert_eq!(cfg.metrics_csv, None);
        assert_eq!(cfg.n_trees, 7);
    }

    #[test]
    fn test_serve_flags() {
        let cli = Cli::try_parse_from(["sleep-quality", "serve", "--port", "8080", "--host", "127.0.0.1"])
            .unwrap();
        let Commands::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.port, 8080);
        assert_eq!(args.host, "127.0.0.1");
    }
}
