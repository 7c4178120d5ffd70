// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// The entry point for all user interaction. `clap` parses the
// command line; all work is delegated to Layer 2 (application)
// or, for `serve`, to Layer 7 (api).
//
// Three commands are supported:
//   1. `train`   — fit the pipeline on the CSV dataset
//   2. `serve`   — load the artifact and serve HTTP predictions
//   3. `predict` — score one JSON record without a server
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use std::{io::Read, net::SocketAddr, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::Parser;
use commands::{Commands, PredictArgs, ServeArgs, TrainArgs};

use crate::application::predict_use_case::PredictorService;
use crate::infra::artifact::ArtifactStore;

#[derive(Parser, Debug)]
#[command(
    name = "sleep-quality",
    version,
    about = "Train a sleep quality regressor on lifestyle data, then serve predictions."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch. The CLI layer only
    /// routes and prints; it never computes.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)   => run_train(args),
            Commands::Serve(args)   => run_serve(args),
            Commands::Predict(args) => run_predict(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting training on dataset: {}", args.dataset);
    let summary = TrainUseCase::new(args.into()).execute()?;

    match &summary.report {
        Some(r) => println!(
            "Model trained on {} rows. Hold-out ({} rows): R² = {:.4}, MAE = {:.4}, RMSE = {:.4}",
            summary.train_rows, summary.test_rows, r.r2, r.mae, r.rmse
        ),
        None => println!(
            "Model trained on {} rows. No hold-out rows, evaluation skipped.",
            summary.train_rows
        ),
    }
    println!("Artifact saved to {}", summary.artifact_path);
    Ok(())
}

fn run_serve(args: ServeArgs) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .with_context(|| format!("Invalid bind address '{}:{}'", args.host, args.port))?;

    // Degraded is not fatal: the server still starts and reports it
    let predictor = PredictorService::new(ArtifactStore::new(&args.artifact)).load();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Cannot start the async runtime")?;

    runtime.block_on(crate::api::serve(addr, Arc::new(predictor)))
}

fn run_predict(args: PredictArgs) -> Result<()> {
    let predictor = PredictorService::new(ArtifactStore::new(&args.artifact)).load();
    if !predictor.is_ready() {
        bail!(
            "Cannot load model '{}': {}",
            args.artifact.display(),
            predictor.reason().unwrap_or("unknown reason")
        );
    }

    let mut body = Vec::new();
    if args.input == "-" {
        std::io::stdin()
            .read_to_end(&mut body)
            .context("Cannot read record from stdin")?;
    } else {
        body = std::fs::read(&args.input)
            .with_context(|| format!("Cannot read record from '{}'", args.input))?;
    }

    let prediction = predictor.predict_json(&body)?;
    println!("{}", serde_json::json!({ "prediction": prediction }));
    Ok(())
}
