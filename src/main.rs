mod api;
mod application;
mod cli;
mod data;
mod domain;
mod infra;
mod ml;

#[cfg(test)]
mod test_helpers;

use anyhow::Result;
use clap::Parser;
use cli::Cli;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sleep_quality=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    cli.run()
}
