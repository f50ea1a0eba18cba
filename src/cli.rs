use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Demeter stochastic ecosystem carbon forecaster.
#[derive(Parser)]
#[command(
    name = "demeter",
    version,
    about = "Ensemble ecosystem carbon forecaster with particle-filter data assimilation"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Run an open-loop ensemble forecast (no assimilation).
    Forecast(ForecastArgs),
    /// Run the particle-filter assimilation loop.
    Assimilate(AssimilateArgs),
}

/// Arguments for the `forecast` subcommand.
#[derive(clap::Args)]
pub struct ForecastArgs {
    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "demeter.toml")]
    pub config: PathBuf,

    /// Override output Parquet path from config.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Override global RNG seed from config.
    #[arg(short, long)]
    pub seed: Option<u64>,
}

/// Arguments for the `assimilate` subcommand.
#[derive(clap::Args)]
pub struct AssimilateArgs {
    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "demeter.toml")]
    pub config: PathBuf,

    /// Override output Parquet path from config.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Override diagnostics summary JSON path from config.
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Override global RNG seed from config.
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Disable resample-move (run the non-resampling filter: weights
    /// accumulate across the whole horizon).
    #[arg(long)]
    pub no_resample: bool,
}
