//! earthshot CLI.
//!
//! Thin wrapper over the earthshot library: argument parsing, environment
//! credentials, logging setup, and the publish loop.

mod commands;
mod error;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "earthshot")]
#[command(version = earthshot::VERSION)]
#[command(about = "Acquire and composite random satellite scenes", long_about = None)]
struct Cli {
    /// Directory that published images and captions are written to
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,

    /// Directory for per-cycle scratch downloads (archives, extracted bands)
    #[arg(long)]
    work_dir: Option<PathBuf>,

    /// Catalog OpenSearch endpoint
    #[arg(long)]
    endpoint: Option<String>,

    /// Cloud-cover ceiling in percent
    #[arg(long)]
    cloud_cover: Option<f64>,

    /// Probability of a NIR-R-G false-colour composite
    #[arg(long)]
    false_colour_probability: Option<f64>,

    /// Preview accept threshold in [0, 1]
    #[arg(long)]
    preview_threshold: Option<f64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Acquire and publish a single scene, then exit
    Once {
        /// Give up after this many failed candidates
        #[arg(long, default_value = "50")]
        max_attempts: u32,
    },
    /// Acquire and publish scenes continuously
    Run {
        /// Minimum seconds between published scenes
        #[arg(long, default_value = "3600")]
        interval_secs: u64,

        /// How many recent regions to remember for duplicate avoidance
        #[arg(long, default_value = "10")]
        history_window: usize,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let _guard = match earthshot::logging::init_logging(
        earthshot::logging::default_log_dir(),
        earthshot::logging::default_log_file(),
    ) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("failed to initialize logging: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = commands::dispatch(cli).await {
        tracing::error!(error = %e, "earthshot exited with error");
        eprintln!("error: {e}");
        process::exit(1);
    }
}
