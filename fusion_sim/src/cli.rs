// fusion_sim/src/cli.rs

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// fusion_sim: offline runs of the lidar/radar unscented Kalman filter.
///
/// This struct defines the command-line arguments accepted by the
/// `fusion_sim` binary.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log filter used when `RUST_LOG` is not set, e.g. `info` or `fusion_core=debug`.
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Generate a synthetic scenario and track it.
    Simulate {
        /// The path to the scenario TOML file. Built-in defaults when omitted.
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Override the scenario's random seed.
        #[arg(long)]
        seed: Option<u64>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Summary)]
        output: OutputFormat,
    },

    /// Track the samples of a recorded measurement log.
    Replay {
        /// The log file, one `L ...` or `R ...` record per line.
        log: PathBuf,

        /// Scenario TOML whose `[filter]` section configures the filter.
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Summary)]
        output: OutputFormat,
    },

    /// Print the built-in default scenario as TOML.
    DefaultScenario,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable summary.
    Summary,
    /// Full report, including every estimate, as JSON.
    Json,
}
