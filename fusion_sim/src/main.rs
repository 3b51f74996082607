// fusion_sim/src/main.rs

use anyhow::{Context, Result};
use clap::Parser;
use fusion_sim::cli::{Cli, Command, OutputFormat};
use fusion_sim::config::ScenarioConfig;
use fusion_sim::runner::RunReport;
use fusion_sim::{replay, run_events, simulate};
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // --- 1. Logging: RUST_LOG wins over --log-level ---
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .with_context(|| format!("invalid log filter `{}`", cli.log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // --- 2. Dispatch ---
    match cli.command {
        Command::Simulate {
            scenario,
            seed,
            output,
        } => {
            let mut config = load_scenario(scenario.as_deref())?;
            if let Some(seed) = seed {
                config.simulation.seed = seed;
            }
            let report = simulate(&config)?;
            print_report(&report, output)
        }
        Command::Replay {
            log,
            scenario,
            output,
        } => {
            let config = load_scenario(scenario.as_deref())?;
            let events = replay::load(&log)?;
            info!(samples = events.len(), log = %log.display(), "log loaded");
            let report = run_events(config.filter, &events);
            print_report(&report, output)
        }
        Command::DefaultScenario => {
            let toml = toml::to_string_pretty(&ScenarioConfig::default())
                .context("failed to serialize default scenario")?;
            print!("{toml}");
            Ok(())
        }
    }
}

fn load_scenario(path: Option<&Path>) -> Result<ScenarioConfig> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "loading scenario");
            ScenarioConfig::load(path)
        }
        None => Ok(ScenarioConfig::default()),
    }
}

fn print_report(report: &RunReport, output: OutputFormat) -> Result<()> {
    match output {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(report).context("failed to serialize report")?;
            println!("{json}");
        }
        OutputFormat::Summary => {
            println!(
                "samples: {}  corrected: {}  disabled: {}  rejected: {}  out-of-order: {}",
                report.samples,
                report.corrected,
                report.sensor_disabled,
                report.rejected,
                report.out_of_order
            );
            match &report.rmse {
                Some(rmse) => println!(
                    "rmse     px {:.4}  py {:.4}  vx {:.4}  vy {:.4}",
                    rmse.px, rmse.py, rmse.vx, rmse.vy
                ),
                None => println!("rmse     n/a (no ground truth)"),
            }
            for (name, nis) in [("lidar", &report.nis_lidar), ("radar", &report.nis_radar)] {
                println!(
                    "nis {name}  {} samples, {:.1}% above 95% bound",
                    nis.samples,
                    nis.ratio_above_95 * 100.0
                );
            }
            if let Some(fault) = &report.fault {
                println!("stopped early: {fault}");
            }
        }
    }
    Ok(())
}
