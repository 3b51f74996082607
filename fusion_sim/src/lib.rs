// fusion_sim/src/lib.rs

//! Offline harness for the fusion filter: synthetic scenarios, log replay and
//! accuracy reporting.

use anyhow::Result;
use fusion_core::prelude::{FilterConfig, UnscentedKalmanFilter};
use tracing::info;

// This prelude is for convenience for other files WITHIN the fusion_sim crate.
pub mod prelude;

pub mod cli;
pub mod config;
pub mod metrics;
pub mod replay;
pub mod runner;
pub mod scenario;

use crate::config::ScenarioConfig;
use crate::runner::RunReport;
use crate::scenario::ScenarioEvent;

/// Generates the scenario's samples and runs a fresh filter over them.
pub fn simulate(config: &ScenarioConfig) -> Result<RunReport> {
    let events = scenario::generate(config)?;
    info!(samples = events.len(), seed = config.simulation.seed, "scenario generated");
    Ok(run_events(config.filter, &events))
}

/// Runs a fresh filter built from `filter` over recorded samples.
pub fn run_events(filter: FilterConfig, events: &[ScenarioEvent]) -> RunReport {
    let mut estimator = UnscentedKalmanFilter::new(filter);
    runner::run(&mut estimator, events)
}
