// fusion_sim/src/runner.rs

//! Drives an estimator over a sequence of samples and collects the results.

use fusion_core::prelude::{
    FilterError, FilterState, SensorKind, SkipReason, StateEstimator, UpdateOutcome,
};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::metrics::{NisSummary, NisTracker, Rmse, RmseAccumulator};
use crate::scenario::{GroundTruth, ScenarioEvent};

/// The estimate after one sample was processed.
#[derive(Debug, Clone, Serialize)]
pub struct EstimateRecord {
    pub timestamp_us: i64,
    pub sensor: SensorKind,
    pub corrected: bool,
    pub px: f64,
    pub py: f64,
    pub v: f64,
    pub yaw: f64,
    pub yaw_rate: f64,
    pub nis: Option<f64>,
    pub truth: Option<GroundTruth>,
}

impl EstimateRecord {
    fn new(state: &FilterState, outcome: &UpdateOutcome, truth: Option<GroundTruth>) -> Self {
        let position = state.position();
        Self {
            timestamp_us: state.last_update_timestamp_us,
            sensor: outcome.sensor(),
            corrected: matches!(outcome, UpdateOutcome::Corrected { .. }),
            px: position.x,
            py: position.y,
            v: state.speed(),
            yaw: state.yaw(),
            yaw_rate: state.yaw_rate(),
            nis: outcome.nis(),
            truth,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub samples: usize,
    pub corrected: usize,
    /// Samples whose correction was skipped because the sensor is disabled.
    pub sensor_disabled: usize,
    /// Samples whose correction was rejected by a numeric guard.
    pub rejected: usize,
    /// Samples older than the current estimate, dropped unprocessed.
    pub out_of_order: usize,
    pub rmse: Option<Rmse>,
    pub nis_lidar: NisSummary,
    pub nis_radar: NisSummary,
    /// Set when the run stopped on an unrecoverable filter error.
    pub fault: Option<String>,
    pub final_state: Option<FilterState>,
    pub estimates: Vec<EstimateRecord>,
}

/// Feeds `events` in order. Stops early on a fatal filter error.
pub fn run(estimator: &mut dyn StateEstimator, events: &[ScenarioEvent]) -> RunReport {
    let mut rmse = RmseAccumulator::default();
    let mut nis = NisTracker::default();
    let mut estimates = Vec::with_capacity(events.len());
    let (mut corrected, mut sensor_disabled, mut rejected, mut out_of_order) = (0, 0, 0, 0);
    let mut fault = None;

    for event in events {
        let outcome = match estimator.process(&event.sample) {
            Ok(outcome) => outcome,
            Err(err @ FilterError::TimestampRegression { .. }) => {
                warn!(%err, "dropping out-of-order sample");
                out_of_order += 1;
                continue;
            }
            Err(err) => {
                error!(
                    %err,
                    timestamp_us = event.sample.timestamp_us,
                    "filter failed, stopping run"
                );
                fault = Some(err.to_string());
                break;
            }
        };

        match &outcome {
            UpdateOutcome::Initialized { .. } => {}
            UpdateOutcome::Corrected { sensor, nis: value } => {
                corrected += 1;
                nis.add(*sensor, *value);
            }
            UpdateOutcome::PredictedOnly { reason, .. } => match reason {
                SkipReason::SensorDisabled => sensor_disabled += 1,
                SkipReason::Rejected(_) => rejected += 1,
            },
        }

        // The outcome was Ok, so the estimator is initialized.
        if let Ok(state) = estimator.get_state() {
            if let Some(truth) = &event.truth {
                rmse.add(state, truth);
            }
            estimates.push(EstimateRecord::new(state, &outcome, event.truth));
        }
    }

    let report = RunReport {
        samples: events.len(),
        corrected,
        sensor_disabled,
        rejected,
        out_of_order,
        rmse: rmse.rmse(),
        nis_lidar: nis.summary(SensorKind::Lidar),
        nis_radar: nis.summary(SensorKind::Radar),
        fault,
        final_state: estimator.get_state().ok().cloned(),
        estimates,
    };

    info!(
        samples = report.samples,
        corrected = report.corrected,
        rejected = report.rejected,
        "run complete"
    );
    report
}
