// fusion_core/src/estimation/mod.rs

use crate::error::FilterError;
use crate::messages::{MeasurementSample, SensorKind};
use crate::state::FilterState;

/// What a single call to the estimator did with a sample.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    /// The first sample seeded the state; no prediction or update ran.
    Initialized { sensor: SensorKind },
    /// Prediction and correction both ran. `nis` is the normalized innovation
    /// squared of the correction.
    Corrected { sensor: SensorKind, nis: f64 },
    /// Prediction ran, the correction did not. The state holds the
    /// prediction-only estimate for this cycle.
    PredictedOnly { sensor: SensorKind, reason: SkipReason },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// Updates for this sensor are switched off in the configuration.
    SensorDisabled,
    /// A numeric guard rejected the correction.
    Rejected(FilterError),
}

impl UpdateOutcome {
    pub fn sensor(&self) -> SensorKind {
        match self {
            UpdateOutcome::Initialized { sensor }
            | UpdateOutcome::Corrected { sensor, .. }
            | UpdateOutcome::PredictedOnly { sensor, .. } => *sensor,
        }
    }

    pub fn nis(&self) -> Option<f64> {
        match self {
            UpdateOutcome::Corrected { nis, .. } => Some(*nis),
            _ => None,
        }
    }
}

/// The contract for any algorithm that performs the "State Estimator" role.
/// Its sole responsibility is to estimate the state of a single tracked object.
pub trait StateEstimator: Send + Sync {
    /// The single entry point for all sensor data.
    fn process(&mut self, sample: &MeasurementSample) -> Result<UpdateOutcome, FilterError>;

    /// Returns a reference to the current best estimate of the state.
    fn get_state(&self) -> Result<&FilterState, FilterError>;

    /// Drops the current estimate. The next sample initializes again.
    fn reset(&mut self);
}

pub mod filters;
pub mod sigma_points;
