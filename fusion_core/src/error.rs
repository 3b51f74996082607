// fusion_core/src/error.rs

use crate::messages::SensorKind;
use thiserror::Error;

/// Everything that can go wrong while processing a measurement.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    /// Radar range too close to zero for bearing and range rate to be defined.
    #[error("degenerate radar measurement: range {range} is too close to zero")]
    DegenerateMeasurement { range: f64 },

    /// The augmented covariance has no Cholesky factor. The filter state can
    /// no longer be trusted and needs an external reset.
    #[error("augmented covariance is not positive semi-definite")]
    NonPositiveSemiDefiniteCovariance,

    #[error("innovation covariance is singular")]
    SingularInnovationCovariance,

    #[error("filter state was read before the first measurement was processed")]
    UninitializedStateAccess,

    #[error("timestamp {current_us} us precedes last processed timestamp {last_us} us")]
    TimestampRegression { last_us: i64, current_us: i64 },

    #[error("{sensor} measurement expects {expected} values, got {actual}")]
    MeasurementDimension {
        sensor: SensorKind,
        expected: usize,
        actual: usize,
    },
}

impl FilterError {
    /// Fatal errors leave the filter faulted until it is reset.
    pub fn is_fatal(&self) -> bool {
        matches!(self, FilterError::NonPositiveSemiDefiniteCovariance)
    }
}
