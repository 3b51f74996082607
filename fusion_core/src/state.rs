// fusion_core/src/state.rs

use crate::types::{StateCovariance, StateVector, PX, PY, V, YAW, YAW_RATE};
use nalgebra::Vector2;
use serde::Serialize;

/// The estimate the filter carries between cycles: mean `x`, covariance `P`
/// and the time they refer to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterState {
    /// The CTRV state vector `[px, py, v, yaw, yaw_rate]`.
    pub vector: StateVector,
    /// The covariance matrix `P`.
    pub covariance: StateCovariance,
    /// Timestamp of the last processed measurement, in microseconds.
    pub last_update_timestamp_us: i64,
}

impl FilterState {
    pub fn new(vector: StateVector, covariance: StateCovariance, timestamp_us: i64) -> Self {
        Self {
            vector,
            covariance,
            last_update_timestamp_us: timestamp_us,
        }
    }

    pub fn position(&self) -> Vector2<f64> {
        Vector2::new(self.vector[PX], self.vector[PY])
    }

    pub fn speed(&self) -> f64 {
        self.vector[V]
    }

    pub fn yaw(&self) -> f64 {
        self.vector[YAW]
    }

    pub fn yaw_rate(&self) -> f64 {
        self.vector[YAW_RATE]
    }

    /// Cartesian velocity `[vx, vy]` derived from speed and heading.
    pub fn velocity(&self) -> Vector2<f64> {
        let (sin_yaw, cos_yaw) = self.yaw().sin_cos();
        Vector2::new(self.speed() * cos_yaw, self.speed() * sin_yaw)
    }
}
