// fusion_core/src/models/measurement/mod.rs

use crate::error::FilterError;
use crate::types::StateVector;
use nalgebra::{SMatrix, SVector};
use std::fmt::Debug;

// --- MEASUREMENT MODEL TRAIT ---
// Represents the mathematical model of a sensor. `z = h(x) + v`
pub trait Measurement<const Z: usize>: Debug + Send + Sync {
    /// Returns the measurement noise covariance matrix `R`.
    fn get_r(&self) -> &SMatrix<f64, Z, Z>;

    /// Predicts the ideal measurement `z_pred = h(x)` for one state.
    ///
    /// Returns an error instead of a non-finite vector when `h` is undefined at
    /// `x`.
    fn predict_measurement(&self, x: &StateVector) -> Result<SVector<f64, Z>, FilterError>;

    /// Indices of `z` that hold angles and must be wrapped whenever two
    /// measurements are subtracted or averaged.
    fn angle_components(&self) -> &'static [usize] {
        &[]
    }

    /// Checks an actual measurement before it is fused.
    fn validate(&self, _z: &SVector<f64, Z>) -> Result<(), FilterError> {
        Ok(())
    }
}

pub mod lidar;
pub mod radar;
