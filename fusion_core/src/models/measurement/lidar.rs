// fusion_core/src/models/measurement/lidar.rs

use crate::config::LidarNoise;
use crate::error::FilterError;
use crate::models::measurement::Measurement;
use crate::types::{StateVector, PX, PY};
use nalgebra::{Matrix2, Vector2};

/// Lidar observes position directly: `z = [px, py]`.
#[derive(Debug, Clone, PartialEq)]
pub struct LidarModel {
    /// The R matrix for this sensor
    pub noise_covariance: Matrix2<f64>,
}

impl LidarModel {
    pub fn new(noise: &LidarNoise) -> Self {
        Self {
            noise_covariance: Matrix2::from_diagonal(&Vector2::new(
                noise.std_px.powi(2),
                noise.std_py.powi(2),
            )),
        }
    }
}

impl Measurement<2> for LidarModel {
    fn get_r(&self) -> &Matrix2<f64> {
        &self.noise_covariance
    }

    fn predict_measurement(&self, x: &StateVector) -> Result<Vector2<f64>, FilterError> {
        Ok(Vector2::new(x[PX], x[PY]))
    }
}
