// fusion_core/src/models/measurement/radar.rs

use crate::config::RadarNoise;
use crate::error::FilterError;
use crate::models::measurement::Measurement;
use crate::types::{StateVector, PX, PY, V, YAW};
use nalgebra::{Matrix3, Vector3};

/// Ranges below this many metres leave bearing and range rate undefined.
pub const MIN_RANGE: f64 = 1e-4;

pub const RANGE: usize = 0;
pub const BEARING: usize = 1;
pub const RANGE_RATE: usize = 2;

/// Radar observes the target in polar form: `z = [range, bearing, range_rate]`.
#[derive(Debug, Clone, PartialEq)]
pub struct RadarModel {
    /// The R matrix for this sensor
    pub noise_covariance: Matrix3<f64>,
}

impl RadarModel {
    pub fn new(noise: &RadarNoise) -> Self {
        Self {
            noise_covariance: Matrix3::from_diagonal(&Vector3::new(
                noise.std_range.powi(2),
                noise.std_bearing.powi(2),
                noise.std_range_rate.powi(2),
            )),
        }
    }
}

impl Measurement<3> for RadarModel {
    fn get_r(&self) -> &Matrix3<f64> {
        &self.noise_covariance
    }

    fn predict_measurement(&self, x: &StateVector) -> Result<Vector3<f64>, FilterError> {
        let p_x = x[PX];
        let p_y = x[PY];
        let v = x[V];
        let (sin_yaw, cos_yaw) = x[YAW].sin_cos();

        let range = p_x.hypot(p_y);
        if range.is_nan() || range < MIN_RANGE {
            return Err(FilterError::DegenerateMeasurement { range });
        }

        let bearing = p_y.atan2(p_x);
        let range_rate = (p_x * v * cos_yaw + p_y * v * sin_yaw) / range;

        Ok(Vector3::new(range, bearing, range_rate))
    }

    fn angle_components(&self) -> &'static [usize] {
        &[BEARING]
    }

    fn validate(&self, z: &Vector3<f64>) -> Result<(), FilterError> {
        let range = z[RANGE];
        if !z.iter().all(|v| v.is_finite()) || range < MIN_RANGE {
            return Err(FilterError::DegenerateMeasurement { range });
        }
        Ok(())
    }
}
