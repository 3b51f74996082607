// fusion_core/src/types.rs

use nalgebra::{SMatrix, SVector};

// --- Filter Dimensions ---
/// Dimension of the CTRV state `[px, py, v, yaw, yaw_rate]`.
pub const N_X: usize = 5;
/// State dimension plus the two process-noise components.
pub const N_AUG: usize = 7;
/// Number of sigma points, `2 * N_AUG + 1`.
pub const N_SIGMA: usize = 2 * N_AUG + 1;
/// Sigma point spreading parameter.
pub const LAMBDA: f64 = 3.0 - N_AUG as f64;

// --- State Vector Indices ---
pub const PX: usize = 0;
pub const PY: usize = 1;
pub const V: usize = 2;
pub const YAW: usize = 3;
pub const YAW_RATE: usize = 4;
/// Longitudinal acceleration noise, augmented states only.
pub const NU_A: usize = 5;
/// Yaw acceleration noise, augmented states only.
pub const NU_YAWDD: usize = 6;

// --- Core Type Aliases ---
pub type StateVector = SVector<f64, N_X>;
pub type StateCovariance = SMatrix<f64, N_X, N_X>;
pub type AugStateVector = SVector<f64, N_AUG>;
pub type AugCovariance = SMatrix<f64, N_AUG, N_AUG>;
pub type AugSigmaPoints = SMatrix<f64, N_AUG, N_SIGMA>;
pub type StateSigmaPoints = SMatrix<f64, N_X, N_SIGMA>;

/// The sigma points produced by the most recent prediction, already pushed
/// through the motion model.
///
/// Only the prediction step can write into this buffer. Every update takes it
/// by reference, so a correction always works on the same points that formed
/// the predicted mean and covariance.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictedSigmaPoints {
    points: StateSigmaPoints,
}

/// An empty buffer holds zeros until the first prediction writes into it.
impl Default for PredictedSigmaPoints {
    fn default() -> Self {
        Self::zeros()
    }
}

impl PredictedSigmaPoints {
    pub(crate) fn zeros() -> Self {
        Self {
            points: StateSigmaPoints::zeros(),
        }
    }

    pub(crate) fn points_mut(&mut self) -> &mut StateSigmaPoints {
        &mut self.points
    }

    /// Read-only view of the 5x15 propagated sigma point matrix.
    pub fn points(&self) -> &StateSigmaPoints {
        &self.points
    }
}

/// State components holding angles, wrapped whenever states are differenced.
pub const STATE_ANGLE_COMPONENTS: [usize; 1] = [YAW];
