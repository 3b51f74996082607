// fusion_core/src/estimation/filters/ukf.rs

use nalgebra::{SMatrix, SVector};
use tracing::{debug, error, warn};

// --- Core Library Imports ---
use crate::config::{FilterConfig, ProcessNoise};
use crate::error::FilterError;
use crate::estimation::sigma_points::{
    augment, generate_sigma_points, residual, weighted_mean, SigmaWeights,
};
use crate::estimation::{SkipReason, StateEstimator, UpdateOutcome};
use crate::messages::{MeasurementData, MeasurementSample, SensorKind};
use crate::models::dynamics::ctrv::CtrvModel;
use crate::models::dynamics::MotionModel;
use crate::models::measurement::lidar::LidarModel;
use crate::models::measurement::radar::RadarModel;
use crate::models::measurement::Measurement;
use crate::state::FilterState;
use crate::types::{
    AugStateVector, PredictedSigmaPoints, StateCovariance, StateVector, N_SIGMA, N_X,
    STATE_ANGLE_COMPONENTS, YAW,
};
use crate::utils::angles::normalize_angle;

const MICROS_PER_SECOND: f64 = 1_000_000.0;

// =========================================================================
// == Prediction and Update Steps ==
// =========================================================================

/// Advances `state` by `dt` seconds and leaves the propagated sigma points in
/// `sigma_out` for the update that follows.
///
/// Neither `state` nor `sigma_out` is touched when the augmented covariance
/// has no square root.
pub fn unscented_predict(
    state: &mut FilterState,
    sigma_out: &mut PredictedSigmaPoints,
    weights: &SigmaWeights,
    motion_model: &dyn MotionModel,
    process_noise: &ProcessNoise,
    dt: f64,
) -> Result<(), FilterError> {
    // --- 1. Augment and generate sigma points ---
    let (x_aug, p_aug) = augment(state, process_noise);
    let sigma_aug = generate_sigma_points(&x_aug, &p_aug)?;

    // --- 2. Propagate each point through the motion model ---
    let propagated = sigma_out.points_mut();
    for i in 0..N_SIGMA {
        let point: AugStateVector = sigma_aug.column(i).into_owned();
        propagated.set_column(i, &motion_model.propagate(&point, dt));
    }

    // --- 3. Recover the predicted mean and covariance ---
    let x_pred = weighted_mean(propagated, weights, &STATE_ANGLE_COMPONENTS);
    let mut p_pred = StateCovariance::zeros();
    for i in 0..N_SIGMA {
        let x_diff = residual(
            &propagated.column(i).into_owned(),
            &x_pred,
            &STATE_ANGLE_COMPONENTS,
        );
        p_pred += x_diff * x_diff.transpose() * weights[i];
    }

    state.vector = x_pred;
    state.covariance = symmetrize(&p_pred);
    Ok(())
}

/// The predicted sigma points mapped into measurement space, with their
/// weighted mean and innovation covariance `S` (noise `R` included).
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementPrediction<const Z: usize> {
    pub sigma_points: SMatrix<f64, Z, N_SIGMA>,
    pub mean: SVector<f64, Z>,
    pub innovation_covariance: SMatrix<f64, Z, Z>,
}

pub fn predict_measurement_moments<const Z: usize, M: Measurement<Z>>(
    model: &M,
    sigma: &PredictedSigmaPoints,
    weights: &SigmaWeights,
) -> Result<MeasurementPrediction<Z>, FilterError> {
    let angles = model.angle_components();

    let mut z_sig = SMatrix::<f64, Z, N_SIGMA>::zeros();
    for i in 0..N_SIGMA {
        let x_i: StateVector = sigma.points().column(i).into_owned();
        z_sig.set_column(i, &model.predict_measurement(&x_i)?);
    }

    let z_pred = weighted_mean(&z_sig, weights, angles);

    let mut s_cov = SMatrix::<f64, Z, Z>::zeros();
    for i in 0..N_SIGMA {
        let z_diff = residual(&z_sig.column(i).into_owned(), &z_pred, angles);
        s_cov += z_diff * z_diff.transpose() * weights[i];
    }
    s_cov += model.get_r();

    Ok(MeasurementPrediction {
        sigma_points: z_sig,
        mean: z_pred,
        innovation_covariance: s_cov,
    })
}

/// Fuses measurement `z` into `state` using the sigma points of the preceding
/// prediction. Returns the normalized innovation squared.
///
/// All guards run before anything is written, so on error `state` still holds
/// the prediction.
pub fn unscented_update<const Z: usize, M: Measurement<Z>>(
    state: &mut FilterState,
    sigma: &PredictedSigmaPoints,
    weights: &SigmaWeights,
    model: &M,
    z: &SVector<f64, Z>,
) -> Result<f64, FilterError> {
    model.validate(z)?;

    let prediction = predict_measurement_moments(model, sigma, weights)?;
    let angles = model.angle_components();

    // --- Cross-correlation between state and measurement space ---
    let mut t_cov = SMatrix::<f64, N_X, Z>::zeros();
    for i in 0..N_SIGMA {
        let x_diff = residual(
            &sigma.points().column(i).into_owned(),
            &state.vector,
            &STATE_ANGLE_COMPONENTS,
        );
        let z_diff = residual(
            &prediction.sigma_points.column(i).into_owned(),
            &prediction.mean,
            angles,
        );
        t_cov += x_diff * z_diff.transpose() * weights[i];
    }

    let s_cov = prediction.innovation_covariance;
    let s_inv = s_cov
        .try_inverse()
        .filter(|inv| inv.iter().all(|v| v.is_finite()))
        .ok_or(FilterError::SingularInnovationCovariance)?;

    let k_gain = t_cov * s_inv;
    let innovation = residual(z, &prediction.mean, angles);
    let nis = (innovation.transpose() * s_inv * innovation)[(0, 0)];

    state.vector += k_gain * innovation;
    state.vector[YAW] = normalize_angle(state.vector[YAW]);
    state.covariance = symmetrize(&(state.covariance - k_gain * s_cov * k_gain.transpose()));

    Ok(nis)
}

// Tiny numerical errors can make P slightly non-symmetric. This forces it.
fn symmetrize(p: &StateCovariance) -> StateCovariance {
    (p + p.transpose()) * 0.5
}

// =========================================================================
// == The Filter ==
// =========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterStatus {
    /// Waiting for the first sample.
    Uninitialized,
    Tracking,
    /// A fatal error occurred; only `reset` recovers.
    Faulted,
}

/// Unscented Kalman filter fusing lidar and radar with a CTRV motion model.
#[derive(Debug)]
pub struct UnscentedKalmanFilter {
    config: FilterConfig,
    status: FilterStatus,
    state: FilterState,
    motion_model: Box<dyn MotionModel>,
    lidar_model: LidarModel,
    radar_model: RadarModel,

    // --- UKF-specific internal state ---
    weights: SigmaWeights,
    /// Written by every prediction, read by the update of the same cycle.
    predicted_sigma_points: PredictedSigmaPoints,
}

impl UnscentedKalmanFilter {
    pub fn new(config: FilterConfig) -> Self {
        Self::with_motion_model(config, Box::new(CtrvModel::default()))
    }

    pub fn with_motion_model(config: FilterConfig, motion_model: Box<dyn MotionModel>) -> Self {
        Self {
            lidar_model: LidarModel::new(&config.lidar_noise),
            radar_model: RadarModel::new(&config.radar_noise),
            config,
            status: FilterStatus::Uninitialized,
            state: FilterState::new(StateVector::zeros(), StateCovariance::zeros(), 0),
            motion_model,
            weights: SigmaWeights::new(),
            predicted_sigma_points: PredictedSigmaPoints::zeros(),
        }
    }

    /// Starts tracking from a known estimate instead of waiting for a sample.
    pub fn from_state(config: FilterConfig, state: FilterState) -> Self {
        let mut filter = Self::new(config);
        filter.state = state;
        filter.status = FilterStatus::Tracking;
        filter
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    pub fn status(&self) -> FilterStatus {
        self.status
    }

    pub fn weights(&self) -> &SigmaWeights {
        &self.weights
    }

    /// The sigma points of the most recent prediction.
    pub fn predicted_sigma_points(&self) -> &PredictedSigmaPoints {
        &self.predicted_sigma_points
    }

    /// Current state mean `x`.
    pub fn state(&self) -> Result<&StateVector, FilterError> {
        self.get_state().map(|s| &s.vector)
    }

    /// Current state covariance `P`.
    pub fn covariance(&self) -> Result<&StateCovariance, FilterError> {
        self.get_state().map(|s| &s.covariance)
    }

    /// Runs one full cycle for `sample`: initialize on the first sample,
    /// otherwise predict to its timestamp and fuse it.
    pub fn process_measurement(
        &mut self,
        sample: &MeasurementSample,
    ) -> Result<UpdateOutcome, FilterError> {
        let sensor = sample.sensor_kind();

        match self.status {
            FilterStatus::Faulted => return Err(FilterError::NonPositiveSemiDefiniteCovariance),
            FilterStatus::Uninitialized => {
                self.initialize(sample);
                return Ok(UpdateOutcome::Initialized { sensor });
            }
            FilterStatus::Tracking => {}
        }

        let last_us = self.state.last_update_timestamp_us;
        if sample.timestamp_us < last_us {
            return Err(FilterError::TimestampRegression {
                last_us,
                current_us: sample.timestamp_us,
            });
        }

        // 1. PREDICT: Advance the state to the exact time of the measurement.
        let dt = (sample.timestamp_us - last_us) as f64 / MICROS_PER_SECOND;
        debug!(%sensor, dt, "predicting");
        if let Err(err) = unscented_predict(
            &mut self.state,
            &mut self.predicted_sigma_points,
            &self.weights,
            self.motion_model.as_ref(),
            &self.config.process_noise,
            dt,
        ) {
            error!(%err, "prediction failed, filter is faulted until reset");
            self.status = FilterStatus::Faulted;
            return Err(err);
        }
        self.state.last_update_timestamp_us = sample.timestamp_us;

        let enabled = match sensor {
            SensorKind::Lidar => self.config.lidar_enabled,
            SensorKind::Radar => self.config.radar_enabled,
        };
        if !enabled {
            return Ok(UpdateOutcome::PredictedOnly {
                sensor,
                reason: SkipReason::SensorDisabled,
            });
        }

        // 2. UPDATE: Now that we're at the correct time, fuse the measurement.
        let result = match &sample.data {
            MeasurementData::Lidar(z) => unscented_update(
                &mut self.state,
                &self.predicted_sigma_points,
                &self.weights,
                &self.lidar_model,
                z,
            ),
            MeasurementData::Radar(z) => unscented_update(
                &mut self.state,
                &self.predicted_sigma_points,
                &self.weights,
                &self.radar_model,
                z,
            ),
        };

        match result {
            Ok(nis) => Ok(UpdateOutcome::Corrected { sensor, nis }),
            Err(err) => {
                warn!(%sensor, %err, "skipping update, keeping prediction");
                Ok(UpdateOutcome::PredictedOnly {
                    sensor,
                    reason: SkipReason::Rejected(err),
                })
            }
        }
    }

    /// Seeds `x` and `P` from the first sample.
    fn initialize(&mut self, sample: &MeasurementSample) {
        let prior = &self.config.initial_uncertainty;

        let (vector, variances) = match &sample.data {
            MeasurementData::Lidar(z) => {
                let noise = &self.config.lidar_noise;
                (
                    StateVector::new(z.x, z.y, 0.0, 0.0, 0.0),
                    StateVector::new(
                        noise.std_px.powi(2),
                        noise.std_py.powi(2),
                        prior.velocity_variance,
                        prior.yaw_variance,
                        prior.yaw_rate_variance,
                    ),
                )
            }
            MeasurementData::Radar(z) => {
                let noise = &self.config.radar_noise;
                let (range, bearing, range_rate) = (z[0], z[1], z[2]);
                let (sin_b, cos_b) = bearing.sin_cos();
                let speed = (range_rate * cos_b).hypot(range_rate * sin_b);
                (
                    StateVector::new(range * cos_b, range * sin_b, speed, 0.0, 0.0),
                    StateVector::new(
                        noise.std_range.powi(2),
                        noise.std_range.powi(2),
                        noise.std_range_rate.powi(2),
                        prior.yaw_variance,
                        prior.yaw_rate_variance,
                    ),
                )
            }
        };

        self.state = FilterState::new(
            vector,
            StateCovariance::from_diagonal(&variances),
            sample.timestamp_us,
        );
        self.status = FilterStatus::Tracking;
        debug!(
            sensor = %sample.sensor_kind(),
            timestamp_us = sample.timestamp_us,
            "filter initialized"
        );
    }
}

// --- The Public Trait Implementation ---
impl StateEstimator for UnscentedKalmanFilter {
    fn process(&mut self, sample: &MeasurementSample) -> Result<UpdateOutcome, FilterError> {
        self.process_measurement(sample)
    }

    fn get_state(&self) -> Result<&FilterState, FilterError> {
        match self.status {
            FilterStatus::Uninitialized => Err(FilterError::UninitializedStateAccess),
            FilterStatus::Tracking | FilterStatus::Faulted => Ok(&self.state),
        }
    }

    fn reset(&mut self) {
        self.status = FilterStatus::Uninitialized;
        self.state = FilterState::new(StateVector::zeros(), StateCovariance::zeros(), 0);
        self.predicted_sigma_points = PredictedSigmaPoints::zeros();
    }
}
