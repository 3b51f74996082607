// fusion_core/src/models/dynamics/mod.rs

use crate::types::{AugStateVector, StateVector};
use std::fmt::Debug;

/// A process model used by the unscented prediction step.
///
/// Unlike a derivative-based model, the propagation here works on an
/// augmented point: the state plus the noise samples that drive it over the
/// interval. The implementation maps each sigma point directly to its
/// successor, so it can add the noise contribution analytically.
pub trait MotionModel: Debug + Send + Sync {
    /// Propagates one augmented sigma point forward by `dt` seconds.
    ///
    /// # Arguments
    /// * `point`: Augmented state `[px, py, v, yaw, yaw_rate, nu_a, nu_yawdd]`.
    /// * `dt`: Elapsed time in seconds. Must be non-negative.
    ///
    /// # Returns
    /// The successor state vector, without noise components.
    fn propagate(&self, point: &AugStateVector, dt: f64) -> StateVector;
}

pub mod ctrv;
