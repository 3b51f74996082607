// fusion_core/src/models/dynamics/ctrv.rs

use crate::models::dynamics::MotionModel;
use crate::types::{AugStateVector, StateVector, NU_A, NU_YAWDD, PX, PY, V, YAW, YAW_RATE};

/// Yaw rates at or below this magnitude use the straight-line branch.
pub const DEFAULT_YAW_RATE_THRESHOLD: f64 = 1e-3;

/// Constant turn rate and velocity model.
///
/// Speed and yaw rate are held constant over the interval; the two augmented
/// noise terms (longitudinal and yaw acceleration) perturb them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CtrvModel {
    pub yaw_rate_threshold: f64,
}

impl Default for CtrvModel {
    fn default() -> Self {
        Self {
            yaw_rate_threshold: DEFAULT_YAW_RATE_THRESHOLD,
        }
    }
}

impl MotionModel for CtrvModel {
    fn propagate(&self, point: &AugStateVector, dt: f64) -> StateVector {
        debug_assert!(dt >= 0.0, "CtrvModel::propagate: dt cannot be negative");

        let p_x = point[PX];
        let p_y = point[PY];
        let v = point[V];
        let yaw = point[YAW];
        let yaw_rate = point[YAW_RATE];
        let nu_a = point[NU_A];
        let nu_yawdd = point[NU_YAWDD];

        let (sin_yaw, cos_yaw) = yaw.sin_cos();
        let yaw_end = yaw + yaw_rate * dt;

        // --- 1. Deterministic motion ---
        let (mut px_p, mut py_p) = if yaw_rate.abs() > self.yaw_rate_threshold {
            let (sin_end, cos_end) = yaw_end.sin_cos();
            (
                p_x + v / yaw_rate * (sin_end - sin_yaw),
                p_y + v / yaw_rate * (cos_yaw - cos_end),
            )
        } else {
            (p_x + v * dt * cos_yaw, p_y + v * dt * sin_yaw)
        };
        let mut v_p = v;
        let mut yaw_p = yaw_end;
        let mut yaw_rate_p = yaw_rate;

        // --- 2. Noise contribution over the interval ---
        let half_dt2 = 0.5 * dt * dt;
        px_p += half_dt2 * nu_a * cos_yaw;
        py_p += half_dt2 * nu_a * sin_yaw;
        v_p += nu_a * dt;
        yaw_p += half_dt2 * nu_yawdd;
        yaw_rate_p += nu_yawdd * dt;

        StateVector::new(px_p, py_p, v_p, yaw_p, yaw_rate_p)
    }
}
