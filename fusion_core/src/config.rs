// fusion_core/src/config.rs

//! Construction-time parameters for the estimator. The filter takes a
//! `FilterConfig` by value and never hands out a mutable reference to it.

use serde::{Deserialize, Serialize};

// =========================================================================
// == Top-Level Configuration ==
// =========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct FilterConfig {
    /// When false, lidar samples still advance the time base (prediction runs)
    /// but are not fused. The very first sample initializes regardless.
    pub lidar_enabled: bool,
    /// Same as `lidar_enabled`, for radar samples.
    pub radar_enabled: bool,
    pub process_noise: ProcessNoise,
    pub lidar_noise: LidarNoise,
    pub radar_noise: RadarNoise,
    pub initial_uncertainty: InitialUncertainty,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            lidar_enabled: true,
            radar_enabled: true,
            process_noise: ProcessNoise::default(),
            lidar_noise: LidarNoise::default(),
            radar_noise: RadarNoise::default(),
            initial_uncertainty: InitialUncertainty::default(),
        }
    }
}

// =========================================================================
// == Configuration Sub-Structs ==
// =========================================================================

/// Tunable process noise of the CTRV model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ProcessNoise {
    /// Longitudinal acceleration noise standard deviation, m/s^2.
    pub std_a: f64,
    /// Yaw acceleration noise standard deviation, rad/s^2.
    pub std_yawdd: f64,
}

impl Default for ProcessNoise {
    fn default() -> Self {
        Self {
            std_a: 3.0,
            std_yawdd: 2.0,
        }
    }
}

/// Lidar noise as given by the sensor datasheet, in metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct LidarNoise {
    pub std_px: f64,
    pub std_py: f64,
}

impl Default for LidarNoise {
    fn default() -> Self {
        Self {
            std_px: 0.15,
            std_py: 0.15,
        }
    }
}

/// Radar noise as given by the sensor datasheet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct RadarNoise {
    /// Range, m.
    pub std_range: f64,
    /// Bearing, rad.
    pub std_bearing: f64,
    /// Range rate, m/s.
    pub std_range_rate: f64,
}

impl Default for RadarNoise {
    fn default() -> Self {
        Self {
            std_range: 0.3,
            std_bearing: 0.03,
            std_range_rate: 0.3,
        }
    }
}

/// Prior variances for the state components the first sample cannot observe.
///
/// Yaw and yaw rate are independent entries for both sensors; neither is tied
/// to the radar bearing noise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct InitialUncertainty {
    /// Speed variance used when the first sample is a lidar sample.
    pub velocity_variance: f64,
    pub yaw_variance: f64,
    pub yaw_rate_variance: f64,
}

impl Default for InitialUncertainty {
    fn default() -> Self {
        Self {
            velocity_variance: 1.0,
            yaw_variance: 1.0,
            yaw_rate_variance: 1.0,
        }
    }
}
