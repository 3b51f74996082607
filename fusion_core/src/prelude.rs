// fusion_core/src/prelude.rs

// --- Core Abstractions (The main contracts of the library) ---
pub use crate::estimation::{SkipReason, StateEstimator, UpdateOutcome};
pub use crate::messages::{MeasurementData, MeasurementSample, SensorKind};
pub use crate::models::dynamics::MotionModel;
pub use crate::models::measurement::Measurement;

// --- Core Data Structures (The "nouns" of the library) ---
pub use crate::config::{FilterConfig, InitialUncertainty, LidarNoise, ProcessNoise, RadarNoise};
pub use crate::error::FilterError;
pub use crate::state::FilterState;
pub use crate::types::{PredictedSigmaPoints, StateCovariance, StateVector};

// --- Estimation Algorithms ---
pub use crate::estimation::filters::ukf::{FilterStatus, UnscentedKalmanFilter};

// --- Concrete Model Implementations (Export common ones for convenience) ---
pub use crate::models::dynamics::ctrv::CtrvModel;
pub use crate::models::measurement::lidar::LidarModel;
pub use crate::models::measurement::radar::RadarModel;
pub use crate::utils::angles::normalize_angle;
