// fusion_sim/src/prelude.rs

// Re-export the entire fusion_core prelude so you can easily access
// pure types like `MeasurementSample`, `FilterConfig`, `StateEstimator`, etc.
pub use fusion_core::prelude::*;

// Re-export common simulation-specific types for easy access.
pub use crate::config::{ManeuverSegment, ScenarioConfig, Simulation, TargetConfig};
pub use crate::metrics::{NisSummary, Rmse};
pub use crate::runner::{EstimateRecord, RunReport};
pub use crate::scenario::{GroundTruth, ScenarioEvent, TargetTrajectory};
