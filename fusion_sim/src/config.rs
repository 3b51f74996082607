// fusion_sim/src/config.rs

//! Loads a scenario description from TOML, layered over built-in defaults.

use anyhow::{Context, Result};
use figment::{
    providers::{Format, Serialized, Toml},
    Figment,
};
use fusion_core::config::FilterConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

// =========================================================================
// == Top-Level Configuration ==
// =========================================================================

/// # ScenarioConfig
/// The root of the data parsed from a `scenario.toml` file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)] // Fail if the TOML has fields not in our struct
pub struct ScenarioConfig {
    #[serde(default)] // Use default if the [simulation] section is missing
    pub simulation: Simulation,

    #[serde(default)]
    pub target: TargetConfig,

    #[serde(default)]
    pub filter: FilterConfig,
}

impl ScenarioConfig {
    /// Reads `path` on top of the defaults. Missing sections and fields keep
    /// their default values.
    pub fn load(path: &Path) -> Result<Self> {
        Figment::from(Serialized::defaults(ScenarioConfig::default()))
            .merge(Toml::file(path))
            .extract()
            .with_context(|| format!("failed to load scenario file {}", path.display()))
    }

    /// Parses an in-memory TOML document on top of the defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Figment::from(Serialized::defaults(ScenarioConfig::default()))
            .merge(Toml::string(contents))
            .extract()
            .context("failed to parse scenario")
    }
}

// =========================================================================
// == Configuration Sub-Structs ==
// =========================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Simulation {
    /// Seed for the pseudo-random number generator, for determinism.
    pub seed: u64,
    /// Duration of the run in seconds.
    pub duration_s: f64,
    /// Lidar sample rate in Hz. Zero removes the sensor from the scenario.
    pub lidar_rate_hz: f64,
    /// Radar sample rate in Hz. Zero removes the sensor from the scenario.
    pub radar_rate_hz: f64,
}

impl Default for Simulation {
    fn default() -> Self {
        Self {
            seed: 42,
            duration_s: 20.0,
            lidar_rate_hz: 20.0,
            radar_rate_hz: 20.0,
        }
    }
}

/// Ground-truth motion of the tracked object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    /// Initial `[px, py]` in metres.
    pub position: [f64; 2],
    /// Initial speed, m/s.
    pub speed: f64,
    /// Initial heading, rad.
    pub yaw: f64,
    /// Manoeuvres applied back to back. After the last one the target keeps
    /// its speed and yaw rate.
    #[serde(default)]
    pub segments: Vec<ManeuverSegment>,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            position: [-10.0, 5.0],
            speed: 5.0,
            yaw: 0.0,
            segments: vec![
                ManeuverSegment {
                    duration_s: 5.0,
                    ..ManeuverSegment::default()
                },
                ManeuverSegment {
                    duration_s: 5.0,
                    yaw_rate: 0.3,
                    acceleration: 0.5,
                },
                ManeuverSegment {
                    duration_s: 5.0,
                    yaw_rate: -0.2,
                    acceleration: -0.5,
                },
                ManeuverSegment {
                    duration_s: 5.0,
                    ..ManeuverSegment::default()
                },
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields, default)]
pub struct ManeuverSegment {
    pub duration_s: f64,
    /// Constant yaw rate held over the segment, rad/s.
    pub yaw_rate: f64,
    /// Constant longitudinal acceleration over the segment, m/s^2.
    pub acceleration: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = ScenarioConfig::from_toml_str(
            r#"
            [simulation]
            seed = 7
            duration_s = 3.0
            lidar_rate_hz = 10.0
            radar_rate_hz = 0.0

            [filter]
            radar_enabled = false

            [filter.process_noise]
            std_a = 1.5
            "#,
        )
        .unwrap();

        assert_eq!(config.simulation.seed, 7);
        assert_eq!(config.simulation.radar_rate_hz, 0.0);
        assert!(!config.filter.radar_enabled);
        assert!(config.filter.lidar_enabled);
        assert_eq!(config.filter.process_noise.std_a, 1.5);
        assert_eq!(config.filter.process_noise.std_yawdd, 2.0);
        assert_eq!(config.target, TargetConfig::default());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = ScenarioConfig::from_toml_str(
            r#"
            [filter]
            use_laser = true
            "#,
        );
        assert!(result.is_err());
    }
}
