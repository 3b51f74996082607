// fusion_core/src/messages.rs

use crate::error::FilterError;
use nalgebra::{Vector2, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;

// =========================================================================
// == Sensor Identification ==
// =========================================================================

/// The two sensor families the estimator knows how to fuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorKind {
    Lidar,
    Radar,
}

impl SensorKind {
    /// Length of the raw measurement vector this sensor reports.
    pub fn measurement_dim(self) -> usize {
        match self {
            SensorKind::Lidar => 2,
            SensorKind::Radar => 3,
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorKind::Lidar => write!(f, "lidar"),
            SensorKind::Radar => write!(f, "radar"),
        }
    }
}

// =========================================================================
// == Core Message and Data Enums ==
// =========================================================================

/// A self-describing container for raw sensor data.
#[derive(Clone, Debug, PartialEq)]
pub enum MeasurementData {
    /// Cartesian position `[px, py]` in metres.
    Lidar(Vector2<f64>),
    /// Polar `[range, bearing, range_rate]` in metres, radians and m/s.
    Radar(Vector3<f64>),
}

/// One sample from a sensor, the only input the estimator consumes.
#[derive(Clone, Debug, PartialEq)]
pub struct MeasurementSample {
    /// Acquisition time in microseconds. Must not decrease between samples.
    pub timestamp_us: i64,
    pub data: MeasurementData,
}

impl MeasurementSample {
    pub fn lidar(timestamp_us: i64, px: f64, py: f64) -> Self {
        Self {
            timestamp_us,
            data: MeasurementData::Lidar(Vector2::new(px, py)),
        }
    }

    pub fn radar(timestamp_us: i64, range: f64, bearing: f64, range_rate: f64) -> Self {
        Self {
            timestamp_us,
            data: MeasurementData::Radar(Vector3::new(range, bearing, range_rate)),
        }
    }

    /// Builds a sample from an untyped slice, checking it has the length the
    /// sensor reports.
    pub fn from_raw(
        sensor: SensorKind,
        timestamp_us: i64,
        raw: &[f64],
    ) -> Result<Self, FilterError> {
        let expected = sensor.measurement_dim();
        if raw.len() != expected {
            return Err(FilterError::MeasurementDimension {
                sensor,
                expected,
                actual: raw.len(),
            });
        }

        Ok(match sensor {
            SensorKind::Lidar => Self::lidar(timestamp_us, raw[0], raw[1]),
            SensorKind::Radar => Self::radar(timestamp_us, raw[0], raw[1], raw[2]),
        })
    }

    pub fn sensor_kind(&self) -> SensorKind {
        match self.data {
            MeasurementData::Lidar(_) => SensorKind::Lidar,
            MeasurementData::Radar(_) => SensorKind::Radar,
        }
    }
}
