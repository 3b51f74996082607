// fusion_sim/src/metrics.rs

//! Accuracy and consistency measures for a filter run.

use fusion_core::prelude::{FilterState, SensorKind};
use serde::Serialize;

use crate::scenario::GroundTruth;

/// 95% quantile of the chi-squared distribution with 2 degrees of freedom.
pub const NIS_95_LIDAR: f64 = 5.991;
/// 95% quantile of the chi-squared distribution with 3 degrees of freedom.
pub const NIS_95_RADAR: f64 = 7.815;

pub fn nis_threshold(sensor: SensorKind) -> f64 {
    match sensor {
        SensorKind::Lidar => NIS_95_LIDAR,
        SensorKind::Radar => NIS_95_RADAR,
    }
}

/// Root mean squared error over `[px, py, vx, vy]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rmse {
    pub px: f64,
    pub py: f64,
    pub vx: f64,
    pub vy: f64,
}

#[derive(Debug, Clone, Default)]
pub struct RmseAccumulator {
    sum_sq: [f64; 4],
    count: usize,
}

impl RmseAccumulator {
    pub fn add(&mut self, estimate: &FilterState, truth: &GroundTruth) {
        let position = estimate.position();
        let velocity = estimate.velocity();
        let errors = [
            position.x - truth.position[0],
            position.y - truth.position[1],
            velocity.x - truth.velocity[0],
            velocity.y - truth.velocity[1],
        ];
        for (sum, err) in self.sum_sq.iter_mut().zip(errors) {
            *sum += err * err;
        }
        self.count += 1;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// `None` until at least one pair has been added.
    pub fn rmse(&self) -> Option<Rmse> {
        if self.count == 0 {
            return None;
        }
        let n = self.count as f64;
        let [px, py, vx, vy] = self.sum_sq.map(|s| (s / n).sqrt());
        Some(Rmse { px, py, vx, vy })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct NisSummary {
    pub samples: usize,
    pub above_95: usize,
    /// Fraction of samples above the 95% threshold. A well tuned filter sits
    /// near 0.05.
    pub ratio_above_95: f64,
}

#[derive(Debug, Clone, Default)]
pub struct NisTracker {
    lidar: (usize, usize),
    radar: (usize, usize),
}

impl NisTracker {
    pub fn add(&mut self, sensor: SensorKind, nis: f64) {
        let (samples, above) = match sensor {
            SensorKind::Lidar => &mut self.lidar,
            SensorKind::Radar => &mut self.radar,
        };
        *samples += 1;
        if nis > nis_threshold(sensor) {
            *above += 1;
        }
    }

    pub fn summary(&self, sensor: SensorKind) -> NisSummary {
        let (samples, above_95) = match sensor {
            SensorKind::Lidar => self.lidar,
            SensorKind::Radar => self.radar,
        };
        let ratio_above_95 = if samples == 0 {
            0.0
        } else {
            above_95 as f64 / samples as f64
        };
        NisSummary {
            samples,
            above_95,
            ratio_above_95,
        }
    }
}
