// fusion_sim/src/scenario.rs

//! Synthetic ground truth and noisy lidar/radar samples for a single target.

use anyhow::{Context, Result};
use fusion_core::config::{FilterConfig, LidarNoise, RadarNoise};
use fusion_core::models::dynamics::ctrv::CtrvModel;
use fusion_core::models::dynamics::MotionModel;
use fusion_core::prelude::{normalize_angle, MeasurementSample, SensorKind};
use fusion_core::types::{AugStateVector, StateVector, NU_A, N_X, PX, PY, V, YAW, YAW_RATE};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use serde::Serialize;

use crate::config::{ManeuverSegment, ScenarioConfig, TargetConfig};

/// Longest integration step used when advancing the ground truth.
const MAX_STEP_S: f64 = 0.01;

// =========================================================================
// == Ground Truth ==
// =========================================================================

/// The true kinematic state of the target at one sample time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GroundTruth {
    pub position: [f64; 2],
    pub velocity: [f64; 2],
    /// Heading, when the source provides it.
    pub yaw: Option<f64>,
    pub yaw_rate: Option<f64>,
}

impl GroundTruth {
    pub fn from_state(state: &StateVector) -> Self {
        let (sin_yaw, cos_yaw) = state[YAW].sin_cos();
        Self {
            position: [state[PX], state[PY]],
            velocity: [state[V] * cos_yaw, state[V] * sin_yaw],
            yaw: Some(normalize_angle(state[YAW])),
            yaw_rate: Some(state[YAW_RATE]),
        }
    }
}

/// A sample paired with the truth it was generated from, if known.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioEvent {
    pub sample: MeasurementSample,
    pub truth: Option<GroundTruth>,
}

/// Integrates the target's motion through its manoeuvre schedule.
#[derive(Debug, Clone)]
pub struct TargetTrajectory {
    segments: Vec<ManeuverSegment>,
    model: CtrvModel,
    state: StateVector,
    time_s: f64,
}

impl TargetTrajectory {
    pub fn new(target: &TargetConfig) -> Self {
        let first_yaw_rate = target.segments.first().map_or(0.0, |s| s.yaw_rate);
        Self {
            segments: target.segments.clone(),
            model: CtrvModel::default(),
            state: StateVector::new(
                target.position[0],
                target.position[1],
                target.speed,
                target.yaw,
                first_yaw_rate,
            ),
            time_s: 0.0,
        }
    }

    /// The manoeuvre in force at the current time and when it ends.
    fn active_segment(&self) -> (ManeuverSegment, f64) {
        let mut end = 0.0;
        for segment in &self.segments {
            end += segment.duration_s;
            if self.time_s < end - 1e-9 {
                return (*segment, end);
            }
        }
        let coast = ManeuverSegment {
            duration_s: f64::INFINITY,
            yaw_rate: self.state[YAW_RATE],
            acceleration: 0.0,
        };
        (coast, f64::INFINITY)
    }

    /// Advances to `time_s` (seconds since start) and returns the true state.
    /// Times in the past return the current state.
    pub fn advance_to(&mut self, time_s: f64) -> StateVector {
        while self.time_s < time_s - 1e-12 {
            let (segment, end) = self.active_segment();
            let step = (time_s - self.time_s).min(MAX_STEP_S).min(end - self.time_s);

            self.state[YAW_RATE] = segment.yaw_rate;
            let mut point = AugStateVector::zeros();
            point.fixed_rows_mut::<N_X>(0).copy_from(&self.state);
            point[NU_A] = segment.acceleration;

            self.state = self.model.propagate(&point, step);
            self.time_s += step;
        }
        self.state
    }
}

// =========================================================================
// == Sensor Simulation ==
// =========================================================================

/// Draws noisy samples from the true state with the sensors' datasheet noise.
pub struct SensorSimulator {
    rng: ChaCha8Rng,
    lidar: [Normal<f64>; 2],
    radar: [Normal<f64>; 3],
}

impl SensorSimulator {
    pub fn new(seed: u64, lidar: &LidarNoise, radar: &RadarNoise) -> Result<Self> {
        let normal = |std: f64| Normal::new(0.0, std).context("invalid sensor noise deviation");
        Ok(Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            lidar: [normal(lidar.std_px)?, normal(lidar.std_py)?],
            radar: [
                normal(radar.std_range)?,
                normal(radar.std_bearing)?,
                normal(radar.std_range_rate)?,
            ],
        })
    }

    pub fn lidar(&mut self, timestamp_us: i64, truth: &StateVector) -> MeasurementSample {
        MeasurementSample::lidar(
            timestamp_us,
            truth[PX] + self.lidar[0].sample(&mut self.rng),
            truth[PY] + self.lidar[1].sample(&mut self.rng),
        )
    }

    pub fn radar(&mut self, timestamp_us: i64, truth: &StateVector) -> MeasurementSample {
        let (p_x, p_y, v) = (truth[PX], truth[PY], truth[V]);
        let (sin_yaw, cos_yaw) = truth[YAW].sin_cos();

        let range = p_x.hypot(p_y);
        let bearing = p_y.atan2(p_x);
        let range_rate = if range > 0.0 {
            (p_x * v * cos_yaw + p_y * v * sin_yaw) / range
        } else {
            0.0
        };

        MeasurementSample::radar(
            timestamp_us,
            (range + self.radar[0].sample(&mut self.rng)).max(0.0),
            normalize_angle(bearing + self.radar[1].sample(&mut self.rng)),
            range_rate + self.radar[2].sample(&mut self.rng),
        )
    }
}

/// Sample times for one sensor over `duration_s`, offset by a fraction of its
/// period so two sensors at the same rate interleave.
fn schedule(
    rate_hz: f64,
    duration_s: f64,
    phase: f64,
    sensor: SensorKind,
) -> Vec<(i64, SensorKind)> {
    if rate_hz <= 0.0 {
        return Vec::new();
    }
    let mut times = Vec::new();
    let mut k = 0_u64;
    loop {
        let t = (k as f64 + phase) / rate_hz;
        if t > duration_s {
            break;
        }
        times.push(((t * 1e6).round() as i64, sensor));
        k += 1;
    }
    times
}

/// Builds the full, time-ordered list of samples for a scenario.
pub fn generate(config: &ScenarioConfig) -> Result<Vec<ScenarioEvent>> {
    let sim = &config.simulation;
    let filter: &FilterConfig = &config.filter;

    let mut times = schedule(sim.lidar_rate_hz, sim.duration_s, 0.0, SensorKind::Lidar);
    times.extend(schedule(sim.radar_rate_hz, sim.duration_s, 0.5, SensorKind::Radar));
    times.sort_by_key(|(timestamp_us, _)| *timestamp_us);

    let mut trajectory = TargetTrajectory::new(&config.target);
    let mut sensors = SensorSimulator::new(sim.seed, &filter.lidar_noise, &filter.radar_noise)?;

    let events = times
        .into_iter()
        .map(|(timestamp_us, sensor)| {
            let truth = trajectory.advance_to(timestamp_us as f64 / 1e6);
            let sample = match sensor {
                SensorKind::Lidar => sensors.lidar(timestamp_us, &truth),
                SensorKind::Radar => sensors.radar(timestamp_us, &truth),
            };
            ScenarioEvent {
                sample,
                truth: Some(GroundTruth::from_state(&truth)),
            }
        })
        .collect();

    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use crate::config::Simulation;

    #[test]
    fn coasting_target_moves_in_a_straight_line() {
        let mut trajectory = TargetTrajectory::new(&TargetConfig {
            position: [0.0, 0.0],
            speed: 2.0,
            yaw: 0.0,
            segments: Vec::new(),
        });
        let state = trajectory.advance_to(3.0);
        assert_abs_diff_eq!(state[PX], 6.0, epsilon = 1e-9);
        assert_abs_diff_eq!(state[PY], 0.0, epsilon = 1e-9);
    }

    #[test]
    fn acceleration_segment_changes_speed() {
        let mut trajectory = TargetTrajectory::new(&TargetConfig {
            position: [0.0, 0.0],
            speed: 1.0,
            yaw: 0.0,
            segments: vec![ManeuverSegment {
                duration_s: 2.0,
                yaw_rate: 0.0,
                acceleration: 1.5,
            }],
        });
        let state = trajectory.advance_to(4.0);
        // 1 m/s + 1.5 m/s^2 * 2 s, then coasting.
        assert_abs_diff_eq!(state[V], 4.0, epsilon = 1e-9);
        assert_abs_diff_eq!(state[PX], 1.0 * 2.0 + 0.75 * 4.0 + 4.0 * 2.0, epsilon = 1e-6);
    }

    #[test]
    fn turn_segment_rotates_heading() {
        let mut trajectory = TargetTrajectory::new(&TargetConfig {
            position: [0.0, 0.0],
            speed: 1.0,
            yaw: 0.0,
            segments: vec![ManeuverSegment {
                duration_s: 1.0,
                yaw_rate: 0.5,
                acceleration: 0.0,
            }],
        });
        let state = trajectory.advance_to(1.0);
        assert_abs_diff_eq!(state[YAW], 0.5, epsilon = 1e-9);
    }

    #[test]
    fn generated_events_are_ordered_and_reproducible() {
        let config = ScenarioConfig {
            simulation: Simulation {
                seed: 3,
                duration_s: 2.0,
                lidar_rate_hz: 10.0,
                radar_rate_hz: 5.0,
            },
            ..ScenarioConfig::default()
        };
        let events = generate(&config).unwrap();

        assert_eq!(events.len(), 21 + 10);
        assert!(events
            .windows(2)
            .all(|w| w[0].sample.timestamp_us <= w[1].sample.timestamp_us));
        assert!(events.iter().all(|e| e.truth.is_some()));
        assert_eq!(events, generate(&config).unwrap());
    }

    #[test]
    fn zero_rate_drops_the_sensor() {
        let config = ScenarioConfig {
            simulation: Simulation {
                radar_rate_hz: 0.0,
                ..Simulation::default()
            },
            ..ScenarioConfig::default()
        };
        let events = generate(&config).unwrap();
        assert!(events
            .iter()
            .all(|e| e.sample.sensor_kind() == SensorKind::Lidar));
    }
}
