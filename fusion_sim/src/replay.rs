// fusion_sim/src/replay.rs

//! Reader for recorded measurement logs.
//!
//! One sample per line, whitespace separated, timestamps in microseconds:
//!
//! ```text
//! L  px  py           timestamp  gt_px gt_py gt_vx gt_vy [gt_yaw gt_yaw_rate]
//! R  rho phi rho_dot  timestamp  gt_px gt_py gt_vx gt_vy [gt_yaw gt_yaw_rate]
//! ```
//!
//! The ground-truth columns are optional as a group. Blank lines and lines
//! starting with `#` are ignored.

use anyhow::{anyhow, bail, Context, Result};
use fusion_core::prelude::{MeasurementSample, SensorKind};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::scenario::{GroundTruth, ScenarioEvent};

pub fn load(path: &Path) -> Result<Vec<ScenarioEvent>> {
    let file = File::open(path).with_context(|| format!("failed to open log {}", path.display()))?;
    parse(BufReader::new(file)).with_context(|| format!("failed to read log {}", path.display()))
}

pub fn parse<R: BufRead>(reader: R) -> Result<Vec<ScenarioEvent>> {
    let mut events = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let event = parse_line(line).with_context(|| format!("line {}", index + 1))?;
        events.push(event);
    }
    Ok(events)
}

pub fn parse_line(line: &str) -> Result<ScenarioEvent> {
    let mut fields = line.split_whitespace();
    let sensor = match fields.next() {
        Some("L") => SensorKind::Lidar,
        Some("R") => SensorKind::Radar,
        Some(other) => bail!("unknown sensor tag `{other}`"),
        None => bail!("empty record"),
    };

    let dim = sensor.measurement_dim();
    let raw = fields
        .by_ref()
        .take(dim)
        .map(parse_f64)
        .collect::<Result<Vec<_>>>()?;

    let timestamp_us: i64 = fields
        .next()
        .ok_or_else(|| anyhow!("missing timestamp"))?
        .parse()
        .context("invalid timestamp")?;

    let sample = MeasurementSample::from_raw(sensor, timestamp_us, &raw)?;

    let rest = fields.map(parse_f64).collect::<Result<Vec<_>>>()?;
    let truth = match rest.as_slice() {
        [] => None,
        [px, py, vx, vy] => Some(GroundTruth {
            position: [*px, *py],
            velocity: [*vx, *vy],
            yaw: None,
            yaw_rate: None,
        }),
        [px, py, vx, vy, yaw, yaw_rate] => Some(GroundTruth {
            position: [*px, *py],
            velocity: [*vx, *vy],
            yaw: Some(*yaw),
            yaw_rate: Some(*yaw_rate),
        }),
        other => bail!("expected 0, 4 or 6 ground-truth columns, found {}", other.len()),
    };

    Ok(ScenarioEvent { sample, truth })
}

fn parse_f64(field: &str) -> Result<f64> {
    field
        .parse()
        .with_context(|| format!("invalid number `{field}`"))
}
