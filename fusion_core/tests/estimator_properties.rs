// fusion_core/tests/estimator_properties.rs

use approx::assert_abs_diff_eq;
use fusion_core::estimation::filters::ukf::unscented_predict;
use fusion_core::estimation::sigma_points::SigmaWeights;
use fusion_core::prelude::*;
use fusion_core::types::{N_X, PX, PY, V, YAW, YAW_RATE};
use std::f64::consts::PI;

const F64_EPSILON: f64 = 1e-9;

fn assert_vector_approx_eq(a: &StateVector, b: &StateVector, epsilon: f64) {
    for i in 0..N_X {
        assert_abs_diff_eq!(a[i], b[i], epsilon = epsilon);
    }
}

fn assert_covariance_approx_eq(a: &StateCovariance, b: &StateCovariance, epsilon: f64) {
    for (x, y) in a.iter().zip(b.iter()) {
        assert_abs_diff_eq!(x, y, epsilon = epsilon);
    }
}

// --- Initialization ---

#[test]
fn radar_sample_initializes_state() {
    let mut ukf = UnscentedKalmanFilter::new(FilterConfig::default());
    let outcome = ukf
        .process_measurement(&MeasurementSample::radar(0, 5.0, 0.0, 0.0))
        .unwrap();

    assert_eq!(
        outcome,
        UpdateOutcome::Initialized {
            sensor: SensorKind::Radar
        }
    );
    assert_vector_approx_eq(
        ukf.state().unwrap(),
        &StateVector::new(5.0, 0.0, 0.0, 0.0, 0.0),
        F64_EPSILON,
    );

    let p = ukf.covariance().unwrap();
    assert_abs_diff_eq!(p[(PX, PX)], 0.09, epsilon = F64_EPSILON);
    assert_abs_diff_eq!(p[(PY, PY)], 0.09, epsilon = F64_EPSILON);
    assert_abs_diff_eq!(p[(V, V)], 0.09, epsilon = F64_EPSILON);
}

#[test]
fn radar_initial_speed_comes_from_range_rate() {
    let mut ukf = UnscentedKalmanFilter::new(FilterConfig::default());
    ukf.process_measurement(&MeasurementSample::radar(0, 2.0, PI / 2.0, -3.0))
        .unwrap();

    let x = ukf.state().unwrap();
    assert_abs_diff_eq!(x[PX], 0.0, epsilon = F64_EPSILON);
    assert_abs_diff_eq!(x[PY], 2.0, epsilon = F64_EPSILON);
    assert_abs_diff_eq!(x[V], 3.0, epsilon = F64_EPSILON);
}

#[test]
fn lidar_sample_initializes_state() {
    let mut ukf = UnscentedKalmanFilter::new(FilterConfig::default());
    ukf.process_measurement(&MeasurementSample::lidar(0, 2.0, 3.0))
        .unwrap();

    assert_vector_approx_eq(
        ukf.state().unwrap(),
        &StateVector::new(2.0, 3.0, 0.0, 0.0, 0.0),
        F64_EPSILON,
    );
    let p = ukf.covariance().unwrap();
    assert_abs_diff_eq!(p[(PX, PX)], 0.0225, epsilon = F64_EPSILON);
    assert_abs_diff_eq!(p[(PY, PY)], 0.0225, epsilon = F64_EPSILON);
    assert_abs_diff_eq!(p[(V, V)], 1.0, epsilon = F64_EPSILON);
    assert_abs_diff_eq!(p[(YAW, YAW)], 1.0, epsilon = F64_EPSILON);
    assert_abs_diff_eq!(p[(YAW_RATE, YAW_RATE)], 1.0, epsilon = F64_EPSILON);
}

/// The radar prior for yaw and yaw rate is configured per entry. It is not
/// derived from the bearing noise, and the two entries do not move together.
#[test]
fn radar_yaw_priors_are_independent_of_bearing_noise() {
    let config = FilterConfig {
        initial_uncertainty: InitialUncertainty {
            velocity_variance: 1.0,
            yaw_variance: 0.5,
            yaw_rate_variance: 0.2,
        },
        ..FilterConfig::default()
    };
    let std_bearing = config.radar_noise.std_bearing;
    let mut ukf = UnscentedKalmanFilter::new(config);
    ukf.process_measurement(&MeasurementSample::radar(0, 8.0, 0.3, 1.0))
        .unwrap();

    let p = ukf.covariance().unwrap();
    assert_abs_diff_eq!(p[(YAW, YAW)], 0.5, epsilon = F64_EPSILON);
    assert_abs_diff_eq!(p[(YAW_RATE, YAW_RATE)], 0.2, epsilon = F64_EPSILON);
    assert!((p[(YAW, YAW)] - std_bearing).abs() > 1e-3);
    assert!((p[(YAW_RATE, YAW_RATE)] - std_bearing).abs() > 1e-3);
}

#[test]
fn reading_state_before_first_sample_fails() {
    let ukf = UnscentedKalmanFilter::new(FilterConfig::default());
    assert_eq!(ukf.state(), Err(FilterError::UninitializedStateAccess));
    assert_eq!(ukf.covariance(), Err(FilterError::UninitializedStateAccess));
    assert_eq!(
        ukf.get_state().unwrap_err(),
        FilterError::UninitializedStateAccess
    );
}

#[test]
fn first_sample_does_not_predict() {
    let mut ukf = UnscentedKalmanFilter::new(FilterConfig::default());
    ukf.process_measurement(&MeasurementSample::lidar(42, 1.0, 1.0))
        .unwrap();
    assert!(ukf.predicted_sigma_points().points().iter().all(|v| *v == 0.0));
    assert_eq!(ukf.get_state().unwrap().last_update_timestamp_us, 42);
}

// --- Prediction ---

#[test]
fn weights_sum_to_one() {
    let ukf = UnscentedKalmanFilter::new(FilterConfig::default());
    assert_abs_diff_eq!(ukf.weights().sum(), 1.0, epsilon = 1e-12);
}

#[test]
fn zero_elapsed_time_prediction_is_a_no_op() {
    let mut covariance =
        StateCovariance::from_diagonal(&StateVector::new(0.3, 0.2, 0.8, 0.05, 0.04));
    covariance[(PX, V)] = 0.05;
    covariance[(V, PX)] = 0.05;
    let mut state = FilterState::new(StateVector::new(3.0, -1.0, 6.0, 2.5, -0.3), covariance, 0);
    let before = state.clone();

    let mut sigma = PredictedSigmaPoints::default();
    unscented_predict(
        &mut state,
        &mut sigma,
        &SigmaWeights::new(),
        &CtrvModel::default(),
        &ProcessNoise::default(),
        0.0,
    )
    .unwrap();

    assert_vector_approx_eq(&state.vector, &before.vector, F64_EPSILON);
    assert_covariance_approx_eq(&state.covariance, &before.covariance, F64_EPSILON);
}

#[test]
fn same_timestamp_sample_with_disabled_sensor_leaves_state() {
    let config = FilterConfig {
        lidar_enabled: false,
        ..FilterConfig::default()
    };
    let mut ukf = UnscentedKalmanFilter::new(config);
    ukf.process_measurement(&MeasurementSample::lidar(1_000, 2.0, 3.0))
        .unwrap();
    let before = ukf.get_state().unwrap().clone();

    let outcome = ukf
        .process_measurement(&MeasurementSample::lidar(1_000, 9.0, 9.0))
        .unwrap();
    assert_eq!(
        outcome,
        UpdateOutcome::PredictedOnly {
            sensor: SensorKind::Lidar,
            reason: SkipReason::SensorDisabled,
        }
    );
    let after = ukf.get_state().unwrap();
    assert_vector_approx_eq(&after.vector, &before.vector, F64_EPSILON);
    assert_covariance_approx_eq(&after.covariance, &before.covariance, F64_EPSILON);
}

#[test]
fn disabled_sensor_still_advances_time() {
    let config = FilterConfig {
        radar_enabled: false,
        ..FilterConfig::default()
    };
    let mut ukf = UnscentedKalmanFilter::new(config);
    ukf.process_measurement(&MeasurementSample::lidar(0, 2.0, 3.0))
        .unwrap();
    let p_before = ukf.covariance().unwrap()[(PX, PX)];

    let outcome = ukf
        .process_measurement(&MeasurementSample::radar(500_000, 3.6, 1.0, 0.0))
        .unwrap();
    assert_eq!(outcome.nis(), None);
    assert_eq!(ukf.get_state().unwrap().last_update_timestamp_us, 500_000);
    // Uncertainty grows with prediction only.
    assert!(ukf.covariance().unwrap()[(PX, PX)] > p_before);
}

// --- Update ---

#[test]
fn degenerate_radar_keeps_prediction_only_estimate() {
    let init = MeasurementSample::lidar(0, 2.0, 3.0);
    let degenerate = MeasurementSample::radar(100_000, 0.0, 0.0, 1.0);

    let mut ukf = UnscentedKalmanFilter::new(FilterConfig::default());
    ukf.process_measurement(&init).unwrap();
    let outcome = ukf.process_measurement(&degenerate).unwrap();
    assert_eq!(
        outcome,
        UpdateOutcome::PredictedOnly {
            sensor: SensorKind::Radar,
            reason: SkipReason::Rejected(FilterError::DegenerateMeasurement { range: 0.0 }),
        }
    );

    // Same cycle with radar switched off gives the prediction-only values.
    let mut reference = UnscentedKalmanFilter::new(FilterConfig {
        radar_enabled: false,
        ..FilterConfig::default()
    });
    reference.process_measurement(&init).unwrap();
    reference.process_measurement(&degenerate).unwrap();

    assert_eq!(ukf.state().unwrap(), reference.state().unwrap());
    assert_eq!(ukf.covariance().unwrap(), reference.covariance().unwrap());
    assert_eq!(ukf.status(), FilterStatus::Tracking);
}

#[test]
fn repeated_lidar_updates_do_not_increase_position_variance() {
    let mut ukf = UnscentedKalmanFilter::new(FilterConfig::default());
    ukf.process_measurement(&MeasurementSample::lidar(0, 4.0, -2.0))
        .unwrap();

    // Small alternating offsets, well inside the 0.15 m sensor noise.
    let offsets = [0.05, -0.04, 0.02, -0.06, 0.03, 0.0, -0.01, 0.04];
    let mut previous = *ukf.covariance().unwrap();
    for (k, offset) in offsets.iter().enumerate() {
        let sample = MeasurementSample::lidar(0, 4.0 + offset, -2.0 - offset);
        let outcome = ukf.process_measurement(&sample).unwrap();
        assert!(outcome.nis().is_some(), "cycle {k} did not correct");

        let p = ukf.covariance().unwrap();
        assert!(p[(PX, PX)] <= previous[(PX, PX)] + 1e-12, "cycle {k}");
        assert!(p[(PY, PY)] <= previous[(PY, PY)] + 1e-12, "cycle {k}");
        previous = *p;
    }
}

#[test]
fn covariance_stays_symmetric_and_positive() {
    let mut ukf = UnscentedKalmanFilter::new(FilterConfig::default());
    ukf.process_measurement(&MeasurementSample::radar(0, 10.0, 0.4, 1.0))
        .unwrap();
    for k in 1..40_i64 {
        let t = k as f64 * 0.05;
        let (px, py) = (10.0 * 0.4_f64.cos() + t, 10.0 * 0.4_f64.sin());
        let sample = if k % 2 == 0 {
            MeasurementSample::lidar(k * 50_000, px, py)
        } else {
            MeasurementSample::radar(k * 50_000, px.hypot(py), py.atan2(px), px / px.hypot(py))
        };
        ukf.process_measurement(&sample).unwrap();
    }

    let p = ukf.covariance().unwrap();
    assert_covariance_approx_eq(p, &p.transpose(), 1e-12);
    assert!(p.cholesky().is_some());
}

// --- End to end ---

#[test]
fn tracks_straight_line_target_with_both_sensors() {
    let (speed, heading) = (5.0_f64, 0.5_f64);
    let truth = |t: f64| (1.0 + speed * heading.cos() * t, 2.0 + speed * heading.sin() * t);

    let mut ukf = UnscentedKalmanFilter::new(FilterConfig::default());
    for k in 0..=200_i64 {
        let t = k as f64 * 0.05;
        let (px, py) = truth(t);
        // Radar first, so the filter starts from a positive speed.
        let sample = if k % 2 == 1 {
            MeasurementSample::lidar(k * 50_000, px, py)
        } else {
            let range = px.hypot(py);
            let range_rate = (px * speed * heading.cos() + py * speed * heading.sin()) / range;
            MeasurementSample::radar(k * 50_000, range, py.atan2(px), range_rate)
        };
        ukf.process_measurement(&sample).unwrap();
    }

    let state = ukf.get_state().unwrap();
    let (px, py) = truth(10.0);
    assert!((state.position().x - px).abs() < 0.3);
    assert!((state.position().y - py).abs() < 0.3);
    assert!((state.speed() - speed).abs() < 0.5, "speed = {}", state.speed());
    assert!(normalize_angle(state.yaw() - heading).abs() < 0.1, "yaw = {}", state.yaw());
}

#[test]
fn estimator_trait_object_resets() {
    let mut estimator: Box<dyn StateEstimator> =
        Box::new(UnscentedKalmanFilter::new(FilterConfig::default()));
    estimator
        .process(&MeasurementSample::lidar(0, 1.0, 1.0))
        .unwrap();
    assert!(estimator.get_state().is_ok());

    estimator.reset();
    assert_eq!(
        estimator.get_state().unwrap_err(),
        FilterError::UninitializedStateAccess
    );
}
