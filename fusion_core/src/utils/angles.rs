// fusion_core/src/utils/angles.rs

use num_traits::{Float, FloatConst};

/// Wraps an angle in radians into `(-pi, pi]`.
///
/// Non-finite input yields NaN.
pub fn normalize_angle<T: Float + FloatConst>(angle: T) -> T {
    if !angle.is_finite() {
        return T::nan();
    }

    let pi = T::PI();
    let two_pi = pi + pi;

    // `%` keeps the sign of the dividend, so this lands in (-2pi, 2pi).
    let wrapped = angle % two_pi;
    if wrapped > pi {
        wrapped - two_pi
    } else if wrapped <= -pi {
        wrapped + two_pi
    } else {
        wrapped
    }
}

/// Smallest signed rotation taking `from` onto `to`.
pub fn angle_difference<T: Float + FloatConst>(to: T, from: T) -> T {
    normalize_angle(to - from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    #[test]
    fn stays_in_half_open_range() {
        let mut theta = -50.0;
        while theta < 50.0 {
            let wrapped = normalize_angle(theta);
            assert!(wrapped > -PI && wrapped <= PI, "{theta} -> {wrapped}");
            theta += 0.173;
        }
    }

    #[test]
    fn boundaries() {
        assert_abs_diff_eq!(normalize_angle(PI), PI);
        assert_abs_diff_eq!(normalize_angle(-PI), PI);
        assert_abs_diff_eq!(normalize_angle(3.0 * PI - 0.5), PI - 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(normalize_angle(-3.0 * PI + 0.5), -PI + 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(normalize_angle(0.0_f64), 0.0);
    }

    #[test]
    fn invariant_under_full_turns() {
        for &theta in &[0.3, -2.9, 1.7, -0.01, 3.1] {
            let base = normalize_angle(theta);
            for k in -6..=6 {
                let shifted = normalize_angle(theta + 2.0 * PI * k as f64);
                assert_abs_diff_eq!(shifted, base, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn works_for_f32() {
        let wrapped = normalize_angle(7.0_f32);
        assert_abs_diff_eq!(wrapped, 7.0 - 2.0 * std::f32::consts::PI, epsilon = 1e-5);
    }

    #[test]
    fn non_finite_is_nan() {
        assert!(normalize_angle(f64::INFINITY).is_nan());
        assert!(normalize_angle(f64::NAN).is_nan());
    }

    #[test]
    fn difference_takes_short_way_round() {
        let d = angle_difference(-PI + 0.1, PI - 0.1);
        assert_abs_diff_eq!(d, 0.2, epsilon = 1e-12);
    }
}
