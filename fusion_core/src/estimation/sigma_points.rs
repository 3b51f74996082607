// fusion_core/src/estimation/sigma_points.rs

use crate::config::ProcessNoise;
use crate::error::FilterError;
use crate::state::FilterState;
use crate::types::{
    AugCovariance, AugSigmaPoints, AugStateVector, LAMBDA, NU_A, NU_YAWDD, N_AUG, N_SIGMA, N_X,
};
use crate::utils::angles::{angle_difference, normalize_angle};
use nalgebra::{Cholesky, SMatrix, SVector};
use std::ops::Index;

/// Unscented weights for the 15 sigma points.
///
/// The centre point gets `lambda / (lambda + n_aug)`, every other point
/// `0.5 / (lambda + n_aug)`. They sum to one.
#[derive(Debug, Clone, PartialEq)]
pub struct SigmaWeights {
    weights: SVector<f64, N_SIGMA>,
}

impl SigmaWeights {
    pub fn new() -> Self {
        let spread = LAMBDA + N_AUG as f64;
        let mut weights = SVector::<f64, N_SIGMA>::from_element(0.5 / spread);
        weights[0] = LAMBDA / spread;
        Self { weights }
    }

    pub fn as_vector(&self) -> &SVector<f64, N_SIGMA> {
        &self.weights
    }

    pub fn sum(&self) -> f64 {
        self.weights.sum()
    }
}

impl Default for SigmaWeights {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<usize> for SigmaWeights {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.weights[index]
    }
}

/// Appends the two zero-mean process noise components to the state.
///
/// The state covariance fills the top-left block, `std_a^2` and `std_yawdd^2`
/// the two new diagonal entries. Cross terms are zero.
pub fn augment(state: &FilterState, noise: &ProcessNoise) -> (AugStateVector, AugCovariance) {
    let mut x_aug = AugStateVector::zeros();
    x_aug.fixed_rows_mut::<N_X>(0).copy_from(&state.vector);

    let mut p_aug = AugCovariance::zeros();
    p_aug
        .fixed_view_mut::<N_X, N_X>(0, 0)
        .copy_from(&state.covariance);
    p_aug[(NU_A, NU_A)] = noise.std_a.powi(2);
    p_aug[(NU_YAWDD, NU_YAWDD)] = noise.std_yawdd.powi(2);

    (x_aug, p_aug)
}

/// Generates the `2n+1` augmented sigma points around `mean`.
///
/// Column 0 is the mean, columns `1..=n` add the scaled Cholesky columns and
/// columns `n+1..2n+1` subtract them.
pub fn generate_sigma_points(
    mean: &AugStateVector,
    covariance: &AugCovariance,
) -> Result<AugSigmaPoints, FilterError> {
    if !covariance.iter().all(|v| v.is_finite()) {
        return Err(FilterError::NonPositiveSemiDefiniteCovariance);
    }

    // Cholesky decomposition: P = L * L^T
    let l_matrix = Cholesky::new(*covariance)
        .ok_or(FilterError::NonPositiveSemiDefiniteCovariance)?
        .l();
    let scale = (LAMBDA + N_AUG as f64).sqrt();

    let mut sigma_points = AugSigmaPoints::zeros();
    sigma_points.set_column(0, mean);
    for i in 0..N_AUG {
        let offset = l_matrix.column(i) * scale;
        sigma_points.set_column(i + 1, &(mean + &offset));
        sigma_points.set_column(i + 1 + N_AUG, &(mean - &offset));
    }

    Ok(sigma_points)
}

/// Weighted mean of a set of sigma points.
///
/// Rows listed in `angle_components` are averaged as wrapped deviations from
/// the centre point, then wrapped again, so points straddling +-pi do not pull
/// the mean towards zero.
pub fn weighted_mean<const R: usize>(
    points: &SMatrix<f64, R, N_SIGMA>,
    weights: &SigmaWeights,
    angle_components: &[usize],
) -> SVector<f64, R> {
    let mut mean = points * weights.as_vector();
    for &row in angle_components {
        let reference = points[(row, 0)];
        let offset: f64 = (0..N_SIGMA)
            .map(|i| weights[i] * angle_difference(points[(row, i)], reference))
            .sum();
        mean[row] = normalize_angle(reference + offset);
    }
    mean
}

/// `a - b` with the angle rows wrapped into `(-pi, pi]`.
pub fn residual<const R: usize>(
    a: &SVector<f64, R>,
    b: &SVector<f64, R>,
    angle_components: &[usize],
) -> SVector<f64, R> {
    let mut diff = a - b;
    for &row in angle_components {
        diff[row] = angle_difference(a[row], b[row]);
    }
    diff
}
