//! Ordinary least squares with an intercept
//!
//! The centred design matrix is reduced with Householder reflections and
//! column pivoting. Columns that are (numerically) linear combinations of
//! the columns already chosen get a zero coefficient, so constant or
//! duplicated features never make the fit fail.

use crate::error::{ProjectionError, Result};

/// Columns whose remaining norm falls below this fraction of the largest
/// column norm are treated as dependent.
const RANK_TOLERANCE: f64 = 1e-10;

/// A fitted linear model `y = intercept + coefficients · x`
#[derive(Debug, Clone, PartialEq)]
pub struct LinearRegression {
    intercept: f64,
    coefficients: Vec<f64>,
}

impl LinearRegression {
    /// Fit on row-major features. Every row must have the same width.
    pub fn fit(features: &[Vec<f64>], target: &[f64]) -> Result<Self> {
        let n = features.len();
        if n == 0 {
            return Err(ProjectionError::Regression("no training rows".to_string()));
        }
        if n != target.len() {
            return Err(ProjectionError::Regression(format!(
                "{} feature rows but {} targets",
                n,
                target.len()
            )));
        }
        let p = features[0].len();
        if let Some(row) = features.iter().find(|r| r.len() != p) {
            return Err(ProjectionError::Regression(format!(
                "ragged feature rows ({} vs {} columns)",
                row.len(),
                p
            )));
        }

        let x_mean: Vec<f64> = (0..p)
            .map(|j| features.iter().map(|r| r[j]).sum::<f64>() / n as f64)
            .collect();
        let y_mean = target.iter().sum::<f64>() / n as f64;

        // column-major, centred
        let mut columns: Vec<Vec<f64>> = (0..p)
            .map(|j| features.iter().map(|r| r[j] - x_mean[j]).collect())
            .collect();
        let mut rhs: Vec<f64> = target.iter().map(|y| y - y_mean).collect();

        let coefficients = solve_least_squares(&mut columns, &mut rhs);
        let intercept = y_mean - dot(&coefficients, &x_mean);

        Ok(Self {
            intercept,
            coefficients,
        })
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn predict(&self, row: &[f64]) -> f64 {
        self.intercept + dot(&self.coefficients, row)
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn norm(v: &[f64]) -> f64 {
    dot(v, v).sqrt()
}

/// Minimise |A z - b| in place. `columns` holds A column by column and is
/// overwritten with R; `rhs` is overwritten with Qᵀb.
fn solve_least_squares(columns: &mut [Vec<f64>], rhs: &mut [f64]) -> Vec<f64> {
    let p = columns.len();
    let n = rhs.len();

    let max_norm = columns.iter().map(|c| norm(c)).fold(0.0, f64::max);
    let tolerance = max_norm * RANK_TOLERANCE;

    let mut order: Vec<usize> = (0..p).collect();
    let mut rank = 0;

    for k in 0..p.min(n) {
        let (pivot, pivot_norm) = (k..p)
            .map(|j| (j, norm(&columns[j][k..])))
            .fold((k, -1.0), |best, cand| if cand.1 > best.1 { cand } else { best });

        if pivot_norm <= tolerance {
            break;
        }
        columns.swap(k, pivot);
        order.swap(k, pivot);

        let alpha = if columns[k][k] > 0.0 { -pivot_norm } else { pivot_norm };
        let mut v: Vec<f64> = columns[k][k..].to_vec();
        v[0] -= alpha;
        let v_sq = dot(&v, &v);
        if v_sq == 0.0 {
            rank += 1;
            continue;
        }

        for column in columns[k..].iter_mut() {
            reflect(&v, v_sq, &mut column[k..]);
        }
        reflect(&v, v_sq, &mut rhs[k..]);
        rank += 1;
    }

    let mut z = vec![0.0; p];
    for i in (0..rank).rev() {
        let mut s = rhs[i];
        for j in (i + 1)..rank {
            s -= columns[j][i] * z[j];
        }
        z[i] = s / columns[i][i];
    }

    let mut coefficients = vec![0.0; p];
    for (k, &original) in order.iter().enumerate() {
        coefficients[original] = z[k];
    }
    coefficients
}

/// Apply H = I - 2vvᵀ/(vᵀv) to `x`
fn reflect(v: &[f64], v_sq: f64, x: &mut [f64]) {
    let scale = 2.0 * dot(v, x) / v_sq;
    for (xi, vi) in x.iter_mut().zip(v) {
        *xi -= scale * vi;
    }
}
