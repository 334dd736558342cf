//! Regression routines: median imputation and ordinary least squares

pub mod impute;
pub mod ols;

pub use impute::{median, MedianImputer};
pub use ols::LinearRegression;

use crate::error::Result;

/// Median imputation followed by OLS, fitted and applied as one unit
#[derive(Debug, Clone, PartialEq)]
pub struct ImputedRegression {
    imputer: MedianImputer,
    model: LinearRegression,
}

impl ImputedRegression {
    pub fn fit(rows: &[Vec<Option<f64>>], target: &[f64], width: usize) -> Result<Self> {
        let imputer = MedianImputer::fit(rows, width)?;
        let filled: Vec<Vec<f64>> = rows.iter().map(|r| imputer.transform(r)).collect();
        let model = LinearRegression::fit(&filled, target)?;
        Ok(Self { imputer, model })
    }

    /// Always yields a number: missing inputs take the training medians
    pub fn predict(&self, row: &[Option<f64>]) -> f64 {
        self.model.predict(&self.imputer.transform(row))
    }

    pub fn model(&self) -> &LinearRegression {
        &self.model
    }
}
