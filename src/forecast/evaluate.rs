//! Hold-out evaluation of the per-statistic models on the modeling table

use crate::error::{ProjectionError, Result};
use crate::frame::{float_values, has_column, int_values};
use crate::regression::LinearRegression;
use crate::stats::{next_column, FEATURE_POOL, MODELING_TARGETS, SEASON};
use polars::prelude::DataFrame;
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Time-aware split and minimum sample sizes
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationSettings {
    /// Seasons up to and including this one train; later seasons test
    pub train_max_year: i32,
    pub min_train: usize,
    pub min_test: usize,
}

impl Default for EvaluationSettings {
    fn default() -> Self {
        Self {
            train_max_year: 2022,
            min_train: 100,
            min_test: 50,
        }
    }
}

/// Test-set error of one fitted statistic
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelMetrics {
    pub stat: String,
    pub target: String,
    pub features: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub mae: f64,
    pub rmse: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    Scored(ModelMetrics),
    MissingTarget { stat: String, target: String },
    InsufficientData { stat: String, train_rows: usize, test_rows: usize },
    FitFailed { stat: String, message: String },
}

pub fn mean_absolute_error(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).abs())
        .sum::<f64>()
        / actual.len() as f64
}

pub fn root_mean_squared_error(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let mse = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum::<f64>()
        / actual.len() as f64;
    mse.sqrt()
}

struct Sample {
    season: i64,
    x: Vec<f64>,
    y: f64,
}

fn evaluate_stat(modeling: &DataFrame, stat: &str, features: &[&str], settings: &EvaluationSettings) -> Evaluation {
    let target = next_column(stat);
    let Ok(y) = float_values(modeling, &target) else {
        return Evaluation::MissingTarget {
            stat: stat.to_string(),
            target,
        };
    };
    let seasons = int_values(modeling, SEASON).unwrap_or_else(|_| vec![None; y.len()]);
    let columns: Vec<Vec<Option<f64>>> = features
        .iter()
        .filter_map(|f| float_values(modeling, f).ok())
        .collect();

    // complete rows only: target, season and every feature observed
    let samples: Vec<Sample> = (0..y.len())
        .filter_map(|r| {
            let x = columns
                .iter()
                .map(|c| c[r])
                .collect::<Option<Vec<f64>>>()?;
            Some(Sample {
                season: seasons[r]?,
                x,
                y: y[r]?,
            })
        })
        .collect();

    let (train, test): (Vec<&Sample>, Vec<&Sample>) = samples
        .iter()
        .partition(|s| s.season <= settings.train_max_year as i64);

    if train.len() < settings.min_train || test.len() < settings.min_test {
        return Evaluation::InsufficientData {
            stat: stat.to_string(),
            train_rows: train.len(),
            test_rows: test.len(),
        };
    }

    let x_train: Vec<Vec<f64>> = train.iter().map(|s| s.x.clone()).collect();
    let y_train: Vec<f64> = train.iter().map(|s| s.y).collect();
    let model = match LinearRegression::fit(&x_train, &y_train) {
        Ok(model) => model,
        Err(e) => {
            return Evaluation::FitFailed {
                stat: stat.to_string(),
                message: e.to_string(),
            }
        }
    };

    let actual: Vec<f64> = test.iter().map(|s| s.y).collect();
    let predicted: Vec<f64> = test.iter().map(|s| model.predict(&s.x)).collect();

    Evaluation::Scored(ModelMetrics {
        stat: stat.to_string(),
        target,
        features: columns.len(),
        train_rows: train.len(),
        test_rows: test.len(),
        mae: mean_absolute_error(&actual, &predicted),
        rmse: root_mean_squared_error(&actual, &predicted),
    })
}

/// Fit each target on early seasons and score it on later ones. Targets
/// without a `*_next` column or with too few rows are reported, not fatal.
pub fn evaluate_models(modeling: &DataFrame, settings: &EvaluationSettings) -> Result<Vec<Evaluation>> {
    if !has_column(modeling, SEASON) {
        return Err(ProjectionError::MissingColumn(SEASON.to_string()));
    }

    let features: Vec<&str> = FEATURE_POOL
        .iter()
        .copied()
        .filter(|f| has_column(modeling, f))
        .collect();

    let results: Vec<Evaluation> = MODELING_TARGETS
        .par_iter()
        .map(|stat| evaluate_stat(modeling, stat, &features, settings))
        .collect();

    for result in &results {
        match result {
            Evaluation::Scored(m) => {
                log::info!("{}: MAE {:.2}, RMSE {:.2}", m.stat, m.mae, m.rmse)
            }
            Evaluation::MissingTarget { stat, target } => {
                log::warn!("Skipping {} (missing target {})", stat, target)
            }
            Evaluation::InsufficientData {
                stat,
                train_rows,
                test_rows,
            } => log::warn!(
                "{}: not enough data ({} train, {} test), skipped",
                stat,
                train_rows,
                test_rows
            ),
            Evaluation::FitFailed { stat, message } => {
                log::warn!("{}: {}", stat, message)
            }
        }
    }

    Ok(results)
}

/// Write the scored models as CSV
pub fn write_metrics_csv(metrics: &[ModelMetrics], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut writer = csv::Writer::from_path(path)?;
    for m in metrics {
        writer.serialize(m)?;
    }
    writer.flush()?;
    Ok(())
}
