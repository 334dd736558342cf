use crate::error::{ProjectionError, Result};

/// Median of the values, averaging the two middle values for even counts
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Replaces missing feature values with the per-feature training median
#[derive(Debug, Clone, PartialEq)]
pub struct MedianImputer {
    medians: Vec<f64>,
}

impl MedianImputer {
    /// Learn one median per column. A column with no values at all is an error.
    pub fn fit(rows: &[Vec<Option<f64>>], width: usize) -> Result<Self> {
        let medians = (0..width)
            .map(|j| {
                let present: Vec<f64> = rows.iter().filter_map(|r| r.get(j).copied().flatten()).collect();
                median(&present).ok_or_else(|| {
                    ProjectionError::Regression(format!("feature {} has no observed values", j))
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        Ok(Self { medians })
    }

    pub fn medians(&self) -> &[f64] {
        &self.medians
    }

    pub fn transform(&self, row: &[Option<f64>]) -> Vec<f64> {
        self.medians
            .iter()
            .enumerate()
            .map(|(j, m)| row.get(j).copied().flatten().unwrap_or(*m))
            .collect()
    }
}
