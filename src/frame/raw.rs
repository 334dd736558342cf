use super::normalize_headers;
use crate::error::Result;
use polars::prelude::*;
use std::path::Path;

/// A table exactly as the source delivered it: one or more header levels
/// (nested headers on the remote page) over untyped text rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub header_levels: Vec<Vec<String>>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(header_levels: Vec<Vec<String>>, rows: Vec<Vec<String>>) -> Self {
        Self {
            header_levels,
            rows,
        }
    }

    /// Number of columns: the widest header level or row
    pub fn width(&self) -> usize {
        self.header_levels
            .iter()
            .chain(self.rows.iter())
            .map(|r| r.len())
            .max()
            .unwrap_or(0)
    }

    /// Read a cached CSV file; its single header line is the only level
    pub fn read_csv(path: &Path) -> Result<RawTable> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(file)
    }

    pub fn from_csv_reader<R: std::io::Read>(reader: R) -> Result<RawTable> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(String::from).collect());
        }

        Ok(RawTable::new(vec![headers], rows))
    }

    /// Text frame under the given labels. Cells are trimmed and blanks are
    /// null; short rows are padded, and rows wider than the labels are cut
    /// with a warning.
    pub fn to_frame(&self, labels: &[String]) -> Result<DataFrame> {
        let names = normalize_headers(labels);
        let width = names.len();

        let mut values: Vec<Vec<Option<String>>> = vec![Vec::with_capacity(self.rows.len()); width];
        for (line, row) in self.rows.iter().enumerate() {
            if row.len() > width && row[width..].iter().any(|v| !v.trim().is_empty()) {
                log::warn!(
                    "Row {} has {} cells but only {} columns; extra cells dropped",
                    line + 1,
                    row.len(),
                    width
                );
            }
            for (idx, column) in values.iter_mut().enumerate() {
                let cell = row
                    .get(idx)
                    .map(|v| v.trim())
                    .filter(|v| !v.is_empty())
                    .map(str::to_string);
                column.push(cell);
            }
        }

        let columns: Vec<Column> = names
            .iter()
            .zip(values)
            .map(|(name, cells)| Column::new(name.as_str().into(), cells))
            .collect();
        Ok(DataFrame::new(columns)?)
    }
}
