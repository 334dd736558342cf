use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProjectionError {
    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("No cached {kind} files for seasons {start}-{end} in {dir}")]
    NoSeasonFiles {
        kind: String,
        start: i32,
        end: i32,
        dir: String,
    },

    #[error("Table is empty: {0}")]
    EmptyTable(String),

    #[error("HTML error: {0}")]
    Html(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Regression error: {0}")]
    Regression(String),

    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Excel error: {0}")]
    Excel(#[from] rust_xlsxwriter::XlsxError),
}

pub type Result<T> = std::result::Result<T, ProjectionError>;
