pub mod config;
pub mod dashboard;
pub mod error;
pub mod etl;
pub mod fetch;
pub mod forecast;
pub mod frame;
pub mod regression;
pub mod stats;

pub use config::{DataLayout, SeasonRange, TableKind};
pub use error::{ProjectionError, Result};
pub use frame::RawTable;
