//! es-results: raw output collection, aggregation, and indicator derivation.
//!
//! Loads every scenario's raw output table (tolerating holes left by failed
//! invocations), joins rows against scenario metadata by id, reduces across
//! the seed and survey dimensions under a fixed, documented step order, and
//! derives the epidemiological indicator series consumed by reporting.

pub mod aggregate;
pub mod indicators;
pub mod load;

pub use aggregate::{AggregatedRow, AggregatedTable, aggregate};
pub use indicators::{AgeWindow, EirValue, SeriesPoint};
pub use load::{LoadSummary, RawMeasurement, RawTable, TaggedMeasurement, collect_raw};

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
