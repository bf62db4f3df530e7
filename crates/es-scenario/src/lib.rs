//! es-scenario: sweep expansion and scenario materialization.
//!
//! Expands a parameter grid (template x EIR x seed x seasonality mode) into
//! concrete simulator input files plus one [`ScenarioSpec`] metadata record
//! per grid point, and persists the metadata table as a CSV checkpoint so the
//! execution and aggregation phases can be re-run independently.

pub mod checkpoint;
pub mod grid;
pub mod template;

pub use checkpoint::{read_checkpoint, write_checkpoint};
pub use es_core::seasonality::SeasonalityMode;
pub use grid::{ScenarioSpec, SweepGrid, TemplateSource, generate_scenarios};
pub use template::{Substitutions, TemplateError, render};

use std::path::PathBuf;

pub type ScenarioResult<T> = Result<T, ScenarioError>;

#[derive(thiserror::Error, Debug)]
pub enum ScenarioError {
    #[error("Template '{template}': {source}")]
    Template {
        template: String,
        source: TemplateError,
    },

    #[error("Failed to write scenario input: {path}")]
    WriteInput {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Corrupt scenario checkpoint: {what}")]
    CorruptCheckpoint { what: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
