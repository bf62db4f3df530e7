//! es-dispatch: scenario execution against the external simulator.
//!
//! Runs every scenario's input file through the simulator binary and reports
//! per-scenario completion status. Two strategies satisfy the same contract:
//! a bounded local process pool with per-invocation timeouts, and an
//! array-job submission that delegates concurrency to the batch scheduler.
//! Individual scenario failures are recorded, never fatal to the sweep;
//! structural failures (staging, job template, scheduler) abort the phase.

pub mod batch;
pub mod local;
pub mod staging;
pub mod summary;
pub mod task;

pub use batch::{BatchOptions, run_batch};
pub use local::{LocalPoolOptions, run_local};
pub use staging::stage_support_files;
pub use summary::DispatchSummary;
pub use task::{Invocation, TaskOutcome, TaskStatus, plan_invocations};

use std::path::PathBuf;

use es_scenario::TemplateError;

pub type DispatchResult<T> = Result<T, DispatchError>;

#[derive(thiserror::Error, Debug)]
pub enum DispatchError {
    #[error("Failed to stage runtime support file: {path}")]
    Staging {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Job template '{path}': {source}")]
    JobTemplate {
        path: PathBuf,
        source: TemplateError,
    },

    #[error("Failed to read job template: {path}")]
    ReadTemplate {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write dispatch file: {path}")]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Scheduler submission failed: {what}")]
    Scheduler { what: String },

    #[error("Worker pool error: {0}")]
    Pool(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
