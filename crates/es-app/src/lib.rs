//! Shared application service layer for episweep.
//!
//! This crate provides a unified interface for frontends, centralizing
//! experiment configuration, the ordered pipeline phases (generate ->
//! dispatch -> aggregate -> report), and the indicator-series export.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod report;

// Re-export key types for convenience
pub use config::{
    Experiment, ExecutionConfig, MonitoringConfig, PopulationConfig, SimulatorConfig, SweepConfig,
    TemplateConfig, load_experiment,
};
pub use error::{AppError, AppResult};
pub use pipeline::{PhaseSummary, run_aggregate, run_all, run_dispatch, run_generate, run_report};
