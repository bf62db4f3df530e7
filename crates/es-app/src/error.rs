//! Error types for the es-app service layer.

use std::path::PathBuf;

/// Application error type that wraps errors from the backend crates and
/// provides a unified interface for frontends.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Failed to read experiment file: {path}")]
    ConfigFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse experiment file: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    #[error("Invalid experiment: {0}")]
    Validation(String),

    #[error("Failed to read scenario template: {path}")]
    TemplateFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Scenario error: {0}")]
    Scenario(#[from] es_scenario::ScenarioError),

    #[error("Dispatch error: {0}")]
    Dispatch(#[from] es_dispatch::DispatchError),

    #[error("Results error: {0}")]
    Results(#[from] es_results::ResultsError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<es_core::CoreError> for AppError {
    fn from(err: es_core::CoreError) -> Self {
        AppError::Validation(err.to_string())
    }
}

/// Result type for es-app operations.
pub type AppResult<T> = Result<T, AppError>;
