use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid age-band boundaries: {what}")]
    InvalidBoundaries { what: String },

    #[error("Unknown seasonality mode: {0}")]
    UnknownMode(String),
}
