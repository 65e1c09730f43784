use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScoutError {
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Model artifacts missing: {0}")]
    ArtifactsMissing(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Model error: {0}")]
    ModelError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type ScoutResult<T> = Result<T, ScoutError>;
