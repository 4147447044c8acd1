use thiserror::Error;

pub type PassportResult<T> = Result<T, PassportError>;

#[derive(Error, Debug)]
pub enum PassportError {
    /// Structural configuration defect (malformed tier table, bad listen
    /// address). Detected at startup; the process must refuse to serve.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("CRM error: {0}")]
    Crm(String),

    #[error("CMS error: {0}")]
    Cms(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
