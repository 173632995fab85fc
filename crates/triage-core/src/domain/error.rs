//! Error taxonomy for the triage shell.
//!
//! The engine components are total and never fail; source outages are
//! recovered inside [`TriageService`](crate::service::TriageService). What is
//! left here are genuine caller errors: bad input and report I/O.

use triage_sources::SourceError;

/// Triage errors.
#[derive(Debug, thiserror::Error)]
pub enum TriageError {
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for triage operations.
pub type Result<T> = std::result::Result<T, TriageError>;
