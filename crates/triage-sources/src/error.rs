//! Error types for triage-sources

use thiserror::Error;

use crate::source_traits::SourceKind;

/// Errors produced while fetching records from a source
#[derive(Error, Debug)]
pub enum SourceError {
    /// Transport-level failure (connection refused, timeout, TLS)
    #[error("HTTP request to {route} failed: {message}")]
    Http { route: String, message: String },

    /// Server answered with a non-success status
    #[error("route {route} returned status {status}")]
    Status { route: String, status: u16 },

    /// Response body could not be decoded into records
    #[error("failed to decode response from {route}: {message}")]
    Decode { route: String, message: String },

    /// Every configured route for a source kind failed
    #[error("all {} routes failed for {kind}: {}", attempts.len(), attempts.join("; "))]
    AllRoutesFailed {
        kind: SourceKind,
        attempts: Vec<String>,
    },

    /// Source deliberately unavailable (fakes, disabled backends)
    #[error("{kind} source unavailable: {reason}")]
    Unavailable { kind: SourceKind, reason: String },

    /// Invalid or unreadable configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for SourceError {
    fn from(err: toml::de::Error) -> Self {
        SourceError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_routes_failed_lists_attempts() {
        let err = SourceError::AllRoutesFailed {
            kind: SourceKind::Reception,
            attempts: vec!["a: 404".to_string(), "b: timeout".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("all 2 routes failed for reception"));
        assert!(msg.contains("a: 404; b: timeout"));
    }

    #[test]
    fn status_error_names_route() {
        let err = SourceError::Status {
            route: "/campagnes/7".to_string(),
            status: 503,
        };
        assert!(err.to_string().contains("/campagnes/7"));
        assert!(err.to_string().contains("503"));
    }
}
