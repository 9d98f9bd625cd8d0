//! Error types for talking to the analytics backend.

use thiserror::Error;

/// Everything that can go wrong while loading a page section.
///
/// The four transport/application kinds map one to one onto what the user sees:
/// a network failure, a timeout, a non-2xx status and a `success: false` body.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum AnalyticsError {
    /// Connection refused, DNS failure or any other transport error.
    #[error("network error: {0}")]
    Network(String),

    /// The request exceeded the configured timeout and was aborted.
    #[error("request timed out after {secs}s")]
    Timeout { secs: u64 },

    /// The backend answered with a non-2xx status.
    #[error("HTTP error: status {status}")]
    Http { status: u16 },

    /// The backend answered 200 with `success: false`.
    #[error("{0}")]
    Application(String),

    /// The body was not the JSON shape we expected.
    #[error("invalid response: {0}")]
    Decode(String),

    /// The query was rejected locally before any request was sent.
    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

impl AnalyticsError {
    /// Message for the dismissable error banner.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => "network error, backend may be unreachable".to_string(),
            Self::Timeout { .. } => "request timed out".to_string(),
            Self::Http { status } => format!("request failed with HTTP status {status}"),
            Self::Application(message) => message.clone(),
            Self::Decode(_) => "the server returned data in an unexpected format".to_string(),
            Self::InvalidQuery(reason) => reason.clone(),
        }
    }

    /// Whether the failure happened below the application protocol.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout { .. } | Self::Http { .. })
    }
}

impl From<serde_json::Error> for AnalyticsError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        let err = AnalyticsError::Network("connection refused".to_string());
        assert_eq!(err.user_message(), "network error, backend may be unreachable");

        let err = AnalyticsError::Timeout { secs: 60 };
        assert_eq!(err.user_message(), "request timed out");

        let err = AnalyticsError::Http { status: 502 };
        assert!(err.user_message().contains("502"));

        let err = AnalyticsError::Application("department not found".to_string());
        assert_eq!(err.user_message(), "department not found");
    }

    #[test]
    fn test_transport_classification() {
        assert!(AnalyticsError::Network("dns".to_string()).is_transport());
        assert!(AnalyticsError::Timeout { secs: 1 }.is_transport());
        assert!(AnalyticsError::Http { status: 500 }.is_transport());
        assert!(!AnalyticsError::Application("no".to_string()).is_transport());
        assert!(!AnalyticsError::Decode("eof".to_string()).is_transport());
    }
}
