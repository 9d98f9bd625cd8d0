//! Session credentials
//!
//! The stored token and user name are injected into the HTTP client through
//! [`SessionProvider`] instead of being read ad hoc wherever a request is built.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use tracing::debug;

pub trait SessionProvider: Send + Sync {
    /// Bearer token for API requests, if signed in.
    fn token(&self) -> Option<String>;

    /// Display name of the signed-in user.
    fn user(&self) -> Option<String>;
}

/// No credentials; requests go out without an `Authorization` header.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnonymousSession;

impl SessionProvider for AnonymousSession {
    fn token(&self) -> Option<String> {
        None
    }

    fn user(&self) -> Option<String> {
        None
    }
}

/// Credentials persisted as `{"token": "...", "username": "..."}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default, alias = "user")]
    pub username: Option<String>,
}

impl StoredSession {
    /// Read the session file (absent file = anonymous), then apply env overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let mut session = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read session file: {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse session file: {}", path.display()))?
        } else {
            debug!(path = %path.display(), "No session file, continuing anonymously");
            Self::default()
        };

        session.apply_env_overrides();
        Ok(session)
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(token) = env::var("HOSPITAL_ANALYTICS_TOKEN") {
            self.token = Some(token);
        }
        if let Ok(user) = env::var("HOSPITAL_ANALYTICS_USER") {
            self.username = Some(user);
        }
    }
}

impl SessionProvider for StoredSession {
    fn token(&self) -> Option<String> {
        self.token.clone().filter(|t| !t.trim().is_empty())
    }

    fn user(&self) -> Option<String> {
        self.username.clone().filter(|u| !u.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_anonymous() {
        let dir = tempdir().unwrap();
        assert!(StoredSession::load(&dir.path().join("session.json")).is_ok());
        assert_eq!(AnonymousSession.token(), None);
    }

    #[test]
    fn test_reads_token_and_user() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, r#"{"token": "abc123", "user": "dr.li"}"#).unwrap();

        let session: StoredSession = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(session.token(), Some("abc123".to_string()));
        assert_eq!(session.user(), Some("dr.li".to_string()));
    }

    #[test]
    fn test_blank_token_is_ignored() {
        let session = StoredSession {
            token: Some("  ".to_string()),
            username: None,
        };
        assert_eq!(session.token(), None);
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "not json").unwrap();
        assert!(StoredSession::load(&path).is_err());
    }
}
