// SPDX-License-Identifier: Apache-2.0

//! Error types for forgestat.
//!
//! Uses `thiserror` for deriving `std::error::Error` implementations.
//! Only load-bearing failures are errors. Per-repository failures and
//! fallback substitutions are carried as data (see [`crate::model::ItemFailure`]
//! and [`crate::model::DataOrigin`]) and never surface here.

use thiserror::Error;

/// Errors that can occur during forgestat operations.
#[derive(Error, Debug)]
pub enum ForgeError {
    /// Invalid or missing configuration, raised before any network activity.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message.
        message: String,
    },

    /// An upstream call failed (network, HTTP status or unusable body).
    #[error("{provider} API error during {operation}{}: {message}", status_suffix(.status))]
    Upstream {
        /// Provider name (e.g., `github`, `gitlab`).
        provider: String,
        /// Operation that failed (e.g., `load_repositories`).
        operation: String,
        /// HTTP status code, if the server answered.
        status: Option<u16>,
        /// Error message.
        message: String,
    },

    /// The identity could not be resolved to a provider user.
    #[error("User '{identity}' not found on {provider}")]
    UserNotFound {
        /// Provider name.
        provider: String,
        /// Identity (username) that failed to resolve.
        identity: String,
    },

    /// Upstream body could not be decoded into the expected shape.
    #[error("Invalid response from {provider} during {operation}")]
    InvalidResponse {
        /// Provider name.
        provider: String,
        /// Operation that produced the body.
        operation: String,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    /// HTTP client construction error from reqwest.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

#[allow(clippy::ref_option)]
fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

impl ForgeError {
    /// Creates a configuration error from any message.
    pub fn configuration(message: impl Into<String>) -> Self {
        ForgeError::Configuration {
            message: message.into(),
        }
    }

    /// Creates an upstream error without an HTTP status.
    pub fn upstream(
        provider: impl Into<String>,
        operation: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ForgeError::Upstream {
            provider: provider.into(),
            operation: operation.into(),
            status: None,
            message: message.into(),
        }
    }

    /// Returns true for failures caused by the upstream service or transport.
    #[must_use]
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            ForgeError::Upstream { .. } | ForgeError::InvalidResponse { .. } | ForgeError::Network(_)
        )
    }

    /// Returns the HTTP status attached to an upstream failure.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            ForgeError::Upstream { status, .. } => *status,
            ForgeError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<config::ConfigError> for ForgeError {
    fn from(err: config::ConfigError) -> Self {
        ForgeError::Configuration {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_display_includes_status() {
        let err = ForgeError::Upstream {
            provider: "github".to_string(),
            operation: "load_repositories".to_string(),
            status: Some(404),
            message: "Not Found".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "github API error during load_repositories (HTTP 404): Not Found"
        );
        assert_eq!(err.status(), Some(404));
        assert!(err.is_upstream());
    }

    #[test]
    fn upstream_display_without_status() {
        let err = ForgeError::upstream("gitlab", "load_profile", "connection refused");
        assert_eq!(
            err.to_string(),
            "gitlab API error during load_profile: connection refused"
        );
        assert_eq!(err.status(), None);
    }

    #[test]
    fn configuration_is_not_upstream() {
        let err = ForgeError::configuration("username is required");
        assert!(!err.is_upstream());
        assert_eq!(err.to_string(), "Configuration error: username is required");
    }

    #[test]
    fn user_not_found_display() {
        let err = ForgeError::UserNotFound {
            provider: "gitlab".to_string(),
            identity: "ghost".to_string(),
        };
        assert_eq!(err.to_string(), "User 'ghost' not found on gitlab");
        assert!(!err.is_upstream());
    }
}
