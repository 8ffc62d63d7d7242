// SPDX-License-Identifier: Apache-2.0

//! Credential resolution and authentication headers.
//!
//! The `TokenProvider` trait abstracts where tokens come from (environment,
//! keychain, test fixtures). Tokens are passed through verbatim; nothing here
//! refreshes or validates them.

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use tracing::warn;

use crate::config::ProviderKind;

/// Header GitLab uses for personal access tokens.
pub const GITLAB_TOKEN_HEADER: &str = "private-token";

/// Provides access tokens for forge API calls.
///
/// Implementations should return `None` if no token is available.
pub trait TokenProvider: Send + Sync {
    /// Retrieves the token for the given provider.
    fn forge_token(&self, kind: ProviderKind) -> Option<SecretString>;
}

/// Builds the authentication headers for a provider.
///
/// Returns an empty map when the credential is absent or empty. Otherwise the
/// map holds exactly one header, marked sensitive:
/// `Authorization: Bearer <token>` for GitHub and `PRIVATE-TOKEN: <token>`
/// for GitLab. A token that is not a valid header value is dropped.
#[must_use]
pub fn build_headers(kind: ProviderKind, credential: Option<&SecretString>) -> HeaderMap {
    let mut headers = HeaderMap::new();

    let Some(token) = credential.map(ExposeSecret::expose_secret) else {
        return headers;
    };
    if token.is_empty() {
        return headers;
    }

    let (name, value) = match kind {
        ProviderKind::GitHub => (AUTHORIZATION, format!("Bearer {token}")),
        ProviderKind::GitLab => (HeaderName::from_static(GITLAB_TOKEN_HEADER), token.to_string()),
    };

    match HeaderValue::from_str(&value) {
        Ok(mut value) => {
            value.set_sensitive(true);
            headers.insert(name, value);
        }
        Err(_) => {
            warn!(provider = %kind, "Token is not a valid header value, sending unauthenticated");
        }
    }

    headers
}
