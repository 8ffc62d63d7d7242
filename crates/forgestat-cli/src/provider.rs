// SPDX-License-Identifier: Apache-2.0

//! CLI-specific `TokenProvider` implementation.
//!
//! Resolves forge tokens from environment variables. `FORGESTAT_TOKEN` wins
//! for either provider; otherwise the provider's conventional variables are
//! consulted.

use forgestat_core::{ProviderKind, TokenProvider};
use secrecy::SecretString;
use tracing::debug;

/// Variable checked first for every provider.
const FORGESTAT_TOKEN: &str = "FORGESTAT_TOKEN";

/// CLI implementation of `TokenProvider`.
///
/// Resolves credentials from:
/// - any provider: `FORGESTAT_TOKEN`
/// - GitHub: `GH_TOKEN`, then `GITHUB_TOKEN`
/// - GitLab: `GITLAB_TOKEN`
pub struct CliTokenProvider;

fn provider_vars(kind: ProviderKind) -> &'static [&'static str] {
    match kind {
        ProviderKind::GitHub => &[FORGESTAT_TOKEN, "GH_TOKEN", "GITHUB_TOKEN"],
        ProviderKind::GitLab => &[FORGESTAT_TOKEN, "GITLAB_TOKEN"],
    }
}

impl TokenProvider for CliTokenProvider {
    fn forge_token(&self, kind: ProviderKind) -> Option<SecretString> {
        for var in provider_vars(kind) {
            match std::env::var(var) {
                Ok(token) if !token.trim().is_empty() => {
                    debug!(provider = %kind, source = *var, "Resolved token from environment variable");
                    return Some(SecretString::from(token.trim().to_string()));
                }
                _ => {}
            }
        }
        debug!(provider = %kind, "No token found in environment, requests are unauthenticated");
        None
    }
}
