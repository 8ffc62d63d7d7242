// SPDX-License-Identifier: Apache-2.0

//! CLI-specific error formatting with user-friendly hints.
//!
//! Downcasts `anyhow::Error` to `ForgeError` and appends a hint for the
//! failure category. The library keeps the structured data; wording for a
//! terminal lives here.

use anyhow::Error;
use forgestat_core::ForgeError;

/// Environment variables consulted for a provider's token, in order.
pub fn token_env_hint(provider: &str) -> &'static str {
    if provider == "gitlab" {
        "FORGESTAT_TOKEN or GITLAB_TOKEN"
    } else {
        "FORGESTAT_TOKEN, GH_TOKEN or GITHUB_TOKEN"
    }
}

/// Formats an error for CLI display with helpful hints.
///
/// If the error is not a `ForgeError`, returns the original error message.
pub fn format_error(error: &Error) -> String {
    let Some(forge_err) = error.downcast_ref::<ForgeError>() else {
        return error.to_string();
    };

    match forge_err {
        ForgeError::Configuration { .. } => format!(
            "{forge_err}\n\nTip: Pass --user, or set provider.username in {}",
            forgestat_core::config_file_path().display()
        ),
        ForgeError::UserNotFound { provider, .. } => format!(
            "{forge_err}\n\nTip: Check the spelling, or pass --provider if the account is not on {provider}."
        ),
        ForgeError::Upstream {
            provider, status, ..
        } => match status {
            Some(401) => format!(
                "{forge_err}\n\nTip: The token was rejected. Check {}.",
                token_env_hint(provider)
            ),
            Some(403 | 429) => format!(
                "{forge_err}\n\nTip: You may be rate limited. Set {} to raise the limit, or wait and try again.",
                token_env_hint(provider)
            ),
            Some(404) => format!(
                "{forge_err}\n\nTip: Check the username and repository name (private data needs a token)."
            ),
            Some(_) => format!("{forge_err}\n\nTip: The {provider} API may be unavailable. Try again in a moment."),
            None => format!("{forge_err}\n\nTip: Check your internet connection and --base-url."),
        },
        ForgeError::InvalidResponse { .. } => format!(
            "{forge_err}\n\nTip: The endpoint did not return the expected data. Check --base-url."
        ),
        ForgeError::Network(_) => {
            format!("{forge_err}\n\nTip: Check your internet connection and try again.")
        }
    }
}
