// SPDX-License-Identifier: Apache-2.0

//! In-process mock forge server for integration tests.

#![allow(dead_code)]

use axum::Router;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tokio::net::TcpListener;

use forgestat_core::{HttpConfig, ProviderConfig, ProviderKind};

/// Binds an ephemeral port and returns the listener with its base URL.
///
/// The base URL is needed before the router is built because some payloads
/// embed absolute URLs (e.g. GitHub's `languages_url`).
pub async fn bind() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    (listener, base)
}

/// Serves `router` on `listener` in the background.
pub fn serve(listener: TcpListener, router: Router) {
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
}

/// Upstream error response with a GitHub/GitLab-style `message` body.
pub fn upstream_error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

/// Provider settings pointing at the mock server.
pub fn provider_config(kind: ProviderKind, identity: &str, base: &str) -> ProviderConfig {
    ProviderConfig::builder()
        .kind(kind)
        .identity(identity)
        .credential(secrecy::SecretString::from("test-token".to_string()))
        .endpoint_base(base)
        .build()
        .unwrap()
}

/// HTTP settings with a short timeout.
pub fn http_config() -> HttpConfig {
    HttpConfig {
        timeout_seconds: 5,
        ..HttpConfig::default()
    }
}
