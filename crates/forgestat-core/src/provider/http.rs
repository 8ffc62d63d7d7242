// SPDX-License-Identifier: Apache-2.0

//! Shared HTTP transport for the provider adapters.
//!
//! Owns the reqwest client (timeout, user agent, `Accept` and auth headers)
//! and maps transport errors, non-success statuses and undecodable bodies
//! into [`ForgeError`].

use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderValue};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::auth::build_headers;
use crate::config::{HttpConfig, ProviderConfig, ProviderKind};
use crate::error::ForgeError;

/// Query parameters for a request.
pub(crate) type Query<'a> = &'a [(&'a str, String)];

/// HTTP transport bound to one provider endpoint.
#[derive(Debug, Clone)]
pub(crate) struct HttpTransport {
    client: Client,
    base: String,
    kind: ProviderKind,
}

impl HttpTransport {
    /// Builds the client with the configured timeout and default headers.
    pub(crate) fn new(config: &ProviderConfig, http: &HttpConfig) -> crate::Result<Self> {
        let mut headers = build_headers(config.kind(), config.credential());
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(Duration::from_secs(http.timeout_seconds))
            .user_agent(http.user_agent.clone())
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base: config.endpoint_base().to_string(),
            kind: config.kind(),
        })
    }

    /// Absolute URL for a path under the endpoint base.
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Sends a GET request and decodes the JSON body.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &str,
        url: &str,
        query: Query<'_>,
    ) -> crate::Result<T> {
        debug!(provider = %self.kind, operation, url, "GET");
        let body = self
            .read_body(operation, self.client.get(url).query(query))
            .await?;
        self.decode(operation, &body)
    }

    /// Sends a JSON POST request and decodes the JSON body.
    pub(crate) async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        operation: &str,
        url: &str,
        payload: &B,
    ) -> crate::Result<T> {
        debug!(provider = %self.kind, operation, url, "POST");
        let body = self
            .read_body(operation, self.client.post(url).json(payload))
            .await?;
        self.decode(operation, &body)
    }

    /// Sends a GET request and returns the body as text.
    pub(crate) async fn get_text(
        &self,
        operation: &str,
        url: &str,
        query: Query<'_>,
    ) -> crate::Result<String> {
        debug!(provider = %self.kind, operation, url, "GET (raw)");
        self.read_body(operation, self.client.get(url).query(query))
            .await
    }

    async fn read_body(&self, operation: &str, request: RequestBuilder) -> crate::Result<String> {
        let response = self.send(operation, request).await?;
        response
            .text()
            .await
            .map_err(|e| self.transport_error(operation, &e))
    }

    async fn send(&self, operation: &str, request: RequestBuilder) -> crate::Result<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| self.transport_error(operation, &e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ForgeError::Upstream {
            provider: self.kind.to_string(),
            operation: operation.to_string(),
            status: Some(status.as_u16()),
            message: upstream_message(status, &body),
        })
    }

    fn decode<T: DeserializeOwned>(&self, operation: &str, body: &str) -> crate::Result<T> {
        serde_json::from_str(body).map_err(|source| ForgeError::InvalidResponse {
            provider: self.kind.to_string(),
            operation: operation.to_string(),
            source,
        })
    }

    fn transport_error(&self, operation: &str, err: &reqwest::Error) -> ForgeError {
        let message = if err.is_timeout() {
            "request timed out".to_string()
        } else {
            err.to_string()
        };
        ForgeError::Upstream {
            provider: self.kind.to_string(),
            operation: operation.to_string(),
            status: err.status().map(|s| s.as_u16()),
            message,
        }
    }
}

/// Extracts the `message` field both providers put in error bodies, falling
/// back to the status reason.
fn upstream_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| match value.get("message") {
            Some(serde_json::Value::String(message)) => Some(message.clone()),
            Some(other) if !other.is_null() => Some(other.to_string()),
            _ => None,
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        })
}
