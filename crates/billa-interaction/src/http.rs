//! Shared request/response handling for the collaborator clients.

use billa_core::BillaError;
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;

/// Joins a base URL and an endpoint path without doubling slashes.
pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Maps a failed send into a timeout or transport error.
pub(crate) fn map_request_error(operation: &str, err: reqwest::Error, timeout: Duration) -> BillaError {
    if err.is_timeout() {
        BillaError::timeout(operation, timeout.as_secs())
    } else {
        BillaError::transport(operation, format!("{operation} request failed: {err}"))
    }
}

/// Passes successful responses through and turns the rest into transport errors.
pub(crate) async fn ensure_success(operation: &str, response: Response) -> Result<Response, BillaError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to read error body".to_string());
    Err(map_http_error(operation, status, body))
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<String>,
}

fn map_http_error(operation: &str, status: StatusCode, body: String) -> BillaError {
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|parsed| {
            parsed.error.or_else(|| {
                parsed.detail.map(|detail| match detail {
                    serde_json::Value::String(text) => text,
                    other => other.to_string(),
                })
            })
        })
        .unwrap_or(body);

    BillaError::http_status(operation, status.as_u16(), format!("{status}: {message}"))
}
