//! SplitApiClient - asks the split service to divide a receipt.

use crate::http::{endpoint, ensure_success, map_request_error};
use async_trait::async_trait;
use billa_core::config::ApiSettings;
use billa_core::split::{SplitCalculator, SplitRequest};
use billa_core::{BillaError, Result};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const OPERATION: &str = "split";

/// Client for `POST {base}/split`.
#[derive(Clone)]
pub struct SplitApiClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

#[derive(Deserialize)]
struct SplitResponse {
    result: Option<String>,
}

impl SplitApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            timeout,
        }
    }

    pub fn from_settings(settings: &ApiSettings) -> Self {
        Self::new(settings.split_url.clone(), settings.timeout())
    }
}

#[async_trait]
impl SplitCalculator for SplitApiClient {
    async fn split(&self, request: &SplitRequest) -> Result<String> {
        tracing::debug!(
            "[SplitApi] Splitting between {} people (apply_tax={})",
            request.people_list.len(),
            request.apply_tax
        );

        let response = self
            .client
            .post(endpoint(&self.base_url, "split"))
            .json(request)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| map_request_error(OPERATION, e, self.timeout))?;
        let response = ensure_success(OPERATION, response).await?;

        let parsed: SplitResponse = response.json().await.map_err(|e| {
            BillaError::upstream_format(format!("Failed to parse split response: {e}"))
        })?;

        parsed
            .result
            .ok_or_else(|| BillaError::upstream_format("Split response has no result text"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> SplitRequest {
        SplitRequest {
            receipt_data: r#"{"items":[],"tax":0,"total":0,"currency":"RM"}"#.to_string(),
            user_instruction: "Split equally".to_string(),
            people_list: vec!["Alice".to_string(), "Bob".to_string()],
            apply_tax: true,
        }
    }

    #[tokio::test]
    async fn sends_expected_body_and_returns_result_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/split"))
            .and(body_json(serde_json::json!({
                "receipt_data": r#"{"items":[],"tax":0,"total":0,"currency":"RM"}"#,
                "user_instruction": "Split equally",
                "people_list": ["Alice", "Bob"],
                "apply_tax": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "result": "Split: [{\"name\": \"Alice\", \"amount\": 5}]"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = SplitApiClient::new(server.uri(), Duration::from_secs(5));
        let text = client.split(&request()).await.unwrap();
        assert!(text.starts_with("Split:"));
    }

    #[tokio::test]
    async fn missing_result_is_upstream_format() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/split"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let client = SplitApiClient::new(server.uri(), Duration::from_secs(5));
        let err = client.split(&request()).await.unwrap_err();
        assert!(matches!(err, BillaError::UpstreamFormat(_)));
    }

    #[tokio::test]
    async fn unreachable_service_is_transport() {
        // Port 9 (discard) on localhost is expected to refuse connections.
        let client = SplitApiClient::new("http://127.0.0.1:9", Duration::from_secs(2));
        let err = client.split(&request()).await.unwrap_err();
        assert!(err.is_transport());
    }
}
