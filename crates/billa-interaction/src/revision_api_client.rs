//! RevisionApiClient - conversational split revision.

use crate::http::{endpoint, ensure_success, map_request_error};
use async_trait::async_trait;
use billa_core::config::ApiSettings;
use billa_core::revision::{RevisionAssistant, RevisionReply, RevisionRequest};
use billa_core::{BillaError, Result};
use reqwest::Client;
use std::time::Duration;

const OPERATION: &str = "chat_modify";

/// Client for `POST {chat_base}/chat_modify`.
#[derive(Clone)]
pub struct RevisionApiClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl RevisionApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            timeout,
        }
    }

    pub fn from_settings(settings: &ApiSettings) -> Self {
        Self::new(settings.chat_url.clone(), settings.timeout())
    }
}

#[async_trait]
impl RevisionAssistant for RevisionApiClient {
    async fn revise(&self, request: &RevisionRequest) -> Result<RevisionReply> {
        let response = self
            .client
            .post(endpoint(&self.base_url, "chat_modify"))
            .json(request)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| map_request_error(OPERATION, e, self.timeout))?;
        let response = ensure_success(OPERATION, response).await?;

        response.json::<RevisionReply>().await.map_err(|e| {
            BillaError::upstream_format(format!("Failed to parse chat response: {e}"))
        })
    }
}
