//! ScanApiClient - uploads receipt photos to the scan service.

use crate::http::{endpoint, ensure_success, map_request_error};
use async_trait::async_trait;
use billa_core::config::ApiSettings;
use billa_core::receipt::{ReceiptImage, ReceiptScanner, ScanResponse};
use billa_core::{BillaError, Result};
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use std::time::Duration;

const OPERATION: &str = "scan";

/// Client for `POST {base}/scan` with a multipart `file` field.
#[derive(Clone)]
pub struct ScanApiClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl ScanApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            timeout,
        }
    }

    pub fn from_settings(settings: &ApiSettings) -> Self {
        Self::new(settings.scan_url.clone(), settings.timeout())
    }

    fn build_form(image: &ReceiptImage) -> Result<Form> {
        let part = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.mime_type)
            .map_err(|e| BillaError::validation(format!("Invalid image type '{}': {e}", image.mime_type)))?;
        Ok(Form::new().part("file", part))
    }
}

#[async_trait]
impl ReceiptScanner for ScanApiClient {
    async fn scan(&self, image: &ReceiptImage) -> Result<ScanResponse> {
        let form = Self::build_form(image)?;
        tracing::debug!(
            "[ScanApi] Uploading {} ({} bytes)",
            image.file_name,
            image.bytes.len()
        );

        let response = self
            .client
            .post(endpoint(&self.base_url, "scan"))
            .multipart(form)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| map_request_error(OPERATION, e, self.timeout))?;
        let response = ensure_success(OPERATION, response).await?;

        let parsed: ScanResponse = response.json().await.map_err(|e| {
            BillaError::upstream_format(format!("Failed to parse scan response: {e}"))
        })?;

        tracing::info!(
            "[ScanApi] Scan returned {} item(s)",
            parsed.items.as_ref().map_or(0, Vec::len)
        );
        Ok(parsed)
    }
}
