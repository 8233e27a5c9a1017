//! Thin client for the hosted store's PostgREST-style API.

use billa_core::config::StoreSettings;
use billa_core::{BillaError, Result};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Bearer token shared between the auth service and the repositories.
///
/// Empty means requests go out with the anon key only, which row-level
/// access rules treat as no user.
#[derive(Debug, Clone, Default)]
pub struct AccessToken(Arc<RwLock<Option<String>>>);

impl AccessToken {
    pub fn new(token: Option<String>) -> Self {
        Self(Arc::new(RwLock::new(token)))
    }

    pub async fn get(&self) -> Option<String> {
        self.0.read().await.clone()
    }

    pub async fn set(&self, token: Option<String>) {
        *self.0.write().await = token;
    }
}

#[derive(Debug, Clone)]
pub struct RestClient {
    client: Client,
    base_url: String,
    anon_key: String,
    token: AccessToken,
}

impl RestClient {
    pub fn new(settings: &StoreSettings, token: AccessToken) -> Self {
        Self {
            client: Client::new(),
            base_url: settings.url.trim_end_matches('/').to_string(),
            anon_key: settings.anon_key.clone(),
            token,
        }
    }

    /// Starts a request against `/rest/v1/{table}` with auth headers attached.
    pub async fn table(&self, method: Method, table: &str) -> RequestBuilder {
        let url = format!("{}/rest/v1/{}", self.base_url, table);
        let bearer = self
            .token
            .get()
            .await
            .unwrap_or_else(|| self.anon_key.clone());
        self.client
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }

    /// Sends the request and maps failures onto persistence errors.
    pub async fn send(&self, operation: &str, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await.map_err(|e| {
            BillaError::persistence(format!("{operation} failed: {e}"))
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::warn!("[RestClient] {} returned {}: {}", operation, status, body);
        if status == StatusCode::UNAUTHORIZED {
            return Err(BillaError::unauthenticated(format!(
                "{operation} was rejected by the store"
            )));
        }
        Err(BillaError::persistence(format!(
            "{operation} failed with {status}: {body}"
        )))
    }

    /// Sends the request and decodes a JSON array of rows.
    pub async fn fetch_rows<T: DeserializeOwned>(
        &self,
        operation: &str,
        request: RequestBuilder,
    ) -> Result<Vec<T>> {
        let response = self.send(operation, request).await?;
        response.json::<Vec<T>>().await.map_err(|e| {
            BillaError::persistence(format!("{operation} returned unreadable rows: {e}"))
        })
    }

    /// Like [`fetch_rows`](Self::fetch_rows) but expects exactly one row back.
    pub async fn fetch_one<T: DeserializeOwned>(
        &self,
        operation: &str,
        request: RequestBuilder,
    ) -> Result<T> {
        self.fetch_rows(operation, request)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| BillaError::persistence(format!("{operation} returned no row")))
    }
}

/// Extracts the total from a `Content-Range` header such as `0-4/5` or `*/0`.
pub(crate) fn parse_content_range_total(value: &str) -> Option<usize> {
    value.rsplit('/').next()?.trim().parse().ok()
}
