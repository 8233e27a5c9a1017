//! History repository backed by the `bill_history` table.

use crate::rest_client::{RestClient, parse_content_range_total};
use async_trait::async_trait;
use billa_core::history::{HistoryRecord, HistoryRepository, NewHistoryRecord};
use billa_core::{BillaError, Result};
use reqwest::Method;

const TABLE: &str = "bill_history";

#[derive(Debug, Clone)]
pub struct RestHistoryRepository {
    client: RestClient,
}

impl RestHistoryRepository {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HistoryRepository for RestHistoryRepository {
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<HistoryRecord>> {
        let request = self
            .client
            .table(Method::GET, TABLE)
            .await
            .query(&[
                ("select", "*".to_string()),
                ("user_id", format!("eq.{user_id}")),
                ("order", "created_at.desc".to_string()),
            ]);
        let records: Vec<HistoryRecord> = self.client.fetch_rows("list history", request).await?;
        tracing::debug!("[HistoryStore] Loaded {} record(s)", records.len());
        Ok(records)
    }

    async fn find_by_id(&self, record_id: &str) -> Result<Option<HistoryRecord>> {
        let request = self
            .client
            .table(Method::GET, TABLE)
            .await
            .query(&[
                ("select", "*".to_string()),
                ("id", format!("eq.{record_id}")),
                ("limit", "1".to_string()),
            ]);
        let records: Vec<HistoryRecord> = self.client.fetch_rows("get history", request).await?;
        Ok(records.into_iter().next())
    }

    async fn count_for_user(&self, user_id: &str) -> Result<usize> {
        let request = self
            .client
            .table(Method::HEAD, TABLE)
            .await
            .header("Prefer", "count=exact")
            .query(&[("select", "id".to_string()), ("user_id", format!("eq.{user_id}"))]);
        let response = self.client.send("count history", request).await?;

        response
            .headers()
            .get("content-range")
            .and_then(|value| value.to_str().ok())
            .and_then(parse_content_range_total)
            .ok_or_else(|| BillaError::persistence("count history returned no Content-Range total"))
    }

    async fn insert(&self, record: &NewHistoryRecord) -> Result<HistoryRecord> {
        let request = self
            .client
            .table(Method::POST, TABLE)
            .await
            .header("Prefer", "return=representation")
            .json(record);
        let stored: HistoryRecord = self.client.fetch_one("insert history", request).await?;
        tracing::info!("[HistoryStore] Inserted record {}", stored.id);
        Ok(stored)
    }

    async fn delete(&self, record_id: &str) -> Result<()> {
        let request = self
            .client
            .table(Method::DELETE, TABLE)
            .await
            .query(&[("id", format!("eq.{record_id}"))]);
        self.client.send("delete history", request).await?;
        Ok(())
    }

    async fn delete_many(&self, record_ids: &[String]) -> Result<()> {
        if record_ids.is_empty() {
            return Ok(());
        }
        let request = self
            .client
            .table(Method::DELETE, TABLE)
            .await
            .query(&[("id", format!("in.({})", record_ids.join(",")))]);
        self.client.send("delete history", request).await?;
        Ok(())
    }

    async fn delete_all_for_user(&self, user_id: &str) -> Result<()> {
        let request = self
            .client
            .table(Method::DELETE, TABLE)
            .await
            .query(&[("user_id", format!("eq.{user_id}"))]);
        self.client.send("clear history", request).await?;
        tracing::info!("[HistoryStore] Cleared history for user");
        Ok(())
    }
}
