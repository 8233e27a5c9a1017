//! Group repository backed by the `saved_groups` table.

use crate::rest_client::RestClient;
use async_trait::async_trait;
use billa_core::Result;
use billa_core::group::{GroupDraft, GroupRepository, SavedGroup};
use reqwest::Method;
use serde::Serialize;

const TABLE: &str = "saved_groups";

#[derive(Serialize)]
struct GroupChanges<'a> {
    group_name: &'a str,
    names: &'a [String],
}

#[derive(Debug, Clone)]
pub struct RestGroupRepository {
    client: RestClient,
}

impl RestGroupRepository {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl GroupRepository for RestGroupRepository {
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<SavedGroup>> {
        let request = self
            .client
            .table(Method::GET, TABLE)
            .await
            .query(&[
                ("select", "*".to_string()),
                ("user_id", format!("eq.{user_id}")),
                ("order", "created_at.desc".to_string()),
            ]);
        self.client.fetch_rows("list groups", request).await
    }

    async fn find_by_id(&self, group_id: &str) -> Result<Option<SavedGroup>> {
        let request = self
            .client
            .table(Method::GET, TABLE)
            .await
            .query(&[
                ("select", "*".to_string()),
                ("id", format!("eq.{group_id}")),
                ("limit", "1".to_string()),
            ]);
        let groups: Vec<SavedGroup> = self.client.fetch_rows("get group", request).await?;
        Ok(groups.into_iter().next())
    }

    async fn upsert(&self, draft: &GroupDraft) -> Result<SavedGroup> {
        let request = match &draft.id {
            Some(id) => self
                .client
                .table(Method::PATCH, TABLE)
                .await
                .query(&[("id", format!("eq.{id}"))])
                .json(&GroupChanges {
                    group_name: &draft.group_name,
                    names: &draft.names,
                }),
            None => self.client.table(Method::POST, TABLE).await.json(draft),
        };
        let request = request.header("Prefer", "return=representation");

        let stored: SavedGroup = self.client.fetch_one("save group", request).await?;
        tracing::info!(
            "[GroupStore] Saved group '{}' ({} names)",
            stored.group_name,
            stored.names.len()
        );
        Ok(stored)
    }

    async fn delete(&self, group_id: &str) -> Result<()> {
        let request = self
            .client
            .table(Method::DELETE, TABLE)
            .await
            .query(&[("id", format!("eq.{group_id}"))]);
        self.client.send("delete group", request).await?;
        Ok(())
    }
}
