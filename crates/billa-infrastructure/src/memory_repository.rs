//! In-memory repositories.
//!
//! Used when no hosted store is configured and as test doubles.

use async_trait::async_trait;
use billa_core::Result;
use billa_core::group::{GroupDraft, GroupRepository, SavedGroup};
use billa_core::history::{HistoryRecord, HistoryRepository, NewHistoryRecord};
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct InMemoryGroupRepository {
    groups: Mutex<Vec<SavedGroup>>,
}

impl InMemoryGroupRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GroupRepository for InMemoryGroupRepository {
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<SavedGroup>> {
        let groups = self.groups.lock().await;
        let mut owned: Vec<SavedGroup> = groups
            .iter()
            .filter(|group| group.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn find_by_id(&self, group_id: &str) -> Result<Option<SavedGroup>> {
        let groups = self.groups.lock().await;
        Ok(groups.iter().find(|group| group.id == group_id).cloned())
    }

    async fn upsert(&self, draft: &GroupDraft) -> Result<SavedGroup> {
        let mut groups = self.groups.lock().await;
        let existing = draft
            .id
            .as_ref()
            .and_then(|id| groups.iter_mut().find(|group| &group.id == id));
        if let Some(existing) = existing {
            existing.group_name = draft.group_name.clone();
            existing.names = draft.names.clone();
            return Ok(existing.clone());
        }

        let group = SavedGroup {
            id: draft.id.clone().unwrap_or_else(|| Uuid::new_v4().to_string()),
            user_id: draft.user_id.clone(),
            group_name: draft.group_name.clone(),
            names: draft.names.clone(),
            created_at: Utc::now(),
        };
        groups.push(group.clone());
        Ok(group)
    }

    async fn delete(&self, group_id: &str) -> Result<()> {
        self.groups.lock().await.retain(|group| group.id != group_id);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryHistoryRepository {
    records: Mutex<Vec<HistoryRecord>>,
}

impl InMemoryHistoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryRepository for InMemoryHistoryRepository {
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<HistoryRecord>> {
        let records = self.records.lock().await;
        let mut owned: Vec<HistoryRecord> = records
            .iter()
            .filter(|record| record.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn find_by_id(&self, record_id: &str) -> Result<Option<HistoryRecord>> {
        let records = self.records.lock().await;
        Ok(records.iter().find(|record| record.id == record_id).cloned())
    }

    async fn count_for_user(&self, user_id: &str) -> Result<usize> {
        let records = self.records.lock().await;
        Ok(records.iter().filter(|record| record.user_id == user_id).count())
    }

    async fn insert(&self, record: &NewHistoryRecord) -> Result<HistoryRecord> {
        let stored = HistoryRecord {
            id: Uuid::new_v4().to_string(),
            user_id: record.user_id.clone(),
            bill_title: record.bill_title.clone(),
            total_amount: record.total_amount,
            currency: Some(record.currency.clone()),
            data: record.data.clone(),
            reasoning_log: Some(record.reasoning_log.clone()),
            created_at: Utc::now(),
        };
        self.records.lock().await.push(stored.clone());
        Ok(stored)
    }

    async fn delete(&self, record_id: &str) -> Result<()> {
        self.records.lock().await.retain(|record| record.id != record_id);
        Ok(())
    }

    async fn delete_many(&self, record_ids: &[String]) -> Result<()> {
        self.records
            .lock()
            .await
            .retain(|record| !record_ids.contains(&record.id));
        Ok(())
    }

    async fn delete_all_for_user(&self, user_id: &str) -> Result<()> {
        self.records
            .lock()
            .await
            .retain(|record| record.user_id != user_id);
        Ok(())
    }
}
