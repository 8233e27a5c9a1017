//! History management for the signed-in user.

use billa_core::history::{HistoryRecord, HistoryRepository, HistoryStats};
use billa_core::session::SessionEntry;
use billa_core::user::{AuthProvider, AuthUser};
use billa_core::{BillaError, Result};
use std::sync::Arc;

/// Lists, inspects and deletes the current user's history records.
///
/// Every operation requires a signed-in user; guests get
/// [`BillaError::Unauthenticated`].
pub struct HistoryService {
    history: Arc<dyn HistoryRepository>,
    auth: Arc<dyn AuthProvider>,
}

impl HistoryService {
    pub fn new(history: Arc<dyn HistoryRepository>, auth: Arc<dyn AuthProvider>) -> Self {
        Self { history, auth }
    }

    /// Records newest first.
    pub async fn list(&self) -> Result<Vec<HistoryRecord>> {
        let user = self.require_user().await?;
        self.history.list_for_user(&user.id).await
    }

    pub async fn get(&self, record_id: &str) -> Result<HistoryRecord> {
        let user = self.require_user().await?;
        self.history
            .find_by_id(record_id)
            .await?
            .filter(|record| record.user_id == user.id)
            .ok_or_else(|| BillaError::not_found("HistoryRecord", record_id))
    }

    /// Entry for restoring a settled session from a record.
    pub async fn resume(&self, record_id: &str) -> Result<SessionEntry> {
        let record = self.get(record_id).await?;
        Ok(SessionEntry::FromHistory(Box::new(record)))
    }

    pub async fn delete(&self, record_id: &str) -> Result<()> {
        self.get(record_id).await?;
        self.history.delete(record_id).await?;
        tracing::info!("[HistoryService] Deleted record {}", record_id);
        Ok(())
    }

    pub async fn delete_many(&self, record_ids: &[String]) -> Result<()> {
        self.require_user().await?;
        self.history.delete_many(record_ids).await?;
        tracing::info!("[HistoryService] Deleted {} record(s)", record_ids.len());
        Ok(())
    }

    pub async fn clear(&self) -> Result<()> {
        let user = self.require_user().await?;
        self.history.delete_all_for_user(&user.id).await?;
        tracing::info!("[HistoryService] Cleared all records");
        Ok(())
    }

    pub async fn stats(&self) -> Result<HistoryStats> {
        let records = self.list().await?;
        Ok(HistoryStats::from_records(&records))
    }

    async fn require_user(&self) -> Result<AuthUser> {
        self.auth
            .current_user()
            .await
            .ok_or_else(|| BillaError::unauthenticated("Sign in to view your history"))
    }
}
