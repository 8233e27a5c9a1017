//! History repository trait.

use super::model::{HistoryRecord, NewHistoryRecord};
use crate::error::Result;
use async_trait::async_trait;

/// Persistence for settled bills, scoped to the owning user.
///
/// Records are immutable once inserted; the only mutation is deletion.
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Lists a user's records, newest first.
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<HistoryRecord>>;

    /// Finds a record by its ID.
    async fn find_by_id(&self, record_id: &str) -> Result<Option<HistoryRecord>>;

    /// Number of records the user currently has.
    async fn count_for_user(&self, user_id: &str) -> Result<usize>;

    /// Inserts a record and returns the stored row.
    async fn insert(&self, record: &NewHistoryRecord) -> Result<HistoryRecord>;

    /// Deletes a single record (no error if it did not exist).
    async fn delete(&self, record_id: &str) -> Result<()>;

    /// Deletes several records at once.
    async fn delete_many(&self, record_ids: &[String]) -> Result<()>;

    /// Deletes every record owned by the user.
    async fn delete_all_for_user(&self, user_id: &str) -> Result<()>;
}
