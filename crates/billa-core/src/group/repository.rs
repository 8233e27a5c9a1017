//! Saved group repository trait.

use super::model::{GroupDraft, SavedGroup};
use crate::error::Result;
use async_trait::async_trait;

/// Persistence for saved groups, scoped to the owning user.
#[async_trait]
pub trait GroupRepository: Send + Sync {
    /// Lists a user's groups, newest first.
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<SavedGroup>>;

    /// Finds a group by its ID.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(SavedGroup))`: Group found
    /// - `Ok(None)`: Group not found
    /// - `Err(_)`: Error occurred during retrieval
    async fn find_by_id(&self, group_id: &str) -> Result<Option<SavedGroup>>;

    /// Inserts or updates a group, returning the stored row.
    async fn upsert(&self, draft: &GroupDraft) -> Result<SavedGroup>;

    /// Deletes a group (no error if it did not exist).
    async fn delete(&self, group_id: &str) -> Result<()>;
}
