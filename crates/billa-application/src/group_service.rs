//! Saved group management for the signed-in user.

use billa_core::group::{GroupRepository, SavedGroup};
use billa_core::session::SessionEntry;
use billa_core::user::{AuthProvider, AuthUser};
use billa_core::{BillaError, Result};
use std::sync::Arc;

pub struct GroupService {
    groups: Arc<dyn GroupRepository>,
    auth: Arc<dyn AuthProvider>,
}

impl GroupService {
    pub fn new(groups: Arc<dyn GroupRepository>, auth: Arc<dyn AuthProvider>) -> Self {
        Self { groups, auth }
    }

    /// Groups newest first.
    pub async fn list(&self) -> Result<Vec<SavedGroup>> {
        let user = self.require_user().await?;
        self.groups.list_for_user(&user.id).await
    }

    pub async fn get(&self, group_id: &str) -> Result<SavedGroup> {
        let user = self.require_user().await?;
        self.groups
            .find_by_id(group_id)
            .await?
            .filter(|group| group.user_id == user.id)
            .ok_or_else(|| BillaError::not_found("SavedGroup", group_id))
    }

    /// Entry for a new session seeded with the group's participants.
    pub async fn start_session(&self, group_id: &str) -> Result<SessionEntry> {
        let group = self.get(group_id).await?;
        Ok(SessionEntry::FromGroup(group.id))
    }

    pub async fn delete(&self, group_id: &str) -> Result<()> {
        self.get(group_id).await?;
        self.groups.delete(group_id).await?;
        tracing::info!("[GroupService] Deleted group {}", group_id);
        Ok(())
    }

    async fn require_user(&self) -> Result<AuthUser> {
        self.auth
            .current_user()
            .await
            .ok_or_else(|| BillaError::unauthenticated("Sign in to manage saved groups"))
    }
}
