//! Authentication provider abstraction.

use super::model::AuthUser;
use async_trait::async_trait;

/// Source of the current user.
///
/// No user means guest mode: scanning and splitting still work, but nothing
/// is persisted.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn current_user(&self) -> Option<AuthUser>;
}

/// Provider that never has a user, for guest-only setups.
#[derive(Debug, Clone, Default)]
pub struct GuestAuthProvider;

#[async_trait]
impl AuthProvider for GuestAuthProvider {
    async fn current_user(&self) -> Option<AuthUser> {
        None
    }
}

/// Provider with a fixed user, useful when the caller already resolved the session.
#[derive(Debug, Clone)]
pub struct StaticAuthProvider {
    user: AuthUser,
}

impl StaticAuthProvider {
    pub fn new(user: AuthUser) -> Self {
        Self { user }
    }
}

#[async_trait]
impl AuthProvider for StaticAuthProvider {
    async fn current_user(&self) -> Option<AuthUser> {
        Some(self.user.clone())
    }
}
