use super::model::{RevisionReply, RevisionRequest};
use crate::error::Result;
use async_trait::async_trait;

/// External conversational service that proposes revised splits.
#[async_trait]
pub trait RevisionAssistant: Send + Sync {
    async fn revise(&self, request: &RevisionRequest) -> Result<RevisionReply>;
}
