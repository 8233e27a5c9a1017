//! Split computation collaborator.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Request body for the split service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitRequest {
    /// JSON-encoded `ReceiptData`
    pub receipt_data: String,
    pub user_instruction: String,
    pub people_list: Vec<String>,
    pub apply_tax: bool,
}

/// External service that computes who owes what.
#[async_trait]
pub trait SplitCalculator: Send + Sync {
    /// Returns the service's raw `result` text, which embeds the structured split.
    async fn split(&self, request: &SplitRequest) -> Result<String>;
}
