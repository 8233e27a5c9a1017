use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted, reusable list of participants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedGroup {
    pub id: String,
    pub user_id: String,
    pub group_name: String,
    pub names: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating or updating a saved group.
///
/// `id: None` inserts a new row, `Some(id)` updates that row in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user_id: String,
    pub group_name: String,
    pub names: Vec<String>,
}
