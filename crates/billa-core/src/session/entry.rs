use crate::history::HistoryRecord;
use crate::revision::RevisionResult;

/// How a session is initialized.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEntry {
    /// Empty participant list, starting at setup.
    FreshStart,
    /// Participants seeded from a saved group (by id), starting at setup.
    FromGroup(String),
    /// Settled session rehydrated from a history record.
    FromHistory(Box<HistoryRecord>),
    /// Settled session rehydrated from a confirmed chat revision.
    FromChatRevision(Box<RevisionResult>),
}
