use super::phase::SessionPhase;
use serde::{Deserialize, Serialize};

/// Side-channel notifications emitted while driving a session.
///
/// Best-effort persistence reports its outcome here instead of through the
/// result of the transition that triggered it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    PhaseChanged {
        from: SessionPhase,
        to: SessionPhase,
    },
    GroupSaved {
        group_id: String,
        group_name: String,
    },
    GroupSaveFailed {
        message: String,
    },
    HistorySaved {
        record_id: String,
        bill_title: String,
    },
    HistorySaveFailed {
        message: String,
    },
    /// A scan result arrived after a newer scan attempt had started and was dropped.
    ScanSuperseded {
        attempt: u64,
    },
}

impl SessionEvent {
    /// True for events that should be surfaced to the user as a warning.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Self::GroupSaveFailed { .. } | Self::HistorySaveFailed { .. }
        )
    }
}
