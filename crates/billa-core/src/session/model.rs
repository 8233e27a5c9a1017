//! In-memory bill session and its pure state transitions.
//!
//! Nothing here performs I/O. The application layer calls the external
//! collaborators and feeds their results into these transitions.

use super::phase::SessionPhase;
use crate::config::SessionSettings;
use crate::error::{BillaError, Result};
use crate::group::{GroupDraft, SavedGroup};
use crate::history::{HistoryPayload, HistoryRecord, NewHistoryRecord, RichHistoryData};
use crate::participant::ParticipantList;
use crate::receipt::{ReceiptData, ReceiptSnapshot};
use crate::revision::{RevisionContext, RevisionResult};
use crate::split::{SplitLine, SplitOutcome, SplitRequest, total_of};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The saved group a session was seeded from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadedGroup {
    pub id: String,
    pub group_name: String,
    pub original_names: Vec<String>,
}

impl From<&SavedGroup> for LoadedGroup {
    fn from(group: &SavedGroup) -> Self {
        Self {
            id: group.id.clone(),
            group_name: group.group_name.clone(),
            original_names: group.names.clone(),
        }
    }
}

/// One end-to-end bill-splitting interaction, held only in memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillSession {
    id: String,
    phase: SessionPhase,
    participants: ParticipantList,
    loaded_group: Option<LoadedGroup>,
    group_save_name: Option<String>,
    title: Option<String>,
    receipt: Option<ReceiptSnapshot>,
    include_tax: bool,
    instruction: String,
    split: Vec<SplitLine>,
    reasoning_log: String,
    history_record_id: Option<String>,
    default_currency: String,
}

impl BillSession {
    /// Creates an empty session at `SETUP`.
    pub fn new(settings: &SessionSettings) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            phase: SessionPhase::Setup,
            participants: ParticipantList::new(),
            loaded_group: None,
            group_save_name: None,
            title: None,
            receipt: None,
            include_tax: settings.include_tax_by_default,
            instruction: String::new(),
            split: Vec::new(),
            reasoning_log: String::new(),
            history_record_id: None,
            default_currency: settings.default_currency.clone(),
        }
    }

    /// Creates a session at `SETUP` seeded with a saved group's participants.
    pub fn from_group(group: &SavedGroup, settings: &SessionSettings) -> Self {
        let mut session = Self::new(settings);
        session.participants = ParticipantList::from_names(&group.names);
        session.loaded_group = Some(LoadedGroup::from(group));
        session
    }

    /// Rehydrates a settled session from a history record.
    ///
    /// Legacy records yield a receipt without items; re-splitting and tax
    /// toggling stay unavailable for such sessions.
    pub fn from_history(record: &HistoryRecord, settings: &SessionSettings) -> Self {
        let mut session = Self::new(settings);
        session.phase = SessionPhase::Settled;
        session.participants = ParticipantList::from_names(record.people());
        session.receipt = Some(record.receipt_snapshot(&settings.default_currency));
        session.split = record.data.split_lines().to_vec();
        session.reasoning_log = record.reasoning_log.clone().unwrap_or_default();
        session.title = Some(record.bill_title.clone());
        session.history_record_id = Some(record.id.clone());
        if let Some(ReceiptSnapshot::Full(data)) = &session.receipt {
            // Infer the tax flag the record was settled with.
            session.include_tax = data.total == record.total_amount;
        }
        session
    }

    /// Rehydrates a settled session from a confirmed chat revision.
    pub fn from_revision(result: &RevisionResult, settings: &SessionSettings) -> Self {
        let mut session = Self::new(settings);
        session.phase = SessionPhase::Settled;
        session.participants = ParticipantList::from_names(&result.people);
        session.receipt = Some(result.receipt.clone());
        session.instruction = result.instruction.clone();
        session.split = result.split.clone();
        session.reasoning_log = result.reasoning.clone();
        session
    }

    // ============================================================================
    // Accessors
    // ============================================================================

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn participants(&self) -> &ParticipantList {
        &self.participants
    }

    pub fn loaded_group(&self) -> Option<&LoadedGroup> {
        self.loaded_group.as_ref()
    }

    pub fn group_save_name(&self) -> Option<&str> {
        self.group_save_name.as_deref()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn receipt(&self) -> Option<&ReceiptSnapshot> {
        self.receipt.as_ref()
    }

    pub fn include_tax(&self) -> bool {
        self.include_tax
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    pub fn split(&self) -> &[SplitLine] {
        &self.split
    }

    pub fn reasoning_log(&self) -> &str {
        &self.reasoning_log
    }

    pub fn history_record_id(&self) -> Option<&str> {
        self.history_record_id.as_deref()
    }

    pub fn currency(&self) -> &str {
        self.receipt
            .as_ref()
            .map(ReceiptSnapshot::currency)
            .unwrap_or(self.default_currency.as_str())
    }

    /// Item subtotal; `None` when no receipt or items are unavailable.
    pub fn subtotal(&self) -> Option<Decimal> {
        self.receipt.as_ref().and_then(ReceiptSnapshot::subtotal)
    }

    /// Total shown to the user for the current tax flag.
    ///
    /// Recomputed on every call from the receipt and flag.
    pub fn displayed_total(&self) -> Option<Decimal> {
        self.receipt
            .as_ref()
            .and_then(|receipt| receipt.displayed_total(self.include_tax))
    }

    /// Total the settlement is recorded under.
    pub fn settled_total(&self) -> Decimal {
        match &self.receipt {
            Some(ReceiptSnapshot::ItemsUnavailable { total, .. }) => *total,
            Some(ReceiptSnapshot::Full(data)) => data.displayed_total(self.include_tax),
            None => total_of(&self.split),
        }
    }

    /// Whether tax toggling / re-splitting from original items is possible.
    pub fn items_available(&self) -> bool {
        self.receipt.as_ref().is_some_and(ReceiptSnapshot::has_items)
    }

    // ============================================================================
    // Setup
    // ============================================================================

    pub fn add_participant(&mut self, name: &str) -> Result<()> {
        self.expect_phase(SessionPhase::Setup)?;
        self.participants.add(name)
    }

    pub fn remove_participant(&mut self, name: &str) -> Result<bool> {
        self.expect_phase(SessionPhase::Setup)?;
        Ok(self.participants.remove(name))
    }

    /// Opts in (or out, with `None`) to saving the participant list as a group.
    pub fn request_group_save(&mut self, group_name: Option<&str>) -> Result<()> {
        self.expect_phase(SessionPhase::Setup)?;
        match group_name.map(str::trim) {
            Some("") => Err(BillaError::validation("Group name cannot be empty")),
            Some(name) => {
                self.group_save_name = Some(name.to_string());
                Ok(())
            }
            None => {
                self.group_save_name = None;
                Ok(())
            }
        }
    }

    /// Sets an explicit title for the history record.
    pub fn set_title(&mut self, title: Option<&str>) {
        self.title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
    }

    /// `SETUP → CAPTURING`. Requires at least one participant.
    pub fn begin_capture(&mut self) -> Result<()> {
        self.expect_phase(SessionPhase::Setup)?;
        if self.participants.is_empty() {
            return Err(BillaError::validation(
                "Add at least one participant before scanning",
            ));
        }
        self.phase = SessionPhase::Capturing;
        Ok(())
    }

    /// Goes back to setup from capture or review.
    pub fn back_to_setup(&mut self) -> Result<()> {
        match self.phase {
            SessionPhase::Capturing | SessionPhase::Reviewing => {
                self.phase = SessionPhase::Setup;
                Ok(())
            }
            other => Err(BillaError::invalid_phase("CAPTURING or REVIEWING", other)),
        }
    }

    /// The group write `begin_capture` should issue, if any.
    ///
    /// No loaded group inserts a new one. A loaded group is updated in place
    /// when its names or title changed, and left alone otherwise.
    pub fn group_save_plan(&self, user_id: &str) -> Option<GroupDraft> {
        let group_name = self.group_save_name.clone()?;
        let id = match &self.loaded_group {
            Some(loaded) => {
                let unchanged = !self.participants.differs_from(&loaded.original_names)
                    && loaded.group_name == group_name;
                if unchanged {
                    return None;
                }
                Some(loaded.id.clone())
            }
            None => None,
        };
        Some(GroupDraft {
            id,
            user_id: user_id.to_string(),
            group_name,
            names: self.participants.to_vec(),
        })
    }

    /// Records a successful group write so a later capture does not repeat it.
    pub fn mark_group_saved(&mut self, group: &SavedGroup) {
        self.loaded_group = Some(LoadedGroup::from(group));
    }

    // ============================================================================
    // Capture and review
    // ============================================================================

    /// `CAPTURING → REVIEWING` with a freshly scanned receipt.
    ///
    /// Replaces any earlier receipt entirely.
    pub fn accept_scan(&mut self, receipt: ReceiptData) -> Result<()> {
        self.expect_phase(SessionPhase::Capturing)?;
        self.receipt = Some(ReceiptSnapshot::Full(receipt));
        self.phase = SessionPhase::Reviewing;
        Ok(())
    }

    /// Changes the tax flag. Needs original items.
    pub fn set_include_tax(&mut self, include_tax: bool) -> Result<()> {
        match self.phase {
            SessionPhase::Reviewing | SessionPhase::Settled => {}
            other => return Err(BillaError::invalid_phase("REVIEWING or SETTLED", other)),
        }
        if !self.items_available() {
            return Err(BillaError::validation(
                "Receipt items are not available for this session",
            ));
        }
        self.include_tax = include_tax;
        Ok(())
    }

    pub fn set_instruction(&mut self, instruction: &str) {
        self.instruction = instruction.trim().to_string();
    }

    /// Builds the split request for the current receipt and participants.
    pub fn split_request(&self, default_instruction: &str) -> Result<SplitRequest> {
        self.expect_phase(SessionPhase::Reviewing)?;
        let receipt = self
            .receipt
            .as_ref()
            .and_then(ReceiptSnapshot::data)
            .ok_or_else(|| BillaError::validation("No receipt items to split"))?;
        let user_instruction = if self.instruction.is_empty() {
            default_instruction.to_string()
        } else {
            self.instruction.clone()
        };
        Ok(SplitRequest {
            receipt_data: serde_json::to_string(receipt)?,
            user_instruction,
            people_list: self.participants.to_vec(),
            apply_tax: self.include_tax,
        })
    }

    /// `REVIEWING → SETTLED` with a parsed split.
    pub fn settle(&mut self, outcome: SplitOutcome) -> Result<()> {
        self.expect_phase(SessionPhase::Reviewing)?;
        self.split = outcome.lines;
        self.reasoning_log = outcome.reasoning;
        self.phase = SessionPhase::Settled;
        Ok(())
    }

    /// `SETTLED → REVIEWING` to re-split from the original items.
    pub fn reopen_review(&mut self) -> Result<()> {
        self.expect_phase(SessionPhase::Settled)?;
        if !self.items_available() {
            return Err(BillaError::validation(
                "Receipt items are not available for this session",
            ));
        }
        self.phase = SessionPhase::Reviewing;
        Ok(())
    }

    pub fn record_history_id(&mut self, record_id: &str) {
        self.history_record_id = Some(record_id.to_string());
    }

    // ============================================================================
    // Revision
    // ============================================================================

    /// `SETTLED → REVISING`, exporting the context for the revision chat.
    pub fn begin_revision(&mut self) -> Result<RevisionContext> {
        self.expect_phase(SessionPhase::Settled)?;
        let context = self.revision_context();
        self.phase = SessionPhase::Revising;
        Ok(context)
    }

    pub fn revision_context(&self) -> RevisionContext {
        RevisionContext {
            receipt: self
                .receipt
                .as_ref()
                .and_then(ReceiptSnapshot::data)
                .cloned(),
            currency: self.currency().to_string(),
            people: self.participants.to_vec(),
            instruction: self.instruction.clone(),
            split: self.split.clone(),
            total: self.settled_total(),
        }
    }

    /// `REVISING → SETTLED`, replacing the split with the confirmed revision.
    pub fn apply_revision(&mut self, lines: Vec<SplitLine>, reasoning: String) -> Result<()> {
        self.expect_phase(SessionPhase::Revising)?;
        if lines.is_empty() {
            return Err(BillaError::validation("Revision has no split lines"));
        }
        self.split = lines;
        self.reasoning_log = reasoning;
        self.phase = SessionPhase::Settled;
        Ok(())
    }

    /// `REVISING → SETTLED`, leaving the split unchanged.
    pub fn cancel_revision(&mut self) -> Result<()> {
        self.expect_phase(SessionPhase::Revising)?;
        self.phase = SessionPhase::Settled;
        Ok(())
    }

    // ============================================================================
    // Settlement output
    // ============================================================================

    /// Title for the history record.
    ///
    /// Explicit title, then group name, then the user's instruction, then
    /// `"Session N+1"` where N is the user's current record count. The count
    /// is read at insert time, so concurrent sessions may share a label.
    pub fn history_title(&self, existing_records: usize) -> String {
        self.title
            .clone()
            .or_else(|| self.group_save_name.clone())
            .or_else(|| self.loaded_group.as_ref().map(|g| g.group_name.clone()))
            .or_else(|| (!self.instruction.is_empty()).then(|| self.instruction.clone()))
            .unwrap_or_else(|| format!("Session {}", existing_records + 1))
    }

    /// Insert payload for the settled session.
    pub fn history_record(&self, user_id: &str, bill_title: String) -> Result<NewHistoryRecord> {
        self.expect_phase(SessionPhase::Settled)?;
        let data = match self.receipt.as_ref().and_then(ReceiptSnapshot::data) {
            Some(receipt) => HistoryPayload::Rich(RichHistoryData {
                items: receipt.items.clone(),
                people: self.participants.to_vec(),
                split: self.split.clone(),
                tax: Some(receipt.tax),
                total: Some(receipt.total),
            }),
            None => HistoryPayload::Rich(RichHistoryData {
                people: self.participants.to_vec(),
                split: self.split.clone(),
                ..Default::default()
            }),
        };
        Ok(NewHistoryRecord {
            user_id: user_id.to_string(),
            bill_title,
            total_amount: self.settled_total(),
            currency: self.currency().to_string(),
            data,
            reasoning_log: self.reasoning_log.clone(),
        })
    }

    /// Plain-text settlement summary for sharing in a chat app.
    pub fn share_summary(&self) -> String {
        let symbol = self.currency();
        let mut text = format!("*Bill-a Summary ({})*\n\n", symbol);
        for line in &self.split {
            text.push_str(&format!(
                "👤 *{}*: {}{:.2}\n",
                line.name, symbol, line.amount
            ));
        }
        text
    }

    fn expect_phase(&self, expected: SessionPhase) -> Result<()> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(BillaError::invalid_phase(expected, self.phase))
        }
    }
}
