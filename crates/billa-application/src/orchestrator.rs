//! Session orchestrator.
//!
//! Drives one [`BillSession`] through `SETUP → CAPTURING → REVIEWING → SETTLED`
//! (plus the `REVISING` detour) against the external collaborators.
//!
//! # Concurrency
//!
//! - A scan runs without holding the session lock so that a newer scan can
//!   supersede it. Each scan gets an attempt number and a cancellation token;
//!   starting a new scan cancels the previous token and a result whose attempt
//!   is no longer current is dropped.
//! - A split holds the session lock for its whole duration, so no other
//!   transition can interleave with it.
//! - Group and history writes run as background tasks. Their outcome is
//!   reported through [`SessionEvent`]s and never changes the result of the
//!   transition that started them. [`SessionOrchestrator::flush_background`]
//!   waits for them.

use billa_core::config::SessionSettings;
use billa_core::group::{GroupDraft, GroupRepository};
use billa_core::history::{HistoryRecord, HistoryRepository};
use billa_core::receipt::{ReceiptImage, ReceiptScanner};
use billa_core::revision::RevisionContext;
use billa_core::session::{BillSession, SessionEntry, SessionEvent, SessionPhase};
use billa_core::split::{SplitCalculator, SplitLine, parse_split_response};
use billa_core::user::{AuthProvider, AuthUser};
use billa_core::{BillaError, Result};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// External collaborators the orchestrator talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub scanner: Arc<dyn ReceiptScanner>,
    pub splitter: Arc<dyn SplitCalculator>,
    pub auth: Arc<dyn AuthProvider>,
    pub groups: Arc<dyn GroupRepository>,
    pub history: Arc<dyn HistoryRepository>,
}

pub struct SessionOrchestrator {
    collaborators: Collaborators,
    settings: SessionSettings,
    timeout: Duration,
    session: Arc<Mutex<BillSession>>,
    scan_attempt: AtomicU64,
    scan_cancel: Mutex<Option<CancellationToken>>,
    events: Option<UnboundedSender<SessionEvent>>,
    background: Mutex<Vec<JoinHandle<()>>>,
}

impl SessionOrchestrator {
    /// Creates an orchestrator holding a fresh session at `SETUP`.
    pub fn new(collaborators: Collaborators, settings: SessionSettings, timeout: Duration) -> Self {
        let session = BillSession::new(&settings);
        Self {
            collaborators,
            settings,
            timeout,
            session: Arc::new(Mutex::new(session)),
            scan_attempt: AtomicU64::new(0),
            scan_cancel: Mutex::new(None),
            events: None,
            background: Mutex::new(Vec::new()),
        }
    }

    /// Routes side-channel events to `sender`.
    pub fn with_event_sender(mut self, sender: UnboundedSender<SessionEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    // ============================================================================
    // Session lifecycle
    // ============================================================================

    /// Replaces the current session according to `entry`.
    ///
    /// Any scan still in flight for the previous session is cancelled.
    pub async fn open(&self, entry: SessionEntry) -> Result<()> {
        let session = match entry {
            SessionEntry::FreshStart => BillSession::new(&self.settings),
            SessionEntry::FromGroup(group_id) => {
                let group = self
                    .collaborators
                    .groups
                    .find_by_id(&group_id)
                    .await?
                    .ok_or_else(|| BillaError::not_found("SavedGroup", group_id.clone()))?;
                BillSession::from_group(&group, &self.settings)
            }
            SessionEntry::FromHistory(record) => BillSession::from_history(&record, &self.settings),
            SessionEntry::FromChatRevision(result) => {
                BillSession::from_revision(&result, &self.settings)
            }
        };

        self.cancel_pending_scan().await;
        let phase = session.phase();
        tracing::info!("[Orchestrator] Opened session {} at {}", session.id(), phase);
        *self.session.lock().await = session;
        Ok(())
    }

    /// Clone of the current session state.
    pub async fn snapshot(&self) -> BillSession {
        self.session.lock().await.clone()
    }

    pub async fn phase(&self) -> SessionPhase {
        self.session.lock().await.phase()
    }

    // ============================================================================
    // Setup
    // ============================================================================

    pub async fn add_participant(&self, name: &str) -> Result<()> {
        self.session.lock().await.add_participant(name)
    }

    pub async fn remove_participant(&self, name: &str) -> Result<bool> {
        self.session.lock().await.remove_participant(name)
    }

    pub async fn request_group_save(&self, group_name: Option<&str>) -> Result<()> {
        self.session.lock().await.request_group_save(group_name)
    }

    pub async fn set_title(&self, title: Option<&str>) {
        self.session.lock().await.set_title(title);
    }

    /// `SETUP → CAPTURING`.
    ///
    /// When the user opted in and is signed in, the participant list is saved
    /// as a group in the background.
    pub async fn begin_capture(&self) -> Result<()> {
        let mut session = self.session.lock().await;
        let from = session.phase();
        session.begin_capture()?;
        self.emit_phase_change(from, session.phase());

        match self.collaborators.auth.current_user().await {
            Some(user) => {
                if let Some(draft) = session.group_save_plan(&user.id) {
                    self.spawn_group_save(session.id().to_string(), draft).await;
                }
            }
            None if session.group_save_name().is_some() => {
                tracing::debug!("[Orchestrator] Guest mode, skipping group save");
            }
            None => {}
        }
        Ok(())
    }

    pub async fn back_to_setup(&self) -> Result<()> {
        self.cancel_pending_scan().await;
        let mut session = self.session.lock().await;
        let from = session.phase();
        session.back_to_setup()?;
        self.emit_phase_change(from, session.phase());
        Ok(())
    }

    // ============================================================================
    // Capture
    // ============================================================================

    /// `CAPTURING → REVIEWING` by scanning `image`.
    ///
    /// Stays in `CAPTURING` when nothing was detected, on transport failure
    /// and on timeout. Starting another scan supersedes this one, which then
    /// returns [`BillaError::Superseded`].
    pub async fn scan(&self, image: ReceiptImage) -> Result<()> {
        let session_id = {
            let session = self.session.lock().await;
            if session.phase() != SessionPhase::Capturing {
                return Err(BillaError::invalid_phase(SessionPhase::Capturing, session.phase()));
            }
            session.id().to_string()
        };

        // Numbering and token swap happen under one lock so the newest attempt
        // always owns the live token.
        let token = CancellationToken::new();
        let attempt = {
            let mut pending = self.scan_cancel.lock().await;
            let attempt = self.scan_attempt.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some(previous) = pending.replace(token.clone()) {
                previous.cancel();
            }
            attempt
        };
        tracing::debug!("[Orchestrator] Scan attempt {} started", attempt);

        let scanner = Arc::clone(&self.collaborators.scanner);
        let outcome = tokio::select! {
            biased;
            _ = token.cancelled() => None,
            result = self.bounded("scan", scanner.scan(&image)) => Some(result),
        };

        let Some(result) = outcome else {
            return Err(self.superseded_scan(attempt));
        };

        let mut session = self.session.lock().await;
        {
            let mut pending = self.scan_cancel.lock().await;
            if self.scan_attempt.load(Ordering::SeqCst) != attempt || session.id() != session_id {
                return Err(self.superseded_scan(attempt));
            }
            pending.take();
        }

        let response = result.map_err(|e| {
            tracing::warn!("[Orchestrator] Scan attempt {} failed: {}", attempt, e);
            e
        })?;
        let receipt = response
            .into_receipt(&self.settings.default_currency)?
            .ok_or(BillaError::NoItemsDetected)?;

        let from = session.phase();
        session.accept_scan(receipt)?;
        tracing::info!(
            "[Orchestrator] Scan attempt {} accepted ({} items)",
            attempt,
            session.receipt().and_then(|r| r.data()).map_or(0, |d| d.items.len())
        );
        self.emit_phase_change(from, session.phase());
        Ok(())
    }

    /// Cancels interest in any scan still in flight.
    pub async fn cancel_pending_scan(&self) {
        if let Some(token) = self.scan_cancel.lock().await.take() {
            self.scan_attempt.fetch_add(1, Ordering::SeqCst);
            token.cancel();
        }
    }

    // ============================================================================
    // Review and settlement
    // ============================================================================

    pub async fn set_include_tax(&self, include_tax: bool) -> Result<()> {
        self.session.lock().await.set_include_tax(include_tax)
    }

    /// `REVIEWING → SETTLED` by asking the split service.
    ///
    /// The instruction and tax flag are stored before the call so a failed
    /// attempt can be retried as-is. On success a history record is written in
    /// the background for signed-in users.
    pub async fn compute_split(&self, instruction: &str, include_tax: bool) -> Result<()> {
        let mut session = self.session.lock().await;
        if session.phase() != SessionPhase::Reviewing {
            return Err(BillaError::invalid_phase(SessionPhase::Reviewing, session.phase()));
        }
        session.set_instruction(instruction);
        if session.include_tax() != include_tax {
            session.set_include_tax(include_tax)?;
        }
        let request = session.split_request(&self.settings.default_instruction)?;

        tracing::info!(
            "[Orchestrator] Requesting split for {} people",
            request.people_list.len()
        );
        let text = self
            .bounded("split", self.collaborators.splitter.split(&request))
            .await
            .inspect_err(|e| tracing::warn!("[Orchestrator] Split failed: {}", e))?;
        let outcome = parse_split_response(&text)
            .inspect_err(|e| tracing::warn!("[Orchestrator] Split result unusable: {}", e))?;

        let from = session.phase();
        session.settle(outcome)?;
        self.emit_phase_change(from, session.phase());

        match self.collaborators.auth.current_user().await {
            Some(user) => self.spawn_history_save((*session).clone(), user).await,
            None => tracing::debug!("[Orchestrator] Guest mode, skipping history save"),
        }
        Ok(())
    }

    /// `SETTLED → REVIEWING` to split the same receipt again.
    pub async fn reopen_review(&self) -> Result<()> {
        let mut session = self.session.lock().await;
        let from = session.phase();
        session.reopen_review()?;
        self.emit_phase_change(from, session.phase());
        Ok(())
    }

    pub async fn share_summary(&self) -> String {
        self.session.lock().await.share_summary()
    }

    // ============================================================================
    // Revision
    // ============================================================================

    /// `SETTLED → REVISING`, returning the context for a [`RevisionChat`](crate::RevisionChat).
    pub async fn begin_revision(&self) -> Result<RevisionContext> {
        let mut session = self.session.lock().await;
        let from = session.phase();
        let context = session.begin_revision()?;
        self.emit_phase_change(from, session.phase());
        Ok(context)
    }

    /// Confirms a revised split. `REVISING → SETTLED`.
    pub async fn apply_revision(&self, lines: Vec<SplitLine>, reasoning: String) -> Result<()> {
        let mut session = self.session.lock().await;
        let from = session.phase();
        session.apply_revision(lines, reasoning)?;
        self.emit_phase_change(from, session.phase());
        Ok(())
    }

    /// Abandons the revision. `REVISING → SETTLED` with the split unchanged.
    pub async fn cancel_revision(&self) -> Result<()> {
        let mut session = self.session.lock().await;
        let from = session.phase();
        session.cancel_revision()?;
        self.emit_phase_change(from, session.phase());
        Ok(())
    }

    // ============================================================================
    // Background persistence
    // ============================================================================

    /// Waits for every background write started so far.
    pub async fn flush_background(&self) {
        let handles: Vec<JoinHandle<()>> = self.background.lock().await.drain(..).collect();
        for handle in handles {
            if let Err(e) = handle.await {
                tracing::error!("[Orchestrator] Background task panicked: {}", e);
            }
        }
    }

    async fn spawn_group_save(&self, session_id: String, draft: GroupDraft) {
        let groups = Arc::clone(&self.collaborators.groups);
        let session = Arc::clone(&self.session);
        let events = self.events.clone();

        let handle = tokio::spawn(async move {
            match groups.upsert(&draft).await {
                Ok(saved) => {
                    tracing::info!("[Orchestrator] Group '{}' saved", saved.group_name);
                    {
                        let mut session = session.lock().await;
                        if session.id() == session_id {
                            session.mark_group_saved(&saved);
                        }
                    }
                    notify(
                        &events,
                        SessionEvent::GroupSaved {
                            group_id: saved.id,
                            group_name: saved.group_name,
                        },
                    );
                }
                Err(e) => {
                    tracing::warn!("[Orchestrator] Group save failed: {}", e);
                    notify(
                        &events,
                        SessionEvent::GroupSaveFailed {
                            message: e.to_string(),
                        },
                    );
                }
            }
        });
        self.background.lock().await.push(handle);
    }

    async fn spawn_history_save(&self, settled: BillSession, user: AuthUser) {
        let history = Arc::clone(&self.collaborators.history);
        let session = Arc::clone(&self.session);
        let events = self.events.clone();

        let handle = tokio::spawn(async move {
            match insert_history(history.as_ref(), &settled, &user).await {
                Ok(record) => {
                    tracing::info!("[Orchestrator] History record '{}' saved", record.bill_title);
                    {
                        let mut session = session.lock().await;
                        if session.id() == settled.id() {
                            session.record_history_id(&record.id);
                        }
                    }
                    notify(
                        &events,
                        SessionEvent::HistorySaved {
                            record_id: record.id,
                            bill_title: record.bill_title,
                        },
                    );
                }
                Err(e) => {
                    tracing::warn!("[Orchestrator] History save failed: {}", e);
                    notify(
                        &events,
                        SessionEvent::HistorySaveFailed {
                            message: e.to_string(),
                        },
                    );
                }
            }
        });
        self.background.lock().await.push(handle);
    }

    // ============================================================================
    // Helpers
    // ============================================================================

    /// Runs `future` under the collaborator timeout.
    async fn bounded<T, F>(&self, operation: &str, future: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout(self.timeout, future).await {
            Ok(result) => result,
            Err(_) => Err(BillaError::timeout(operation, self.timeout.as_secs())),
        }
    }

    fn superseded_scan(&self, attempt: u64) -> BillaError {
        tracing::debug!("[Orchestrator] Dropping result of superseded scan attempt {}", attempt);
        self.emit(SessionEvent::ScanSuperseded { attempt });
        BillaError::Superseded("scan".to_string())
    }

    fn emit_phase_change(&self, from: SessionPhase, to: SessionPhase) {
        if from != to {
            tracing::debug!("[Orchestrator] {} -> {}", from, to);
            self.emit(SessionEvent::PhaseChanged { from, to });
        }
    }

    fn emit(&self, event: SessionEvent) {
        notify(&self.events, event);
    }
}

fn notify(events: &Option<UnboundedSender<SessionEvent>>, event: SessionEvent) {
    if let Some(sender) = events {
        // A dropped receiver just means nobody is listening.
        let _ = sender.send(event);
    }
}

async fn insert_history(
    history: &dyn HistoryRepository,
    settled: &BillSession,
    user: &AuthUser,
) -> Result<HistoryRecord> {
    let existing = match history.count_for_user(&user.id).await {
        Ok(count) => count,
        Err(e) => {
            tracing::warn!("[Orchestrator] Could not count history records: {}", e);
            0
        }
    };
    let title = settled.history_title(existing);
    let record = settled.history_record(&user.id, title)?;
    history.insert(&record).await
}
