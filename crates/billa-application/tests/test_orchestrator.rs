use async_trait::async_trait;
use billa_application::{Collaborators, RevisionChat, SessionOrchestrator};
use billa_core::config::SessionSettings;
use billa_core::group::{GroupDraft, GroupRepository, SavedGroup};
use billa_core::history::{
    HistoryPayload, HistoryRecord, HistoryRepository, NewHistoryRecord,
};
use billa_core::receipt::{ReceiptImage, ReceiptItem, ReceiptScanner, ScanResponse};
use billa_core::revision::{RevisionAssistant, RevisionReply, RevisionRequest};
use billa_core::session::{SessionEntry, SessionEvent, SessionPhase};
use billa_core::split::{SplitCalculator, SplitLine, SplitRequest};
use billa_core::user::{AuthProvider, AuthUser, GuestAuthProvider, StaticAuthProvider};
use billa_core::{BillaError, Result};
use billa_infrastructure::{InMemoryGroupRepository, InMemoryHistoryRepository};
use rust_decimal::Decimal;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};

// ============================================================================
// Mock collaborators
// ============================================================================

struct MockScanner {
    responses: Mutex<VecDeque<(Duration, Result<ScanResponse>)>>,
    calls: AtomicUsize,
}

impl MockScanner {
    fn new(responses: Vec<(Duration, Result<ScanResponse>)>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl ReceiptScanner for MockScanner {
    async fn scan(&self, _image: &ReceiptImage) -> Result<ScanResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let (delay, response) = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected scan call");
        tokio::time::sleep(delay).await;
        response
    }
}

struct MockSplitter {
    responses: Mutex<VecDeque<Result<String>>>,
    requests: Mutex<Vec<SplitRequest>>,
}

impl MockSplitter {
    fn new(responses: Vec<Result<String>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl SplitCalculator for MockSplitter {
    async fn split(&self, request: &SplitRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected split call")
    }
}

struct FailingGroupRepository;

#[async_trait]
impl GroupRepository for FailingGroupRepository {
    async fn list_for_user(&self, _user_id: &str) -> Result<Vec<SavedGroup>> {
        Err(BillaError::persistence("store offline"))
    }

    async fn find_by_id(&self, _group_id: &str) -> Result<Option<SavedGroup>> {
        Err(BillaError::persistence("store offline"))
    }

    async fn upsert(&self, _draft: &GroupDraft) -> Result<SavedGroup> {
        Err(BillaError::persistence("store offline"))
    }

    async fn delete(&self, _group_id: &str) -> Result<()> {
        Err(BillaError::persistence("store offline"))
    }
}

struct FailingHistoryRepository;

#[async_trait]
impl HistoryRepository for FailingHistoryRepository {
    async fn list_for_user(&self, _user_id: &str) -> Result<Vec<HistoryRecord>> {
        Err(BillaError::persistence("store offline"))
    }

    async fn find_by_id(&self, _record_id: &str) -> Result<Option<HistoryRecord>> {
        Err(BillaError::persistence("store offline"))
    }

    async fn count_for_user(&self, _user_id: &str) -> Result<usize> {
        Err(BillaError::persistence("store offline"))
    }

    async fn insert(&self, _record: &NewHistoryRecord) -> Result<HistoryRecord> {
        Err(BillaError::persistence("store offline"))
    }

    async fn delete(&self, _record_id: &str) -> Result<()> {
        Err(BillaError::persistence("store offline"))
    }

    async fn delete_many(&self, _record_ids: &[String]) -> Result<()> {
        Err(BillaError::persistence("store offline"))
    }

    async fn delete_all_for_user(&self, _user_id: &str) -> Result<()> {
        Err(BillaError::persistence("store offline"))
    }
}

// ============================================================================
// Fixtures
// ============================================================================

fn item(name: &str, cents: i64) -> ReceiptItem {
    ReceiptItem {
        name: name.to_string(),
        quantity: Decimal::ONE,
        unit_price: Decimal::new(cents, 2),
        total_price: Decimal::new(cents, 2),
    }
}

/// Items totalling 42.50, tax 3.50, total 46.00.
fn dinner_scan() -> ScanResponse {
    ScanResponse {
        items: Some(vec![
            item("Burger", 2500),
            item("Fries", 1000),
            item("Tea", 750),
        ]),
        tax: Decimal::new(350, 2),
        total: Decimal::new(4600, 2),
        currency: Some("RM".to_string()),
    }
}

fn empty_scan() -> ScanResponse {
    ScanResponse {
        items: Some(Vec::new()),
        ..Default::default()
    }
}

fn image() -> ReceiptImage {
    ReceiptImage::new("receipt.jpg", "image/jpeg", vec![1, 2, 3])
}

const SPLIT_TEXT: &str =
    r#"Here you go: [{"name":"Alice","amount":23.00},{"name":"Bob","amount":23.00}] Enjoy!"#;

fn user() -> AuthUser {
    AuthUser {
        id: "u1".to_string(),
        email: Some("alice@example.com".to_string()),
    }
}

struct Harness {
    orchestrator: Arc<SessionOrchestrator>,
    events: UnboundedReceiver<SessionEvent>,
    scanner: Arc<MockScanner>,
    splitter: Arc<MockSplitter>,
}

fn harness(
    scans: Vec<(Duration, Result<ScanResponse>)>,
    splits: Vec<Result<String>>,
    auth: Arc<dyn AuthProvider>,
    groups: Arc<dyn GroupRepository>,
    history: Arc<dyn HistoryRepository>,
    timeout: Duration,
) -> Harness {
    let scanner = MockScanner::new(scans);
    let splitter = MockSplitter::new(splits);
    let (tx, rx) = unbounded_channel();
    let collaborators = Collaborators {
        scanner: scanner.clone(),
        splitter: splitter.clone(),
        auth,
        groups,
        history,
    };
    let orchestrator =
        SessionOrchestrator::new(collaborators, SessionSettings::default(), timeout)
            .with_event_sender(tx);
    Harness {
        orchestrator: Arc::new(orchestrator),
        events: rx,
        scanner,
        splitter,
    }
}

fn guest_harness(
    scans: Vec<(Duration, Result<ScanResponse>)>,
    splits: Vec<Result<String>>,
) -> Harness {
    harness(
        scans,
        splits,
        Arc::new(GuestAuthProvider),
        Arc::new(InMemoryGroupRepository::new()),
        Arc::new(InMemoryHistoryRepository::new()),
        Duration::from_secs(5),
    )
}

fn drain(events: &mut UnboundedReceiver<SessionEvent>) -> Vec<SessionEvent> {
    let mut out = Vec::new();
    while let Ok(event) = events.try_recv() {
        out.push(event);
    }
    out
}

async fn reach_reviewing(orchestrator: &SessionOrchestrator) {
    orchestrator.add_participant("Alice").await.unwrap();
    orchestrator.add_participant("Bob").await.unwrap();
    orchestrator.begin_capture().await.unwrap();
    orchestrator.scan(image()).await.unwrap();
}

// ============================================================================
// Setup and capture
// ============================================================================

#[tokio::test]
async fn begin_capture_with_no_participants_makes_no_calls() {
    let h = guest_harness(Vec::new(), Vec::new());

    let err = h.orchestrator.begin_capture().await.unwrap_err();

    assert!(err.is_validation());
    assert_eq!(h.orchestrator.phase().await, SessionPhase::Setup);
    assert_eq!(h.scanner.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn duplicate_participant_is_rejected() {
    let h = guest_harness(Vec::new(), Vec::new());
    h.orchestrator.add_participant("Alice").await.unwrap();

    assert!(h.orchestrator.add_participant(" Alice ").await.unwrap_err().is_validation());
    assert_eq!(h.orchestrator.snapshot().await.participants().len(), 1);
}

#[tokio::test]
async fn successful_scan_moves_to_reviewing() {
    let mut h = guest_harness(vec![(Duration::ZERO, Ok(dinner_scan()))], Vec::new());

    reach_reviewing(&h.orchestrator).await;

    let session = h.orchestrator.snapshot().await;
    assert_eq!(session.phase(), SessionPhase::Reviewing);
    assert_eq!(session.subtotal(), Some(Decimal::new(4250, 2)));
    assert_eq!(
        drain(&mut h.events),
        vec![
            SessionEvent::PhaseChanged {
                from: SessionPhase::Setup,
                to: SessionPhase::Capturing
            },
            SessionEvent::PhaseChanged {
                from: SessionPhase::Capturing,
                to: SessionPhase::Reviewing
            },
        ]
    );
}

#[tokio::test]
async fn empty_scan_stays_in_capturing_and_can_retry() {
    let h = guest_harness(
        vec![
            (Duration::ZERO, Ok(empty_scan())),
            (Duration::ZERO, Ok(dinner_scan())),
        ],
        Vec::new(),
    );
    h.orchestrator.add_participant("Alice").await.unwrap();
    h.orchestrator.begin_capture().await.unwrap();

    let err = h.orchestrator.scan(image()).await.unwrap_err();
    assert!(matches!(err, BillaError::NoItemsDetected));
    assert_eq!(h.orchestrator.phase().await, SessionPhase::Capturing);

    h.orchestrator.scan(image()).await.unwrap();
    assert_eq!(h.orchestrator.phase().await, SessionPhase::Reviewing);
}

#[tokio::test]
async fn rescan_replaces_earlier_receipt() {
    let mut lunch = dinner_scan();
    lunch.items = Some(vec![item("Laksa", 1200)]);
    lunch.total = Decimal::new(1200, 2);
    let h = guest_harness(
        vec![
            (Duration::ZERO, Ok(dinner_scan())),
            (Duration::ZERO, Ok(lunch)),
        ],
        Vec::new(),
    );
    reach_reviewing(&h.orchestrator).await;

    h.orchestrator.back_to_setup().await.unwrap();
    h.orchestrator.begin_capture().await.unwrap();
    h.orchestrator.scan(image()).await.unwrap();

    let session = h.orchestrator.snapshot().await;
    let data = session.receipt().and_then(|r| r.data()).unwrap();
    assert_eq!(data.items.len(), 1);
    assert_eq!(data.items[0].name, "Laksa");
}

#[tokio::test]
async fn scan_timeout_is_reported_as_transport() {
    let h = harness(
        vec![(Duration::from_millis(500), Ok(dinner_scan()))],
        Vec::new(),
        Arc::new(GuestAuthProvider),
        Arc::new(InMemoryGroupRepository::new()),
        Arc::new(InMemoryHistoryRepository::new()),
        Duration::from_millis(50),
    );
    h.orchestrator.add_participant("Alice").await.unwrap();
    h.orchestrator.begin_capture().await.unwrap();

    let err = h.orchestrator.scan(image()).await.unwrap_err();

    assert!(err.is_transport());
    assert!(err.is_retryable());
    assert_eq!(h.orchestrator.phase().await, SessionPhase::Capturing);
}

#[tokio::test]
async fn newer_scan_supersedes_pending_one() {
    let mut second = dinner_scan();
    second.total = Decimal::new(4250, 2);
    let mut h = guest_harness(
        vec![
            (Duration::from_millis(300), Ok(dinner_scan())),
            (Duration::from_millis(10), Ok(second)),
        ],
        Vec::new(),
    );
    h.orchestrator.add_participant("Alice").await.unwrap();
    h.orchestrator.begin_capture().await.unwrap();
    drain(&mut h.events);

    let first = {
        let orchestrator = Arc::clone(&h.orchestrator);
        tokio::spawn(async move { orchestrator.scan(image()).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    h.orchestrator.scan(image()).await.unwrap();

    let first_result = first.await.unwrap();
    assert!(first_result.unwrap_err().is_superseded());

    let session = h.orchestrator.snapshot().await;
    assert_eq!(session.phase(), SessionPhase::Reviewing);
    assert_eq!(
        session.receipt().and_then(|r| r.data()).map(|d| d.total),
        Some(Decimal::new(4250, 2))
    );
    assert!(drain(&mut h.events).contains(&SessionEvent::ScanSuperseded { attempt: 1 }));
}

#[tokio::test]
async fn cancel_reaches_every_concurrent_scan() {
    let h = guest_harness(
        vec![
            (Duration::from_millis(300), Ok(dinner_scan())),
            (Duration::from_millis(300), Ok(dinner_scan())),
            (Duration::from_millis(300), Ok(dinner_scan())),
        ],
        Vec::new(),
    );
    h.orchestrator.add_participant("Alice").await.unwrap();
    h.orchestrator.begin_capture().await.unwrap();

    let scans: Vec<_> = (0..3)
        .map(|_| {
            let orchestrator = Arc::clone(&h.orchestrator);
            tokio::spawn(async move { orchestrator.scan(image()).await })
        })
        .collect();
    tokio::time::sleep(Duration::from_millis(50)).await;
    h.orchestrator.cancel_pending_scan().await;

    for scan in scans {
        assert!(scan.await.unwrap().unwrap_err().is_superseded());
    }
    assert_eq!(h.orchestrator.phase().await, SessionPhase::Capturing);
}

#[tokio::test]
async fn overflowing_scan_is_rejected_without_panic() {
    let huge = Decimal::from_str_exact("50000000000000000000000000000").unwrap();
    let mut gold = item("Gold", 0);
    gold.total_price = huge;
    let overflowing = ScanResponse {
        items: Some(vec![gold.clone(), gold]),
        ..dinner_scan()
    };
    let h = guest_harness(
        vec![
            (Duration::ZERO, Ok(overflowing)),
            (Duration::ZERO, Ok(dinner_scan())),
        ],
        Vec::new(),
    );
    h.orchestrator.add_participant("Alice").await.unwrap();
    h.orchestrator.begin_capture().await.unwrap();

    let err = h.orchestrator.scan(image()).await.unwrap_err();
    assert!(matches!(err, BillaError::UpstreamFormat(_)));
    assert_eq!(h.orchestrator.phase().await, SessionPhase::Capturing);

    h.orchestrator.scan(image()).await.unwrap();
    assert_eq!(h.orchestrator.phase().await, SessionPhase::Reviewing);
}

// ============================================================================
// Review and settlement
// ============================================================================

#[tokio::test]
async fn tax_toggle_recomputes_displayed_total() {
    let h = guest_harness(vec![(Duration::ZERO, Ok(dinner_scan()))], Vec::new());
    reach_reviewing(&h.orchestrator).await;

    h.orchestrator.set_include_tax(false).await.unwrap();
    assert_eq!(
        h.orchestrator.snapshot().await.displayed_total(),
        Some(Decimal::new(4250, 2))
    );

    h.orchestrator.set_include_tax(true).await.unwrap();
    assert_eq!(
        h.orchestrator.snapshot().await.displayed_total(),
        Some(Decimal::new(4600, 2))
    );
}

#[tokio::test]
async fn guest_split_settles_without_persisting() {
    let history = Arc::new(InMemoryHistoryRepository::new());
    let h = harness(
        vec![(Duration::ZERO, Ok(dinner_scan()))],
        vec![Ok(SPLIT_TEXT.to_string())],
        Arc::new(GuestAuthProvider),
        Arc::new(InMemoryGroupRepository::new()),
        history.clone(),
        Duration::from_secs(5),
    );
    reach_reviewing(&h.orchestrator).await;

    h.orchestrator.compute_split("", false).await.unwrap();
    h.orchestrator.flush_background().await;

    let session = h.orchestrator.snapshot().await;
    assert_eq!(session.phase(), SessionPhase::Settled);
    assert_eq!(
        session.split(),
        &[
            SplitLine::new("Alice", Decimal::from(23)),
            SplitLine::new("Bob", Decimal::from(23)),
        ]
    );
    assert_eq!(session.reasoning_log(), SPLIT_TEXT);

    let request = &h.splitter.requests.lock().unwrap()[0];
    assert_eq!(request.user_instruction, "Split equally");
    assert!(!request.apply_tax);
    assert_eq!(history.count_for_user("u1").await.unwrap(), 0);
}

#[tokio::test]
async fn unparseable_split_keeps_reviewing_state() {
    let h = guest_harness(
        vec![(Duration::ZERO, Ok(dinner_scan()))],
        vec![
            Ok("I could not work that out, sorry.".to_string()),
            Ok(SPLIT_TEXT.to_string()),
        ],
    );
    reach_reviewing(&h.orchestrator).await;

    let err = h
        .orchestrator
        .compute_split("Alice had the burger", true)
        .await
        .unwrap_err();

    assert!(matches!(err, BillaError::UpstreamFormat(_)));
    let session = h.orchestrator.snapshot().await;
    assert_eq!(session.phase(), SessionPhase::Reviewing);
    assert_eq!(session.instruction(), "Alice had the burger");
    assert!(session.receipt().is_some());

    h.orchestrator
        .compute_split("Alice had the burger", true)
        .await
        .unwrap();
    assert_eq!(h.orchestrator.phase().await, SessionPhase::Settled);
}

#[tokio::test]
async fn signed_in_split_writes_history_in_background() {
    let history = Arc::new(InMemoryHistoryRepository::new());
    let mut h = harness(
        vec![(Duration::ZERO, Ok(dinner_scan()))],
        vec![Ok(SPLIT_TEXT.to_string())],
        Arc::new(StaticAuthProvider::new(user())),
        Arc::new(InMemoryGroupRepository::new()),
        history.clone(),
        Duration::from_secs(5),
    );
    reach_reviewing(&h.orchestrator).await;

    h.orchestrator.compute_split("", true).await.unwrap();
    h.orchestrator.flush_background().await;

    let records = history.list_for_user("u1").await.unwrap();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.bill_title, "Session 1");
    assert_eq!(record.total_amount, Decimal::new(4600, 2));
    assert!(matches!(record.data, HistoryPayload::Rich(_)));

    let session = h.orchestrator.snapshot().await;
    assert_eq!(session.history_record_id(), Some(record.id.as_str()));
    assert!(drain(&mut h.events).contains(&SessionEvent::HistorySaved {
        record_id: record.id.clone(),
        bill_title: "Session 1".to_string(),
    }));
}

#[tokio::test]
async fn history_failure_does_not_undo_settlement() {
    let mut h = harness(
        vec![(Duration::ZERO, Ok(dinner_scan()))],
        vec![Ok(SPLIT_TEXT.to_string())],
        Arc::new(StaticAuthProvider::new(user())),
        Arc::new(InMemoryGroupRepository::new()),
        Arc::new(FailingHistoryRepository),
        Duration::from_secs(5),
    );
    reach_reviewing(&h.orchestrator).await;

    h.orchestrator.compute_split("", true).await.unwrap();
    h.orchestrator.flush_background().await;

    assert_eq!(h.orchestrator.phase().await, SessionPhase::Settled);
    let warnings: Vec<SessionEvent> = drain(&mut h.events)
        .into_iter()
        .filter(SessionEvent::is_warning)
        .collect();
    assert!(matches!(
        warnings.as_slice(),
        [SessionEvent::HistorySaveFailed { .. }]
    ));
}

#[tokio::test]
async fn split_timeout_stays_in_reviewing() {
    struct SlowSplitter;

    #[async_trait]
    impl SplitCalculator for SlowSplitter {
        async fn split(&self, _request: &SplitRequest) -> Result<String> {
            tokio::time::sleep(Duration::from_millis(500)).await;
            Ok(SPLIT_TEXT.to_string())
        }
    }

    let collaborators = Collaborators {
        scanner: MockScanner::new(vec![(Duration::ZERO, Ok(dinner_scan()))]),
        splitter: Arc::new(SlowSplitter),
        auth: Arc::new(GuestAuthProvider),
        groups: Arc::new(InMemoryGroupRepository::new()),
        history: Arc::new(InMemoryHistoryRepository::new()),
    };
    let orchestrator = SessionOrchestrator::new(
        collaborators,
        SessionSettings::default(),
        Duration::from_millis(50),
    );
    reach_reviewing(&orchestrator).await;

    let err = orchestrator.compute_split("", true).await.unwrap_err();

    assert!(matches!(err, BillaError::Timeout { .. }));
    assert_eq!(orchestrator.phase().await, SessionPhase::Reviewing);
}

// ============================================================================
// Groups
// ============================================================================

#[tokio::test]
async fn opted_in_group_is_saved_once() {
    let groups = Arc::new(InMemoryGroupRepository::new());
    let h = harness(
        vec![(Duration::ZERO, Ok(dinner_scan()))],
        Vec::new(),
        Arc::new(StaticAuthProvider::new(user())),
        groups.clone(),
        Arc::new(InMemoryHistoryRepository::new()),
        Duration::from_secs(5),
    );
    h.orchestrator.add_participant("Alice").await.unwrap();
    h.orchestrator.add_participant("Bob").await.unwrap();
    h.orchestrator.request_group_save(Some("Flatmates")).await.unwrap();

    h.orchestrator.begin_capture().await.unwrap();
    h.orchestrator.flush_background().await;

    let saved = groups.list_for_user("u1").await.unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].group_name, "Flatmates");

    // Going back and capturing again with the same list does not write again.
    h.orchestrator.back_to_setup().await.unwrap();
    h.orchestrator.begin_capture().await.unwrap();
    h.orchestrator.flush_background().await;
    assert_eq!(groups.list_for_user("u1").await.unwrap().len(), 1);
}

#[tokio::test]
async fn changed_loaded_group_is_updated_in_place() {
    let groups = Arc::new(InMemoryGroupRepository::new());
    let existing = groups
        .upsert(&GroupDraft {
            id: None,
            user_id: "u1".to_string(),
            group_name: "Flatmates".to_string(),
            names: vec!["Alice".to_string(), "Bob".to_string()],
        })
        .await
        .unwrap();
    let h = harness(
        Vec::new(),
        Vec::new(),
        Arc::new(StaticAuthProvider::new(user())),
        groups.clone(),
        Arc::new(InMemoryHistoryRepository::new()),
        Duration::from_secs(5),
    );

    h.orchestrator
        .open(SessionEntry::FromGroup(existing.id.clone()))
        .await
        .unwrap();
    h.orchestrator.add_participant("Carol").await.unwrap();
    h.orchestrator.request_group_save(Some("Flatmates")).await.unwrap();
    h.orchestrator.begin_capture().await.unwrap();
    h.orchestrator.flush_background().await;

    let saved = groups.list_for_user("u1").await.unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].id, existing.id);
    assert_eq!(saved[0].names.len(), 3);
}

#[tokio::test]
async fn group_failure_is_only_a_warning() {
    let mut h = harness(
        Vec::new(),
        Vec::new(),
        Arc::new(StaticAuthProvider::new(user())),
        Arc::new(FailingGroupRepository),
        Arc::new(InMemoryHistoryRepository::new()),
        Duration::from_secs(5),
    );
    h.orchestrator.add_participant("Alice").await.unwrap();
    h.orchestrator.request_group_save(Some("Crew")).await.unwrap();

    h.orchestrator.begin_capture().await.unwrap();
    h.orchestrator.flush_background().await;

    assert_eq!(h.orchestrator.phase().await, SessionPhase::Capturing);
    assert!(drain(&mut h.events)
        .iter()
        .any(|event| matches!(event, SessionEvent::GroupSaveFailed { .. })));
}

#[tokio::test]
async fn unknown_group_cannot_be_opened() {
    let h = guest_harness(Vec::new(), Vec::new());
    let err = h
        .orchestrator
        .open(SessionEntry::FromGroup("missing".to_string()))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

// ============================================================================
// Restore paths and revision
// ============================================================================

fn legacy_record() -> HistoryRecord {
    serde_json::from_value(serde_json::json!({
        "id": "h1",
        "user_id": "u1",
        "bill_title": "Old dinner",
        "total_amount": 30.0,
        "currency": "RM",
        "data": [{"name": "Alice", "amount": 10}, {"name": "Bob", "amount": 20}],
        "reasoning_log": null,
        "created_at": "2024-01-01T00:00:00Z"
    }))
    .unwrap()
}

#[tokio::test]
async fn legacy_history_restores_without_items() {
    let h = guest_harness(Vec::new(), Vec::new());

    h.orchestrator
        .open(SessionEntry::FromHistory(Box::new(legacy_record())))
        .await
        .unwrap();

    let session = h.orchestrator.snapshot().await;
    assert_eq!(session.phase(), SessionPhase::Settled);
    assert!(!session.items_available());
    assert_eq!(session.settled_total(), Decimal::from(30));
    assert!(h.orchestrator.set_include_tax(false).await.unwrap_err().is_validation());
    assert!(h.orchestrator.reopen_review().await.unwrap_err().is_validation());
}

#[tokio::test]
async fn revision_can_be_applied_or_cancelled() {
    let h = guest_harness(Vec::new(), Vec::new());
    h.orchestrator
        .open(SessionEntry::FromHistory(Box::new(legacy_record())))
        .await
        .unwrap();

    let context = h.orchestrator.begin_revision().await.unwrap();
    assert_eq!(context.total, Decimal::from(30));
    assert_eq!(h.orchestrator.phase().await, SessionPhase::Revising);
    h.orchestrator.cancel_revision().await.unwrap();
    assert_eq!(h.orchestrator.snapshot().await.split().len(), 2);

    h.orchestrator.begin_revision().await.unwrap();
    let revised = vec![SplitLine::new("Alice", Decimal::from(30))];
    h.orchestrator
        .apply_revision(revised.clone(), "Alice paid it all".to_string())
        .await
        .unwrap();

    let session = h.orchestrator.snapshot().await;
    assert_eq!(session.phase(), SessionPhase::Settled);
    assert_eq!(session.split(), revised.as_slice());
    assert_eq!(session.reasoning_log(), "Alice paid it all");
}

struct ProposingAssistant;

#[async_trait]
impl RevisionAssistant for ProposingAssistant {
    async fn revise(&self, _request: &RevisionRequest) -> Result<RevisionReply> {
        Ok(RevisionReply {
            reply: "Bob covers the beer.".to_string(),
            splits: Some(vec![
                SplitLine::new("Alice", Decimal::from(5)),
                SplitLine::new("Bob", Decimal::from(25)),
            ]),
        })
    }
}

#[tokio::test]
async fn chat_proposal_applies_to_the_revising_session() {
    let h = guest_harness(Vec::new(), Vec::new());
    h.orchestrator
        .open(SessionEntry::FromHistory(Box::new(legacy_record())))
        .await
        .unwrap();
    let session_id = h.orchestrator.snapshot().await.id().to_string();

    let context = h.orchestrator.begin_revision().await.unwrap();
    let mut chat = RevisionChat::new(Arc::new(ProposingAssistant), context).unwrap();
    chat.send("Bob had the beer").await.unwrap();
    let (lines, reasoning) = chat.latest_proposal().unwrap();
    h.orchestrator
        .apply_revision(lines.to_vec(), reasoning.to_string())
        .await
        .unwrap();

    let session = h.orchestrator.snapshot().await;
    assert_eq!(session.id(), session_id);
    assert_eq!(session.phase(), SessionPhase::Settled);
    assert_eq!(session.split()[1].amount, Decimal::from(25));
    assert_eq!(session.reasoning_log(), "Bob covers the beer.");
    assert_eq!(session.settled_total(), Decimal::from(30));
}

#[tokio::test]
async fn chat_revision_entry_restores_settled_session() {
    let h = guest_harness(Vec::new(), Vec::new());
    h.orchestrator
        .open(SessionEntry::FromHistory(Box::new(legacy_record())))
        .await
        .unwrap();
    let context = h.orchestrator.begin_revision().await.unwrap();
    let result = context.into_result(
        vec![
            SplitLine::new("Alice", Decimal::from(15)),
            SplitLine::new("Bob", Decimal::from(15)),
        ],
        "Even split".to_string(),
    );

    h.orchestrator
        .open(SessionEntry::FromChatRevision(Box::new(result)))
        .await
        .unwrap();

    let session = h.orchestrator.snapshot().await;
    assert_eq!(session.phase(), SessionPhase::Settled);
    assert_eq!(session.reasoning_log(), "Even split");
    assert_eq!(
        h.orchestrator.share_summary().await,
        "*Bill-a Summary (RM)*\n\n👤 *Alice*: RM15.00\n👤 *Bob*: RM15.00\n"
    );
}
