//! Wires configuration into concrete collaborators.

use anyhow::{Result, bail};
use billa_application::{Collaborators, GroupService, HistoryService, SessionOrchestrator};
use billa_core::config::BillaConfig;
use billa_core::group::GroupRepository;
use billa_core::history::HistoryRepository;
use billa_core::revision::RevisionAssistant;
use billa_core::session::SessionEvent;
use billa_core::user::{AuthProvider, GuestAuthProvider};
use billa_infrastructure::{
    BillaPaths, InMemoryGroupRepository, InMemoryHistoryRepository, RestClient,
    RestGroupRepository, RestHistoryRepository, SupabaseAuthService,
};
use billa_interaction::{RevisionApiClient, ScanApiClient, SplitApiClient};
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};

pub struct AppContext {
    pub config: BillaConfig,
    auth_service: Option<Arc<SupabaseAuthService>>,
    collaborators: Collaborators,
    assistant: Arc<dyn RevisionAssistant>,
}

impl AppContext {
    /// Without a configured store everything runs in guest mode with
    /// throwaway in-memory repositories.
    pub fn build(config: BillaConfig, paths: &BillaPaths) -> Result<Self> {
        let (auth_service, auth, groups, history): (
            Option<Arc<SupabaseAuthService>>,
            Arc<dyn AuthProvider>,
            Arc<dyn GroupRepository>,
            Arc<dyn HistoryRepository>,
        ) = if config.store.is_configured() {
            let service = Arc::new(SupabaseAuthService::new(&config.store, paths)?);
            let client = RestClient::new(&config.store, service.access_token());
            let auth: Arc<dyn AuthProvider> = service.clone();
            let groups: Arc<dyn GroupRepository> =
                Arc::new(RestGroupRepository::new(client.clone()));
            let history: Arc<dyn HistoryRepository> = Arc::new(RestHistoryRepository::new(client));
            (Some(service), auth, groups, history)
        } else {
            tracing::info!("[Bootstrap] No store configured, running in guest mode");
            let auth: Arc<dyn AuthProvider> = Arc::new(GuestAuthProvider);
            let groups: Arc<dyn GroupRepository> = Arc::new(InMemoryGroupRepository::new());
            let history: Arc<dyn HistoryRepository> = Arc::new(InMemoryHistoryRepository::new());
            (None, auth, groups, history)
        };

        let collaborators = Collaborators {
            scanner: Arc::new(ScanApiClient::from_settings(&config.api)),
            splitter: Arc::new(SplitApiClient::from_settings(&config.api)),
            auth,
            groups,
            history,
        };
        let assistant = Arc::new(RevisionApiClient::from_settings(&config.api));

        Ok(Self {
            config,
            auth_service,
            collaborators,
            assistant,
        })
    }

    pub fn auth_service(&self) -> Result<&SupabaseAuthService> {
        match &self.auth_service {
            Some(service) => Ok(service.as_ref()),
            None => bail!("No store is configured; set [store] url and anon_key in config.toml"),
        }
    }

    pub fn auth(&self) -> &Arc<dyn AuthProvider> {
        &self.collaborators.auth
    }

    pub fn assistant(&self) -> Arc<dyn RevisionAssistant> {
        Arc::clone(&self.assistant)
    }

    pub fn orchestrator(&self) -> (SessionOrchestrator, UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = unbounded_channel();
        let orchestrator = SessionOrchestrator::new(
            self.collaborators.clone(),
            self.config.session.clone(),
            self.config.api.timeout(),
        )
        .with_event_sender(tx);
        (orchestrator, rx)
    }

    pub fn history_service(&self) -> HistoryService {
        HistoryService::new(
            Arc::clone(&self.collaborators.history),
            Arc::clone(&self.collaborators.auth),
        )
    }

    pub fn group_service(&self) -> GroupService {
        GroupService::new(
            Arc::clone(&self.collaborators.groups),
            Arc::clone(&self.collaborators.auth),
        )
    }
}
