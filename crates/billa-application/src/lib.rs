pub mod group_service;
pub mod history_service;
pub mod orchestrator;
pub mod revision_chat;

pub use group_service::GroupService;
pub use history_service::HistoryService;
pub use orchestrator::{Collaborators, SessionOrchestrator};
pub use revision_chat::{ChatMessage, ChatRole, RevisionChat};
