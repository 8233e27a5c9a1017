pub mod auth_service;
pub mod config_service;
pub mod memory_repository;
pub mod paths;
pub mod receipt_file;
pub mod rest_client;
pub mod rest_group_repository;
pub mod rest_history_repository;

pub use crate::auth_service::{AuthSession, SignUpOutcome, SupabaseAuthService};
pub use crate::config_service::ConfigService;
pub use crate::memory_repository::{InMemoryGroupRepository, InMemoryHistoryRepository};
pub use crate::paths::BillaPaths;
pub use crate::rest_client::{AccessToken, RestClient};
pub use crate::rest_group_repository::RestGroupRepository;
pub use crate::rest_history_repository::RestHistoryRepository;
