//! Conversational revision of a settled split.

mod model;
mod service;

pub use model::{RevisionContext, RevisionReply, RevisionRequest, RevisionResult};
pub use service::RevisionAssistant;
