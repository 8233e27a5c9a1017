//! Saved groups of participants.

mod model;
mod repository;

pub use model::{GroupDraft, SavedGroup};
pub use repository::GroupRepository;
