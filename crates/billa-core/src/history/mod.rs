//! Settled bill history.

mod model;
mod repository;

pub use model::{HistoryPayload, HistoryRecord, HistoryStats, NewHistoryRecord, RichHistoryData};
pub use repository::HistoryRepository;
