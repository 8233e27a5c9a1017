//! Session domain module.
//!
//! # Module Structure
//!
//! - `phase`: Wizard phases (`SessionPhase`)
//! - `entry`: Entry-path variants (`SessionEntry`)
//! - `event`: Side-channel notifications (`SessionEvent`)
//! - `model`: The in-memory session and its pure transitions (`BillSession`)

mod entry;
mod event;
mod model;
mod phase;

pub use entry::SessionEntry;
pub use event::SessionEvent;
pub use model::{BillSession, LoadedGroup};
pub use phase::SessionPhase;
