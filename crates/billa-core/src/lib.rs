//! Domain layer for Bill-a.
//!
//! Holds the data model, the pure session state machine, split-result
//! extraction and the traits implemented by the interaction and
//! infrastructure crates.

pub mod config;
pub mod error;
pub mod group;
pub mod history;
pub mod participant;
pub mod receipt;
pub mod revision;
pub mod session;
pub mod split;
pub mod user;

pub use error::{BillaError, ErrorCategory, Result};
