//! Split domain: settlement lines, the split collaborator and result extraction.

mod extract;
mod model;
mod service;

pub use extract::{locate_structured_payload, parse_split_response};
pub use model::{SplitLine, SplitOutcome, total_of};
pub use service::{SplitCalculator, SplitRequest};
