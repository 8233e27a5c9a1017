use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a session is in the setup → capture → review → settle wizard.
///
/// `Revising` is a sub-flow of `Settled`: it always returns there, either with
/// replaced split data or unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionPhase {
    Setup,
    Capturing,
    Reviewing,
    Settled,
    Revising,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Setup => "SETUP",
            Self::Capturing => "CAPTURING",
            Self::Reviewing => "REVIEWING",
            Self::Settled => "SETTLED",
            Self::Revising => "REVISING",
        };
        f.write_str(name)
    }
}
