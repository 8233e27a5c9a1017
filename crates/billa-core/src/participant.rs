//! Ordered participant list for a session.

use crate::error::{BillaError, Result};
use serde::{Deserialize, Serialize};

/// The people sharing a bill, in insertion order.
///
/// A person has no identity beyond their display name, so names are unique
/// within the list. Order is kept because it drives the default order of
/// settlement rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantList {
    names: Vec<String>,
}

impl ParticipantList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a list from stored names, dropping blanks and repeated entries.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self::new();
        for name in names {
            // Stored groups may contain duplicates from older clients; keep the first.
            let _ = list.add(name.as_ref());
        }
        list
    }

    /// Adds a participant.
    ///
    /// The name is trimmed first. Empty names and names already present are
    /// rejected with a validation error.
    pub fn add(&mut self, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(BillaError::validation("Participant name cannot be empty"));
        }
        if self.contains(name) {
            return Err(BillaError::validation(format!(
                "Participant '{}' is already in the list",
                name
            )));
        }
        self.names.push(name.to_string());
        Ok(())
    }

    /// Removes a participant by exact name. Returns whether anything was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.names.len();
        self.names.retain(|existing| existing != name);
        self.names.len() != before
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|existing| existing == name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.names
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.names.clone()
    }

    /// True when this list differs (content or order) from `names`.
    pub fn differs_from(&self, names: &[String]) -> bool {
        self.names.as_slice() != names
    }
}
