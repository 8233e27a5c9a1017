use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One participant's computed share.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitLine {
    pub name: String,
    pub amount: Decimal,
    /// Free-text description of what this person is paying for, when the
    /// service provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<String>,
}

impl SplitLine {
    pub fn new(name: impl Into<String>, amount: Decimal) -> Self {
        Self {
            name: name.into(),
            amount,
            items: None,
        }
    }
}

/// Parsed result of a split computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitOutcome {
    pub lines: Vec<SplitLine>,
    /// Reasoning text kept verbatim for the settlement log.
    pub reasoning: String,
}

impl SplitOutcome {
    /// Sum of all line amounts. Not checked against the receipt total; upstream
    /// rounding drift is tolerated.
    pub fn total(&self) -> Decimal {
        total_of(&self.lines)
    }
}

/// Sum of line amounts, saturating at `Decimal::MAX`.
///
/// Parsed splits are range-checked, so saturation never shows for them.
pub fn total_of(lines: &[SplitLine]) -> Decimal {
    lines
        .iter()
        .fold(Decimal::ZERO, |acc, line| acc.saturating_add(line.amount))
}
