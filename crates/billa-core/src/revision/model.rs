use crate::error::Result;
use crate::receipt::{ReceiptData, ReceiptSnapshot};
use crate::split::SplitLine;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Everything the conversational collaborator needs to revise a settlement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevisionContext {
    /// Original receipt, absent for sessions restored from legacy history.
    pub receipt: Option<ReceiptData>,
    pub currency: String,
    pub people: Vec<String>,
    pub instruction: String,
    pub split: Vec<SplitLine>,
    /// Total the current split was settled under.
    pub total: Decimal,
}

impl RevisionContext {
    /// Encodes the context as the `receipt_data` string sent upstream.
    pub fn to_receipt_data(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Builds the payload a fresh session is restored from once a revised
    /// split has been confirmed.
    pub fn into_result(self, split: Vec<SplitLine>, reasoning: String) -> RevisionResult {
        let receipt = match self.receipt {
            Some(data) => ReceiptSnapshot::Full(data),
            None => ReceiptSnapshot::ItemsUnavailable {
                currency: self.currency,
                total: self.total,
            },
        };
        RevisionResult {
            receipt,
            people: self.people,
            instruction: self.instruction,
            split,
            reasoning,
        }
    }
}

/// Request body for the revision chat service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevisionRequest {
    pub receipt_data: String,
    pub history: Vec<String>,
    pub user_message: String,
}

/// Answer of the revision chat service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevisionReply {
    pub reply: String,
    #[serde(default)]
    pub splits: Option<Vec<SplitLine>>,
}

/// A confirmed revision handed back to a session (chat-restore entry path).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevisionResult {
    pub receipt: ReceiptSnapshot,
    pub people: Vec<String>,
    pub instruction: String,
    pub split: Vec<SplitLine>,
    pub reasoning: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_without_items_restores_as_items_unavailable() {
        let context = RevisionContext {
            receipt: None,
            currency: "RM".to_string(),
            people: vec!["Alice".to_string(), "Bob".to_string()],
            instruction: String::new(),
            split: Vec::new(),
            total: Decimal::from(30),
        };

        let result = context.into_result(
            vec![
                SplitLine::new("Alice", Decimal::from(10)),
                SplitLine::new("Bob", Decimal::from(20)),
            ],
            "Bob had the steak".to_string(),
        );

        assert_eq!(
            result.receipt,
            ReceiptSnapshot::ItemsUnavailable {
                currency: "RM".to_string(),
                total: Decimal::from(30),
            }
        );
        assert_eq!(result.split.len(), 2);
        assert_eq!(result.reasoning, "Bob had the steak");
    }
}
