use crate::receipt::{ReceiptData, ReceiptItem, ReceiptSnapshot, checked_sum};
use crate::split::SplitLine;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Stored `data` column of a history record.
///
/// Early clients wrote the bare split array; current ones write an object that
/// also keeps the items and participants so the session can be resumed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HistoryPayload {
    Legacy(Vec<SplitLine>),
    Rich(RichHistoryData),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RichHistoryData {
    #[serde(default)]
    pub items: Vec<ReceiptItem>,
    #[serde(default)]
    pub people: Vec<String>,
    #[serde(default, alias = "splits")]
    pub split: Vec<SplitLine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<Decimal>,
}

impl HistoryPayload {
    pub fn split_lines(&self) -> &[SplitLine] {
        match self {
            Self::Legacy(lines) => lines,
            Self::Rich(data) => &data.split,
        }
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, Self::Legacy(_))
    }
}

/// A persisted snapshot of one completed session's settlement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: String,
    pub user_id: String,
    pub bill_title: String,
    pub total_amount: Decimal,
    #[serde(default)]
    pub currency: Option<String>,
    pub data: HistoryPayload,
    #[serde(default)]
    pub reasoning_log: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl HistoryRecord {
    pub fn currency_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.currency
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(default)
    }

    /// Participant names in settlement order.
    ///
    /// Rich records carry them explicitly; legacy records only have the split
    /// rows, so the row names are used.
    pub fn people(&self) -> Vec<String> {
        match &self.data {
            HistoryPayload::Rich(data) if !data.people.is_empty() => data.people.clone(),
            payload => payload
                .split_lines()
                .iter()
                .map(|line| line.name.clone())
                .collect(),
        }
    }

    /// Rebuilds the receipt snapshot this record was settled against.
    ///
    /// Legacy records (and rich ones saved without items) can only report the
    /// settled total. When a rich record lacks tax, it is derived as the
    /// non-negative difference between the recorded total and the item subtotal.
    pub fn receipt_snapshot(&self, default_currency: &str) -> ReceiptSnapshot {
        let currency = self.currency_or(default_currency).to_string();
        match &self.data {
            HistoryPayload::Rich(data) if !data.items.is_empty() => {
                let subtotal = checked_sum(data.items.iter().map(|item| item.total_price))
                    .unwrap_or(Decimal::MAX);
                let total = data.total.unwrap_or(self.total_amount);
                let tax = data.tax.unwrap_or_else(|| {
                    total
                        .checked_sub(subtotal)
                        .unwrap_or(Decimal::ZERO)
                        .max(Decimal::ZERO)
                });
                ReceiptSnapshot::Full(ReceiptData {
                    items: data.items.clone(),
                    tax,
                    total,
                    currency,
                })
            }
            _ => ReceiptSnapshot::ItemsUnavailable {
                currency,
                total: self.total_amount,
            },
        }
    }
}

/// Insert payload for a new history record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewHistoryRecord {
    pub user_id: String,
    pub bill_title: String,
    pub total_amount: Decimal,
    pub currency: String,
    pub data: HistoryPayload,
    pub reasoning_log: String,
}

/// Aggregates over a user's history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryStats {
    pub total_bills: usize,
    pub total_amount: Decimal,
}

impl HistoryStats {
    pub fn from_records(records: &[HistoryRecord]) -> Self {
        Self {
            total_bills: records.len(),
            total_amount: records
                .iter()
                .fold(Decimal::ZERO, |acc, record| acc.saturating_add(record.total_amount)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with(data: &str) -> HistoryRecord {
        let json = format!(
            r#"{{
                "id": "h1",
                "user_id": "u1",
                "bill_title": "Dinner",
                "total_amount": 46.0,
                "currency": "RM",
                "data": {data},
                "reasoning_log": "log",
                "created_at": "2024-05-01T12:00:00Z"
            }}"#
        );
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn legacy_array_payload_is_detected() {
        let record = record_with(r#"[{"name": "Alice", "amount": 23}, {"name": "Bob", "amount": 23}]"#);

        assert!(record.data.is_legacy());
        assert_eq!(record.data.split_lines().len(), 2);
        assert_eq!(record.people(), vec!["Alice".to_string(), "Bob".to_string()]);
        assert!(!record.receipt_snapshot("RM").has_items());
    }

    #[test]
    fn rich_payload_restores_items_and_people() {
        let record = record_with(
            r#"{
                "items": [{"name": "Burger", "quantity": 1, "unit_price": 42.5, "total_price": 42.5}],
                "people": ["Alice", "Bob"],
                "split": [{"name": "Alice", "amount": 23}, {"name": "Bob", "amount": 23}]
            }"#,
        );

        assert!(!record.data.is_legacy());
        let snapshot = record.receipt_snapshot("RM");
        let receipt = snapshot.data().unwrap();
        assert_eq!(receipt.items.len(), 1);
        assert_eq!(receipt.total, Decimal::from(46));
        assert_eq!(receipt.tax, Decimal::new(35, 1));
        assert_eq!(record.people(), vec!["Alice".to_string(), "Bob".to_string()]);
    }

    #[test]
    fn splits_alias_is_accepted() {
        let record = record_with(r#"{"splits": [{"name": "A", "amount": 46}]}"#);
        assert_eq!(record.data.split_lines().len(), 1);
        assert!(!record.receipt_snapshot("RM").has_items());
    }

    #[test]
    fn stats_sum_totals() {
        let a = record_with("[]");
        let mut b = a.clone();
        b.total_amount = Decimal::new(1050, 2);
        let stats = HistoryStats::from_records(&[a, b]);
        assert_eq!(stats.total_bills, 2);
        assert_eq!(stats.total_amount, Decimal::new(5650, 2));
    }

    #[test]
    fn huge_totals_saturate_instead_of_panicking() {
        let mut a = record_with("[]");
        a.total_amount = Decimal::MAX;
        let b = a.clone();
        let stats = HistoryStats::from_records(&[a, b]);
        assert_eq!(stats.total_amount, Decimal::MAX);

        let record = record_with(
            r#"{
                "items": [
                    {"name": "A", "total_price": 5e28},
                    {"name": "B", "total_price": 5e28}
                ],
                "split": [{"name": "Alice", "amount": 46}]
            }"#,
        );
        let snapshot = record.receipt_snapshot("RM");
        assert_eq!(snapshot.data().unwrap().tax, Decimal::ZERO);
    }
}
