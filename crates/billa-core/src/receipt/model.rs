use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One line item extracted from a receipt image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptItem {
    pub name: String,
    #[serde(default = "one")]
    pub quantity: Decimal,
    #[serde(default)]
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

fn one() -> Decimal {
    Decimal::ONE
}

/// The authoritative pre-split snapshot of one receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptData {
    pub items: Vec<ReceiptItem>,
    #[serde(default)]
    pub tax: Decimal,
    #[serde(default)]
    pub total: Decimal,
    pub currency: String,
}

/// Adds amounts without panicking; `None` when the sum leaves `Decimal` range.
pub fn checked_sum<I>(amounts: I) -> Option<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(amount))
}

impl ReceiptData {
    /// Sum of every item's total price, or `None` on overflow.
    pub fn checked_subtotal(&self) -> Option<Decimal> {
        checked_sum(self.items.iter().map(|item| item.total_price))
    }

    /// Sum of every item's total price.
    ///
    /// Scans are rejected when this overflows, so saturation only shows up on
    /// data assembled elsewhere.
    pub fn subtotal(&self) -> Decimal {
        self.checked_subtotal().unwrap_or(Decimal::MAX)
    }

    /// The amount the split is computed against.
    pub fn displayed_total(&self, include_tax: bool) -> Decimal {
        if include_tax {
            self.total
        } else {
            self.subtotal()
        }
    }
}

/// What a session knows about its receipt.
///
/// Sessions restored from legacy history records only know the settled total;
/// the items are gone for good. Anything that needs items (tax toggling,
/// re-splitting) must treat that case as unavailable rather than as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReceiptSnapshot {
    Full(ReceiptData),
    ItemsUnavailable { currency: String, total: Decimal },
}

impl ReceiptSnapshot {
    pub fn currency(&self) -> &str {
        match self {
            Self::Full(data) => &data.currency,
            Self::ItemsUnavailable { currency, .. } => currency,
        }
    }

    pub fn data(&self) -> Option<&ReceiptData> {
        match self {
            Self::Full(data) => Some(data),
            Self::ItemsUnavailable { .. } => None,
        }
    }

    pub fn has_items(&self) -> bool {
        matches!(self, Self::Full(_))
    }

    /// Item subtotal, if items are known.
    pub fn subtotal(&self) -> Option<Decimal> {
        self.data().map(ReceiptData::subtotal)
    }

    /// Displayed total for the given tax flag, if it can be derived.
    pub fn displayed_total(&self, include_tax: bool) -> Option<Decimal> {
        self.data().map(|data| data.displayed_total(include_tax))
    }
}
