//! Receipt scanning collaborator.

use super::model::{ReceiptData, ReceiptItem};
use crate::error::{BillaError, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A captured receipt photo ready for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptImage {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ReceiptImage {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }
}

/// Raw answer of the scan service.
///
/// `items` is empty or missing when the service could not find a receipt in
/// the photo.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanResponse {
    #[serde(default)]
    pub items: Option<Vec<ReceiptItem>>,
    #[serde(default)]
    pub tax: Decimal,
    #[serde(default)]
    pub total: Decimal,
    #[serde(default)]
    pub currency: Option<String>,
}

impl ScanResponse {
    /// Converts into a receipt snapshot, or `None` when no items were detected.
    ///
    /// Fails with [`BillaError::UpstreamFormat`] when the item prices cannot
    /// be added up.
    pub fn into_receipt(self, default_currency: &str) -> Result<Option<ReceiptData>> {
        let Some(items) = self.items.filter(|items| !items.is_empty()) else {
            return Ok(None);
        };
        let currency = self
            .currency
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| default_currency.to_string());
        let receipt = ReceiptData {
            items,
            tax: self.tax,
            total: self.total,
            currency,
        };
        if receipt.checked_subtotal().is_none() {
            return Err(BillaError::upstream_format(
                "Scanned item prices are out of range",
            ));
        }
        Ok(Some(receipt))
    }
}

/// External service that turns a receipt photo into line items.
#[async_trait]
pub trait ReceiptScanner: Send + Sync {
    /// Uploads the image and returns whatever the service detected.
    ///
    /// Transport problems are reported as errors; an empty detection is a
    /// successful response with no items.
    async fn scan(&self, image: &ReceiptImage) -> Result<ScanResponse>;
}
