//! Receipt domain: line items, the receipt snapshot and the scanning collaborator.

mod model;
mod service;

pub use model::{ReceiptData, ReceiptItem, ReceiptSnapshot, checked_sum};
pub use service::{ReceiptImage, ReceiptScanner, ScanResponse};
