//! Loads receipt photos from disk.

use billa_core::receipt::ReceiptImage;
use billa_core::{BillaError, Result};
use std::path::Path;

/// Reads an image file and guesses its MIME type from the extension.
///
/// Only `image/*` types are accepted.
pub async fn load_receipt_image(path: &Path) -> Result<ReceiptImage> {
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    if mime.type_() != mime_guess::mime::IMAGE {
        return Err(BillaError::validation(format!(
            "{} is not an image ({})",
            path.display(),
            mime
        )));
    }

    let bytes = tokio::fs::read(path).await?;
    if bytes.is_empty() {
        return Err(BillaError::validation(format!("{} is empty", path.display())));
    }

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "receipt".to_string());
    Ok(ReceiptImage::new(file_name, mime.essence_str(), bytes))
}
