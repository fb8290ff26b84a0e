//! Object keys for uploaded machine and work-order photos.

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Key prefix for machine photos.
pub const PREFIX_MACHINE: &str = "machine";

/// Key prefix for work-order photos.
pub const PREFIX_WORK_ORDER: &str = "wo";

/// Accepted image extensions (lowercase).
pub const SUPPORTED_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];

/// Default maximum upload size (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Lowercased extension of `filename`, validated against the allow-list.
pub fn image_extension(filename: &str) -> Result<String, CoreError> {
    let ext = match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext.to_lowercase(),
        _ => {
            return Err(CoreError::Validation(format!(
                "File '{filename}' has no extension"
            )))
        }
    };
    if SUPPORTED_IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(CoreError::Validation(format!(
            "Unsupported image format '.{ext}'. Supported: {}",
            SUPPORTED_IMAGE_EXTENSIONS.join(", ")
        )))
    }
}

/// Build the storage key `"{prefix}-{id}-{millis}.{ext}"`.
pub fn photo_key(
    prefix: &str,
    entity_id: DbId,
    now: Timestamp,
    filename: &str,
) -> Result<String, CoreError> {
    let ext = image_extension(filename)?;
    Ok(format!("{prefix}-{entity_id}-{}.{ext}", now.timestamp_millis()))
}

/// MIME type for an allowed extension.
pub fn content_type_for(ext: &str) -> &'static str {
    match ext {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
}
