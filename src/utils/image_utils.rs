// utils/image_utils.rs
use base64::{engine::general_purpose, Engine as _};

use crate::service::error::ServiceError;

pub const MAX_IMAGE_SIZE_MB: usize = 10;

/// Request body ceiling for routes that carry an image as a base64 data URL:
/// a maximum-size image after base64 (4/3) plus room for the rest of the JSON.
pub const MAX_IMAGE_BODY_BYTES: usize = MAX_IMAGE_SIZE_MB * 1024 * 1024 / 3 * 4 + 64 * 1024;

/// An image ready to be sent inline to the model.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineImage {
    pub mime_type: String,
    pub base64_data: String,
}

/// Splits `data:image/png;base64,....` into its declared mime type and payload.
/// A bare base64 string is accepted too.
fn split_data_url(data_url: &str) -> (Option<&str>, &str) {
    let trimmed = data_url.trim();
    match trimmed.strip_prefix("data:") {
        Some(rest) => match rest.split_once(',') {
            Some((meta, payload)) => {
                let mime = meta.split(';').next().filter(|m| !m.is_empty());
                (mime, payload)
            }
            None => (None, rest),
        },
        None => (None, trimmed),
    }
}

pub fn validate_image_size(bytes: &[u8], max_size_mb: usize) -> Result<(), ServiceError> {
    let max_size_bytes = max_size_mb * 1024 * 1024;
    if bytes.len() > max_size_bytes {
        return Err(ServiceError::ImageDecode(format!(
            "image is {} MB, the limit is {} MB",
            bytes.len() / (1024 * 1024),
            max_size_mb
        )));
    }
    Ok(())
}

/// Sniffs the real format from magic bytes; falls back to what the caller declared,
/// then to JPEG.
pub fn detect_mime_type(bytes: &[u8], declared: Option<&str>) -> String {
    match image::guess_format(bytes) {
        Ok(format) => format.to_mime_type().to_string(),
        Err(_) => declared
            .filter(|m| m.starts_with("image/"))
            .unwrap_or("image/jpeg")
            .to_string(),
    }
}

pub fn decode_data_url(data_url: &str) -> Result<InlineImage, ServiceError> {
    let (declared, payload) = split_data_url(data_url);
    if payload.is_empty() {
        return Err(ServiceError::ImageDecode("image payload is empty".to_string()));
    }

    let bytes = general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| ServiceError::ImageDecode(format!("invalid base64: {}", e)))?;
    validate_image_size(&bytes, MAX_IMAGE_SIZE_MB)?;

    Ok(InlineImage {
        mime_type: detect_mime_type(&bytes, declared),
        base64_data: payload.to_string(),
    })
}

pub fn encode_bytes(bytes: &[u8], declared: Option<&str>) -> Result<InlineImage, ServiceError> {
    validate_image_size(bytes, MAX_IMAGE_SIZE_MB)?;
    Ok(InlineImage {
        mime_type: detect_mime_type(bytes, declared),
        base64_data: general_purpose::STANDARD.encode(bytes),
    })
}
