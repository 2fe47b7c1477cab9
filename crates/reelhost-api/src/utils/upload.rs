//! Common utilities for file upload handlers

use reelhost_core::AppError;
use uuid::Uuid;

/// Parse a path segment as a video id.
pub fn parse_video_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::InvalidInput("Invalid ID".to_string()))
}

/// Normalize MIME type by stripping parameters (e.g. "image/jpeg; charset=utf-8" -> "image/jpeg").
pub fn normalize_mime_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(content_type)
        .to_lowercase()
}

/// Validate a declared content type against an allowlist and return the normalized
/// media type. Parameters cannot be used to bypass the check.
pub fn validate_content_type(
    content_type: Option<&str>,
    allowed_types: &[&str],
) -> Result<String, AppError> {
    let content_type = content_type
        .ok_or_else(|| AppError::InvalidInput("Missing Content-Type".to_string()))?;

    let normalized = normalize_mime_type(content_type);
    if normalized.is_empty() || normalized.split('/').count() != 2 {
        return Err(AppError::InvalidInput("Invalid Content-Type".to_string()));
    }

    if !allowed_types.iter().any(|ct| normalized == ct.to_lowercase()) {
        return Err(AppError::InvalidInput(format!(
            "Invalid file type. Allowed types: {}",
            allowed_types.join(", ")
        )));
    }

    Ok(normalized)
}

/// Error for a form that ended without the expected file field.
pub fn missing_field(name: &str) -> AppError {
    AppError::InvalidInput(format!("Unable to parse form file: missing field '{}'", name))
}
