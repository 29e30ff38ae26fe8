//! Error types for image generation.

use std::time::Duration;

/// Errors that can occur while building a request or talking to the API.
#[derive(Debug, thiserror::Error)]
pub enum AiPhotoError {
    /// Credentials missing or invalid (API key, gcloud auth, project).
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Billing not enabled for the resolved project or API key.
    #[error("billing issue: {0}")]
    Billing(String),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Rate limit exceeded.
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    /// Content was blocked by safety filters.
    #[error("content blocked: {0}")]
    ContentBlocked(String),

    /// Invalid request parameters (bad arity, missing prompt, bad ratio).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The call succeeded but the response carried no image payload.
    #[error("no image generated: {0}")]
    NoImage(String),

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Failed to decode base64 image data.
    #[error("failed to decode: {0}")]
    Decode(String),

    /// I/O error (reading inputs, writing the output file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for image generation operations.
pub type Result<T> = std::result::Result<T, AiPhotoError>;

/// Maximum length of an API error body surfaced to the user.
const MAX_ERROR_LEN: usize = 600;

/// Strips credential material from an API error body and clamps its length.
///
/// Google endpoints echo the request URL in some error payloads, which would
/// leak `key=...` query parameters into logs and terminal output.
pub(crate) fn sanitize_error_message(text: &str) -> String {
    let mut out = String::with_capacity(text.len().min(MAX_ERROR_LEN));
    let mut rest = text;

    while let Some(pos) = rest.find("key=") {
        out.push_str(&rest[..pos]);
        out.push_str("key=REDACTED");
        let after = &rest[pos + 4..];
        let end = after
            .find(|c: char| c == '&' || c == '"' || c.is_whitespace())
            .unwrap_or(after.len());
        rest = &after[end..];
    }
    out.push_str(rest);

    let trimmed = out.trim();
    if trimmed.is_empty() {
        return "(empty error body)".to_string();
    }
    if trimmed.len() > MAX_ERROR_LEN {
        let cut = trimmed
            .char_indices()
            .take_while(|(i, _)| *i < MAX_ERROR_LEN)
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        format!("{}...", &trimmed[..cut])
    } else {
        trimmed.to_string()
    }
}

/// Parses a `Retry-After` header value as whole seconds.
pub(crate) fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AiPhotoError::Api {
            status: 404,
            message: "Not found".into(),
        };
        assert_eq!(err.to_string(), "API error: 404 - Not found");

        let err = AiPhotoError::ContentBlocked("Safety filter triggered".into());
        assert_eq!(err.to_string(), "content blocked: Safety filter triggered");

        let err = AiPhotoError::NoImage("model returned text only".into());
        assert_eq!(
            err.to_string(),
            "no image generated: model returned text only"
        );
    }

    #[test]
    fn test_sanitize_redacts_api_keys() {
        let text = r#"error calling https://example.com/v1/models?key=AIzaSyABC123&alt=json"#;
        let cleaned = sanitize_error_message(text);
        assert!(cleaned.contains("key=REDACTED"));
        assert!(!cleaned.contains("AIzaSy"));
        assert!(cleaned.contains("&alt=json"));
    }

    #[test]
    fn test_sanitize_clamps_length() {
        let text = "x".repeat(5000);
        let cleaned = sanitize_error_message(&text);
        assert!(cleaned.len() <= MAX_ERROR_LEN + 3);
        assert!(cleaned.ends_with("..."));
    }

    #[test]
    fn test_sanitize_empty_body() {
        assert_eq!(sanitize_error_message("   "), "(empty error body)");
    }

    #[test]
    fn test_parse_retry_after() {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(reqwest::header::RETRY_AFTER, "30".parse().unwrap());
        assert_eq!(parse_retry_after(&headers), Some(30));

        let empty = reqwest::header::HeaderMap::new();
        assert_eq!(parse_retry_after(&empty), None);
    }
}
