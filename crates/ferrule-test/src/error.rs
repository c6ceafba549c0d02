//! Test error types.

use thiserror::Error;

/// Errors raised while building a test request or reading its response.
#[derive(Debug, Error)]
pub enum TestError {
    /// The request could not be built.
    #[error("Request build error: {0}")]
    RequestBuild(String),

    /// A header name or value is invalid.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// The body could not be materialized or read.
    #[error("Body error: {0}")]
    Body(String),

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Form encoding failed.
    #[error("Form encoding error: {0}")]
    Form(#[from] serde_urlencoded::ser::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            TestError::InvalidHeader("x y".to_string()).to_string(),
            "Invalid header: x y"
        );
        let err: TestError = serde_json::from_str::<u8>("x").unwrap_err().into();
        assert!(err.to_string().starts_with("JSON error"));
    }
}
