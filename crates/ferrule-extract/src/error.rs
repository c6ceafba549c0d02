//! Binding error types.
//!
//! Every binding failure is the client's fault, so each one maps to a 4xx
//! [`HttpFault`]. Misuse of [`Arguments`](crate::Arguments) by the action
//! itself is an [`ArgumentError`] and renders as a 500.

use ferrule_core::{ActionError, HttpFault};
use http::StatusCode;
use std::fmt;
use thiserror::Error;

/// Where the offending data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionSource {
    /// Query string.
    Query,
    /// URL-encoded form body.
    Form,
    /// JSON body.
    Json,
    /// Multipart body.
    Multipart,
    /// Raw body of any other content type.
    Body,
    /// The `Content-Type` header.
    ContentType,
}

impl fmt::Display for ExtractionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Query => write!(f, "query"),
            Self::Form => write!(f, "form"),
            Self::Json => write!(f, "json body"),
            Self::Multipart => write!(f, "multipart body"),
            Self::Body => write!(f, "body"),
            Self::ContentType => write!(f, "content-type"),
        }
    }
}

/// Error raised while binding request data to action parameters.
///
/// # Example
///
/// ```rust
/// use ferrule_extract::{ExtractionError, ExtractionSource};
/// use http::StatusCode;
///
/// let err = ExtractionError::invalid_value(ExtractionSource::Query, "id", "expected an integer");
/// assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
/// assert_eq!(err.field(), Some("id"));
/// assert!(err.to_string().contains("id"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionError {
    extraction_source: ExtractionSource,
    kind: ExtractionErrorKind,
    field: Option<String>,
    message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExtractionErrorKind {
    /// A value could not be coerced to the parameter type
    InvalidValue,
    /// The body does not have the shape its content type promises
    MalformedBody,
    /// JSON decoding failed
    DeserializationFailed,
    /// Content-Type is missing or not accepted
    UnsupportedMediaType,
}

impl ExtractionError {
    /// Creates an error for a value that does not convert to its parameter type.
    #[must_use]
    pub fn invalid_value(
        source: ExtractionSource,
        field: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        let field = field.into();
        let details = details.into();
        Self {
            extraction_source: source,
            kind: ExtractionErrorKind::InvalidValue,
            message: format!("invalid {source} parameter '{field}': {details}"),
            field: Some(field),
        }
    }

    /// Creates an error for a body whose shape does not match its content type.
    #[must_use]
    pub fn malformed_body(source: ExtractionSource, details: impl Into<String>) -> Self {
        Self {
            extraction_source: source,
            kind: ExtractionErrorKind::MalformedBody,
            message: format!("malformed {source}: {}", details.into()),
            field: None,
        }
    }

    /// Creates an error for a JSON document that could not be decoded.
    #[must_use]
    pub fn deserialization_failed(
        source: ExtractionSource,
        field: impl Into<String>,
        error: impl fmt::Display,
    ) -> Self {
        let field = field.into();
        Self {
            extraction_source: source,
            kind: ExtractionErrorKind::DeserializationFailed,
            message: format!("failed to deserialize {source} into '{field}': {error}"),
            field: Some(field),
        }
    }

    /// Creates an error for a body sent without a `Content-Type` header.
    #[must_use]
    pub fn missing_content_type() -> Self {
        Self {
            extraction_source: ExtractionSource::ContentType,
            kind: ExtractionErrorKind::UnsupportedMediaType,
            message: "request has a body but no content type".to_string(),
            field: None,
        }
    }

    /// Creates an error for a content type the action does not accept.
    #[must_use]
    pub fn unsupported_media_type(expected: &str, actual: Option<&str>) -> Self {
        let actual_str = actual.unwrap_or("none");
        Self {
            extraction_source: ExtractionSource::ContentType,
            kind: ExtractionErrorKind::UnsupportedMediaType,
            message: format!(
                "unsupported content type: expected '{expected}', got '{actual_str}'"
            ),
            field: None,
        }
    }

    /// Returns the extraction source.
    #[must_use]
    pub fn extraction_source(&self) -> ExtractionSource {
        self.extraction_source
    }

    /// Returns the parameter name if applicable.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Returns the client-facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self.kind {
            ExtractionErrorKind::InvalidValue
            | ExtractionErrorKind::MalformedBody
            | ExtractionErrorKind::DeserializationFailed => StatusCode::BAD_REQUEST,
            ExtractionErrorKind::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        }
    }

    /// Returns a machine-readable error code, used as a log field.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self.kind {
            ExtractionErrorKind::InvalidValue => "INVALID_PARAMETER",
            ExtractionErrorKind::MalformedBody => "MALFORMED_BODY",
            ExtractionErrorKind::DeserializationFailed => "DESERIALIZATION_FAILED",
            ExtractionErrorKind::UnsupportedMediaType => "UNSUPPORTED_MEDIA_TYPE",
        }
    }
}

impl fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExtractionError {}

impl From<ExtractionError> for HttpFault {
    fn from(error: ExtractionError) -> Self {
        if error.status_code() == StatusCode::UNSUPPORTED_MEDIA_TYPE {
            HttpFault::unsupported_media_type(error.message)
        } else {
            HttpFault::bad_request(error.message)
        }
    }
}

impl From<ExtractionError> for ActionError {
    fn from(error: ExtractionError) -> Self {
        ActionError::Fault(error.into())
    }
}

/// Misuse of bound arguments inside an action.
///
/// These are programming errors, not client errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    /// No parameter with this name was declared.
    #[error("no parameter named '{name}' was declared")]
    Unknown {
        /// Requested parameter name.
        name: String,
    },

    /// The parameter was already taken.
    #[error("parameter '{name}' was already taken")]
    AlreadyTaken {
        /// Requested parameter name.
        name: String,
    },

    /// The bound value does not convert to the requested Rust type.
    #[error("parameter '{name}' holds a {found} value, cannot read it as {expected}")]
    TypeMismatch {
        /// Requested parameter name.
        name: String,
        /// The requested type.
        expected: &'static str,
        /// The kind of value actually bound.
        found: &'static str,
    },
}

impl From<ArgumentError> for ActionError {
    fn from(error: ArgumentError) -> Self {
        ActionError::unhandled(error)
    }
}
