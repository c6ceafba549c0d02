//! Fault types raised while dispatching a request.
//!
//! Failures fall into two shapes:
//!
//! - [`HttpFault`] carries a status code and a client-safe message. Routing,
//!   content negotiation and payload problems are raised this way, and actions
//!   may raise their own.
//! - [`ActionError::Unhandled`] wraps anything else. The client only ever sees
//!   a generic 500; the cause goes to the exception hook.
//!
//! | `FaultCategory` | Status |
//! |---|---|
//! | `Routing` | 404 |
//! | `ContentNegotiation` | 415 |
//! | `Payload` | 400 |
//! | `Application` | chosen by the action |

use http::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classification of an [`HttpFault`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultCategory {
    /// No action matched the verb and path.
    Routing,
    /// The request content type is missing or not accepted by the action.
    ContentNegotiation,
    /// The body or a bound value could not be read or coerced.
    Payload,
    /// Raised by application code with an explicit status.
    Application,
}

impl FaultCategory {
    /// Returns the default HTTP status code for this category.
    #[must_use]
    pub const fn default_status_code(&self) -> StatusCode {
        match self {
            Self::Routing => StatusCode::NOT_FOUND,
            Self::ContentNegotiation => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::Payload => StatusCode::BAD_REQUEST,
            Self::Application => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// A failure that maps directly onto an HTTP status and a message.
///
/// # Example
///
/// ```
/// use ferrule_core::HttpFault;
/// use http::StatusCode;
///
/// let fault = HttpFault::new(StatusCode::CONFLICT, "user already exists");
/// assert_eq!(fault.status(), StatusCode::CONFLICT);
/// assert_eq!(fault.message(), "user already exists");
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{status}: {message}")]
pub struct HttpFault {
    status: StatusCode,
    message: String,
    category: FaultCategory,
}

impl HttpFault {
    /// Creates an application fault with an explicit status.
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            category: FaultCategory::Application,
        }
    }

    /// Creates a fault of the given category with its default status.
    #[must_use]
    pub fn with_category(category: FaultCategory, message: impl Into<String>) -> Self {
        Self {
            status: category.default_status_code(),
            message: message.into(),
            category,
        }
    }

    /// Creates a 404 routing fault.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::with_category(FaultCategory::Routing, message)
    }

    /// Creates the 404 fault for a verb and path with no registered action.
    #[must_use]
    pub fn no_action(method: &Method, path: &str) -> Self {
        Self::not_found(format!("Action or content {method} {path} not found"))
    }

    /// Creates a 415 content negotiation fault.
    #[must_use]
    pub fn unsupported_media_type(message: impl Into<String>) -> Self {
        Self::with_category(FaultCategory::ContentNegotiation, message)
    }

    /// Creates a 400 payload fault.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_category(FaultCategory::Payload, message)
    }

    /// Returns the HTTP status code.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the client-facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the fault category.
    #[must_use]
    pub const fn category(&self) -> FaultCategory {
        self.category
    }
}

/// Everything that can go wrong between routing and serialization.
#[derive(Error, Debug)]
pub enum ActionError {
    /// A structured fault rendered with its own status and message.
    #[error(transparent)]
    Fault(#[from] HttpFault),

    /// An unexpected failure. Rendered as a generic 500.
    #[error("unhandled failure: {0}")]
    Unhandled(#[from] anyhow::Error),
}

impl ActionError {
    /// Wraps any error as an unclassified failure.
    pub fn unhandled(error: impl Into<anyhow::Error>) -> Self {
        Self::Unhandled(error.into())
    }

    /// Returns the status code this error renders with.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Fault(fault) => fault.status(),
            Self::Unhandled(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns `true` for structured faults.
    #[must_use]
    pub const fn is_fault(&self) -> bool {
        matches!(self, Self::Fault(_))
    }
}

impl From<serde_json::Error> for ActionError {
    fn from(error: serde_json::Error) -> Self {
        Self::Unhandled(error.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_status_codes() {
        assert_eq!(
            FaultCategory::Routing.default_status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            FaultCategory::ContentNegotiation.default_status_code(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(
            FaultCategory::Payload.default_status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_no_action_message() {
        let fault = HttpFault::no_action(&Method::DELETE, "/users/7");
        assert_eq!(fault.status(), StatusCode::NOT_FOUND);
        assert_eq!(fault.message(), "Action or content DELETE /users/7 not found");
        assert_eq!(fault.category(), FaultCategory::Routing);
    }

    #[test]
    fn test_application_fault_keeps_status() {
        let fault = HttpFault::new(StatusCode::FORBIDDEN, "nope");
        assert_eq!(fault.category(), FaultCategory::Application);
        assert_eq!(fault.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_action_error_status() {
        let fault: ActionError = HttpFault::bad_request("bad").into();
        assert!(fault.is_fault());
        assert_eq!(fault.status_code(), StatusCode::BAD_REQUEST);

        let unhandled = ActionError::unhandled(anyhow::anyhow!("boom"));
        assert!(!unhandled.is_fault());
        assert_eq!(unhandled.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_json_errors_are_unhandled() {
        let err = serde_json::from_str::<u32>("oops").unwrap_err();
        let err: ActionError = err.into();
        assert!(matches!(err, ActionError::Unhandled(_)));
    }

    #[test]
    fn test_category_serialization() {
        let json = serde_json::to_string(&FaultCategory::ContentNegotiation).unwrap();
        assert_eq!(json, "\"content_negotiation\"");
    }
}
