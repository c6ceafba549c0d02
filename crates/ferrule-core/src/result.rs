//! The closed set of results an action can return.

use crate::error::ActionError;
use serde::Serialize;

/// What an action hands back to the dispatcher.
///
/// `Ok(None)` means the action produced no result, which the dispatcher
/// treats as a handler failure.
pub type ActionReturn = Result<Option<ActionResult>, ActionError>;

/// A typed action result.
///
/// Each variant fixes the response content type:
///
/// | Variant | Content-Type | Status |
/// |---|---|---|
/// | `Json` | `application/json` | caller's |
/// | `Text` | `text/plain; charset=utf-8` | caller's |
/// | `Redirect` | none | always 302 |
///
/// # Example
///
/// ```
/// use ferrule_core::ActionResult;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct User { id: u64, name: String }
///
/// let result = ActionResult::json(&User { id: 1, name: "Ada".into() }).unwrap();
/// assert!(matches!(result, ActionResult::Json(_)));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum ActionResult {
    /// A JSON document.
    Json(serde_json::Value),
    /// Plain text.
    Text(String),
    /// A redirect to the given location.
    Redirect(String),
}

impl ActionResult {
    /// Serializes a value into a JSON result.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(value).map(Self::Json)
    }

    /// Creates a text result.
    #[must_use]
    pub fn text(body: impl Into<String>) -> Self {
        Self::Text(body.into())
    }

    /// Creates a redirect result.
    #[must_use]
    pub fn redirect(location: impl Into<String>) -> Self {
        Self::Redirect(location.into())
    }

    /// Returns the variant name, used in logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Json(_) => "json",
            Self::Text(_) => "text",
            Self::Redirect(_) => "redirect",
        }
    }
}

impl From<serde_json::Value> for ActionResult {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

impl From<String> for ActionResult {
    fn from(body: String) -> Self {
        Self::Text(body)
    }
}

impl From<&str> for ActionResult {
    fn from(body: &str) -> Self {
        Self::Text(body.to_string())
    }
}
