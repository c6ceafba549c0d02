//! Error translation.
//!
//! Every failure between routing and serialization ends up here and leaves
//! as a [`WireResponse`]. Structured faults keep their status and message.
//! Anything else becomes a generic 500 and its cause goes to the exception
//! hook, never to the client.

use crate::hooks::Hooks;
use crate::response::WireResponse;
use crate::serializer::ResultSerializer;
use ferrule_core::{ActionError, IncomingRequest};
use http::StatusCode;

/// Message sent to the client for unclassified failures.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong";

/// Converts [`ActionError`]s into responses.
#[derive(Debug, Clone, Default)]
pub struct ErrorTranslator {
    serializer: ResultSerializer,
    hooks: Hooks,
}

impl ErrorTranslator {
    /// Creates a translator rendering through `serializer` and `hooks`.
    #[must_use]
    pub const fn new(serializer: ResultSerializer, hooks: Hooks) -> Self {
        Self { serializer, hooks }
    }

    /// Renders an error for the given request.
    pub fn translate(&self, request: &IncomingRequest, error: ActionError) -> WireResponse {
        match error {
            ActionError::Fault(fault) => {
                tracing::warn!(
                    http.status_code = fault.status().as_u16(),
                    category = ?fault.category(),
                    reason = fault.message(),
                    "Request failed"
                );
                self.render(request, fault.status(), fault.message())
            }
            ActionError::Unhandled(cause) => {
                self.hooks.exception(&cause);
                self.render(
                    request,
                    StatusCode::INTERNAL_SERVER_ERROR,
                    GENERIC_FAILURE_MESSAGE,
                )
            }
        }
    }

    fn render(&self, request: &IncomingRequest, status: StatusCode, message: &str) -> WireResponse {
        let result = self.hooks.http_error(request, message);
        match self.serializer.serialize(status, &result) {
            Ok(response) => response,
            Err(err) => {
                tracing::error!(error = %err, "Failed to serialize error response");
                self.serializer
                    .text(StatusCode::INTERNAL_SERVER_ERROR, GENERIC_FAILURE_MESSAGE)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferrule_core::{ActionResult, HttpFault};
    use http::Method;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    fn request() -> IncomingRequest {
        IncomingRequest::new(Method::GET, "/orders")
    }

    #[test]
    fn test_fault_keeps_status_and_message() {
        let translator = ErrorTranslator::default();
        let response = translator.translate(
            &request(),
            HttpFault::new(StatusCode::CONFLICT, "order already shipped").into(),
        );

        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(response.text(), "order already shipped");
        assert_eq!(
            response.header("content-type"),
            Some("text/plain; charset=utf-8")
        );
    }

    #[test]
    fn test_unhandled_is_generic_and_reported() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let hooks = Hooks::new().on_exception(move |err| {
            sink.lock().unwrap().push(err.to_string());
        });
        let translator = ErrorTranslator::new(ResultSerializer::default(), hooks);

        let response = translator.translate(
            &request(),
            ActionError::unhandled(anyhow::anyhow!("db password rejected")),
        );

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.text(), GENERIC_FAILURE_MESSAGE);
        assert!(!response.text().contains("password"));
        assert_eq!(*seen.lock().unwrap(), vec!["db password rejected"]);
    }

    #[test]
    fn test_http_error_hook_shapes_the_body() {
        let hooks = Hooks::new().on_http_error(|request, message| {
            ActionResult::Json(json!({ "path": request.path(), "error": message }))
        });
        let translator = ErrorTranslator::new(ResultSerializer::default(), hooks);

        let response = translator.translate(&request(), HttpFault::bad_request("bad id").into());

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.header("content-type"), Some("application/json"));
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body, json!({"path": "/orders", "error": "bad id"}));
    }

    #[test]
    fn test_unserializable_rendering_falls_back_to_bare_500() {
        let hooks = Hooks::new().on_http_error(|_, _| ActionResult::redirect("bad\nlocation"));
        let translator = ErrorTranslator::new(ResultSerializer::default(), hooks);

        let response = translator.translate(&request(), HttpFault::not_found("gone").into());

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.text(), GENERIC_FAILURE_MESSAGE);
    }
}
