//! Observability hooks.
//!
//! Hooks are optional callbacks invoked at fixed points of a dispatch.
//! Each is stored as an `Arc<dyn Fn>` so a [`Hooks`] value is cheap to clone
//! and safe to share across worker threads.
//!
//! | Hook | Fires |
//! |------|-------|
//! | `on_request_start` | before routing |
//! | `on_exception` | for every unclassified failure |
//! | `on_http_error` | to render a fault message into a result |
//! | `on_send` | just before the response goes back to the transport |
//! | `on_request_end` | last, after `on_send` |

use crate::response::WireResponse;
use ferrule_core::{ActionResult, ConnectionInfo, IncomingRequest};
use std::fmt;
use std::sync::Arc;

/// Called before routing.
pub type RequestStartHook = Arc<dyn Fn(&IncomingRequest, &ConnectionInfo) + Send + Sync>;

/// Called once the response is built.
pub type RequestEndHook =
    Arc<dyn Fn(&IncomingRequest, &WireResponse, &ConnectionInfo) + Send + Sync>;

/// Receives every unclassified failure.
pub type ExceptionHook = Arc<dyn Fn(&anyhow::Error) + Send + Sync>;

/// Renders a fault message into the result sent to the client.
pub type HttpErrorHook = Arc<dyn Fn(&IncomingRequest, &str) -> ActionResult + Send + Sync>;

/// Called just before the response is handed back.
pub type SendHook = Arc<dyn Fn(&WireResponse) + Send + Sync>;

/// The set of installed hooks.
///
/// # Example
///
/// ```
/// use ferrule_core::ActionResult;
/// use ferrule_server::Hooks;
/// use serde_json::json;
///
/// let hooks = Hooks::new()
///     .on_http_error(|_request, message| ActionResult::Json(json!({ "error": message })))
///     .on_exception(|error| eprintln!("unhandled: {error:#}"));
/// ```
#[derive(Clone, Default)]
pub struct Hooks {
    request_start: Option<RequestStartHook>,
    request_end: Option<RequestEndHook>,
    exception: Option<ExceptionHook>,
    http_error: Option<HttpErrorHook>,
    send: Option<SendHook>,
}

impl Hooks {
    /// Creates an empty hook set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the request start hook.
    #[must_use]
    pub fn on_request_start<F>(mut self, hook: F) -> Self
    where
        F: Fn(&IncomingRequest, &ConnectionInfo) + Send + Sync + 'static,
    {
        self.request_start = Some(Arc::new(hook));
        self
    }

    /// Sets the request end hook.
    #[must_use]
    pub fn on_request_end<F>(mut self, hook: F) -> Self
    where
        F: Fn(&IncomingRequest, &WireResponse, &ConnectionInfo) + Send + Sync + 'static,
    {
        self.request_end = Some(Arc::new(hook));
        self
    }

    /// Sets the exception hook. Without one, failures are logged at `error`.
    #[must_use]
    pub fn on_exception<F>(mut self, hook: F) -> Self
    where
        F: Fn(&anyhow::Error) + Send + Sync + 'static,
    {
        self.exception = Some(Arc::new(hook));
        self
    }

    /// Sets the fault renderer. Without one, the message is sent as text.
    #[must_use]
    pub fn on_http_error<F>(mut self, hook: F) -> Self
    where
        F: Fn(&IncomingRequest, &str) -> ActionResult + Send + Sync + 'static,
    {
        self.http_error = Some(Arc::new(hook));
        self
    }

    /// Sets the send hook.
    #[must_use]
    pub fn on_send<F>(mut self, hook: F) -> Self
    where
        F: Fn(&WireResponse) + Send + Sync + 'static,
    {
        self.send = Some(Arc::new(hook));
        self
    }

    pub(crate) fn request_start(&self, request: &IncomingRequest, connection: &ConnectionInfo) {
        if let Some(hook) = &self.request_start {
            hook(request, connection);
        }
    }

    pub(crate) fn request_end(
        &self,
        request: &IncomingRequest,
        response: &WireResponse,
        connection: &ConnectionInfo,
    ) {
        if let Some(hook) = &self.request_end {
            hook(request, response, connection);
        }
    }

    pub(crate) fn exception(&self, error: &anyhow::Error) {
        match &self.exception {
            Some(hook) => hook(error),
            None => tracing::error!(error = %format!("{error:#}"), "Unhandled action failure"),
        }
    }

    pub(crate) fn http_error(&self, request: &IncomingRequest, message: &str) -> ActionResult {
        match &self.http_error {
            Some(hook) => hook(request, message),
            None => ActionResult::text(message),
        }
    }

    pub(crate) fn send(&self, response: &WireResponse) {
        if let Some(hook) = &self.send {
            hook(response);
        }
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("on_request_start", &self.request_start.is_some())
            .field("on_request_end", &self.request_end.is_some())
            .field("on_exception", &self.exception.is_some())
            .field("on_http_error", &self.http_error.is_some())
            .field("on_send", &self.send.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{Method, StatusCode};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_default_http_error_is_text() {
        let request = IncomingRequest::new(Method::GET, "/x");
        assert_eq!(
            Hooks::new().http_error(&request, "nope"),
            ActionResult::text("nope")
        );
    }

    #[test]
    fn test_installed_hooks_are_called() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (a, b, c) = (Arc::clone(&calls), Arc::clone(&calls), Arc::clone(&calls));

        let hooks = Hooks::new()
            .on_request_start(move |_, _| {
                a.fetch_add(1, Ordering::SeqCst);
            })
            .on_exception(move |_| {
                b.fetch_add(10, Ordering::SeqCst);
            })
            .on_send(move |_| {
                c.fetch_add(100, Ordering::SeqCst);
            });

        let request = IncomingRequest::new(Method::GET, "/x");
        hooks.request_start(&request, &ConnectionInfo::default());
        hooks.exception(&anyhow::anyhow!("boom"));
        hooks.send(&WireResponse::new(StatusCode::OK));
        hooks.request_end(
            &request,
            &WireResponse::new(StatusCode::OK),
            &ConnectionInfo::default(),
        );

        assert_eq!(calls.load(Ordering::SeqCst), 111);
    }

    #[test]
    fn test_debug_lists_installed_hooks() {
        let hooks = Hooks::new().on_send(|_| {});
        let debug = format!("{hooks:?}");
        assert!(debug.contains("on_send: true"));
        assert!(debug.contains("on_exception: false"));
    }
}
