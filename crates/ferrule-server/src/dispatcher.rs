//! Request dispatch.
//!
//! One call to [`Dispatcher::dispatch`] handles one request end to end:
//!
//! 1. Find the action by exact verb and path, or fail with 404.
//! 2. Run the action's interceptors. The first result short-circuits and is
//!    serialized with status 200.
//! 3. Bind arguments from the query and body.
//! 4. Invoke the action on a fresh controller with a fresh context.
//! 5. Serialize the result with status 200 and attach cookies set by the
//!    action.
//!
//! Any failure on the way is rendered by the [`ErrorTranslator`]. The
//! dispatcher holds no per-request state, so one instance can be shared
//! behind an `Arc` by every worker.

use crate::error::ServerError;
use crate::hooks::Hooks;
use crate::response::WireResponse;
use crate::serializer::{ResultSerializer, DEFAULT_SERVER_NAME};
use crate::translator::ErrorTranslator;
use ferrule_core::{
    ActionContext, ActionError, ActionReturn, ConnectionInfo, HttpFault, IncomingRequest,
    RequestId,
};
use ferrule_extract::{Binder, BinderOptions};
use ferrule_router::{ActionDescriptor, ActionRegistry};
use ferrule_telemetry::metrics;
use http::header::HeaderValue;
use http::StatusCode;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

/// Routes, binds, invokes and serializes.
///
/// # Example
///
/// ```
/// use ferrule_core::{ActionContext, ActionResult, ActionReturn, ConnectionInfo, IncomingRequest};
/// use ferrule_extract::Arguments;
/// use ferrule_router::{Controller, MethodDecl, RegistryBuilder};
/// use ferrule_server::Dispatcher;
/// use http::{Method, StatusCode};
///
/// #[derive(Default)]
/// struct Ping;
///
/// impl Ping {
///     fn ping(&mut self, _ctx: &mut ActionContext<'_>, _args: Arguments) -> ActionReturn {
///         Ok(Some(ActionResult::text("pong")))
///     }
/// }
///
/// impl Controller for Ping {
///     fn methods() -> Vec<MethodDecl<Self>> {
///         vec![MethodDecl::action("ping", Self::ping).get("/ping")]
///     }
/// }
///
/// let registry = RegistryBuilder::new().controller::<Ping>().build().unwrap();
/// let dispatcher = Dispatcher::new(registry);
///
/// let request = IncomingRequest::new(Method::GET, "/ping");
/// let response = dispatcher.dispatch(&request, &ConnectionInfo::default());
/// assert_eq!(response.status(), StatusCode::OK);
/// assert_eq!(response.text(), "pong");
/// ```
#[derive(Debug)]
pub struct Dispatcher {
    registry: ActionRegistry,
    binder: Binder,
    serializer: ResultSerializer,
    translator: ErrorTranslator,
    hooks: Hooks,
}

impl Dispatcher {
    /// Creates a dispatcher with default hooks and binder options.
    #[must_use]
    pub fn new(registry: ActionRegistry) -> Self {
        let serializer = ResultSerializer::default();
        let hooks = Hooks::default();
        Self {
            registry,
            binder: Binder::default(),
            translator: ErrorTranslator::new(serializer.clone(), hooks.clone()),
            serializer,
            hooks,
        }
    }

    /// Creates a builder for the given registry.
    #[must_use]
    pub fn builder(registry: ActionRegistry) -> DispatcherBuilder {
        DispatcherBuilder::new(registry)
    }

    /// Returns the action registry.
    #[must_use]
    pub const fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    /// Returns the result serializer.
    #[must_use]
    pub const fn serializer(&self) -> &ResultSerializer {
        &self.serializer
    }

    /// Handles one request.
    ///
    /// Never fails: every error is rendered into the returned response.
    pub fn dispatch(&self, request: &IncomingRequest, connection: &ConnectionInfo) -> WireResponse {
        let request_id = RequestId::new();
        let span = tracing::debug_span!(
            "dispatch",
            request_id = %request_id,
            http.method = %request.method(),
            http.path = request.path(),
        );
        let _entered = span.enter();
        let started = Instant::now();

        self.hooks.request_start(request, connection);

        let (action_name, response) =
            match self.registry.find(request.method(), request.path()) {
                Some(action) => (
                    action.qualified_name(),
                    self.run_action(action, request, connection, request_id),
                ),
                None => (
                    metrics::UNMATCHED_ACTION.to_string(),
                    self.translator.translate(
                        request,
                        HttpFault::no_action(request.method(), request.path()).into(),
                    ),
                ),
            };

        self.finish(request, connection, &action_name, response, started)
    }

    /// Renders a transport-level failure through the same error path.
    ///
    /// Used by the HTTP adapter when a request cannot be materialized, for
    /// example when the body is too large or not valid multipart.
    pub fn protocol_error(
        &self,
        request: &IncomingRequest,
        connection: &ConnectionInfo,
        status: StatusCode,
        message: &str,
    ) -> WireResponse {
        let started = Instant::now();
        self.hooks.request_start(request, connection);
        let response = self
            .translator
            .translate(request, HttpFault::new(status, message).into());
        self.finish(
            request,
            connection,
            metrics::UNMATCHED_ACTION,
            response,
            started,
        )
    }

    fn finish(
        &self,
        request: &IncomingRequest,
        connection: &ConnectionInfo,
        action_name: &str,
        response: WireResponse,
        started: Instant,
    ) -> WireResponse {
        let elapsed = started.elapsed();
        self.hooks.send(&response);
        self.hooks.request_end(request, &response, connection);
        metrics::record_request(action_name, response.status().as_u16(), elapsed);
        tracing::debug!(
            action = action_name,
            http.status_code = response.status().as_u16(),
            duration_ms = elapsed.as_secs_f64() * 1000.0,
            "Request completed"
        );
        response
    }

    fn run_action(
        &self,
        action: &ActionDescriptor,
        request: &IncomingRequest,
        connection: &ConnectionInfo,
        request_id: RequestId,
    ) -> WireResponse {
        if let Some((interceptor, result)) = action.interceptors().run_named(request) {
            metrics::record_short_circuit(&action.qualified_name(), interceptor);
            return self.respond(request, &result, None);
        }

        let args = match self
            .binder
            .bind(request, action.params(), action.content_type())
        {
            Ok(args) => args,
            Err(err) => {
                metrics::record_binding_failure(&action.qualified_name(), err.error_code());
                return self.translator.translate(request, err.into());
            }
        };

        let mut ctx = ActionContext::new(request_id, request, connection);
        let outcome: ActionReturn =
            panic::catch_unwind(AssertUnwindSafe(|| action.invoke(&mut ctx, args)))
                .unwrap_or_else(|payload| {
                    Err(ActionError::unhandled(anyhow::anyhow!(
                        "action {} panicked: {}",
                        action.qualified_name(),
                        panic_message(payload.as_ref())
                    )))
                });

        match outcome {
            Ok(Some(result)) => self.respond(request, &result, Some(&ctx)),
            Ok(None) => self.translator.translate(
                request,
                ActionError::unhandled(anyhow::anyhow!(
                    "action {} returned no result",
                    action.qualified_name()
                )),
            ),
            Err(err) => self.translator.translate(request, err),
        }
    }

    fn respond(
        &self,
        request: &IncomingRequest,
        result: &ferrule_core::ActionResult,
        ctx: Option<&ActionContext<'_>>,
    ) -> WireResponse {
        match self.serializer.serialize(StatusCode::OK, result) {
            Ok(mut response) => {
                if let Some(ctx) = ctx {
                    response.append_cookies(ctx.cookies());
                }
                response
            }
            Err(err) => self.translator.translate(request, err),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

/// Builder for [`Dispatcher`].
#[derive(Debug)]
pub struct DispatcherBuilder {
    registry: ActionRegistry,
    hooks: Hooks,
    server_name: Option<String>,
    binder_options: BinderOptions,
}

impl DispatcherBuilder {
    /// Creates a builder with default settings.
    #[must_use]
    pub fn new(registry: ActionRegistry) -> Self {
        Self {
            registry,
            hooks: Hooks::default(),
            server_name: None,
            binder_options: BinderOptions::default(),
        }
    }

    /// Installs hooks.
    #[must_use]
    pub fn hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Sets the `Server` header value.
    #[must_use]
    pub fn server_name(mut self, name: impl Into<String>) -> Self {
        self.server_name = Some(name.into());
        self
    }

    /// Sets the binder options.
    #[must_use]
    pub fn binder_options(mut self, options: BinderOptions) -> Self {
        self.binder_options = options;
        self
    }

    /// Builds the dispatcher.
    ///
    /// Fails if the server name is not a valid header value.
    pub fn build(self) -> Result<Dispatcher, ServerError> {
        let name = self
            .server_name
            .unwrap_or_else(|| DEFAULT_SERVER_NAME.to_string());
        let server_name = HeaderValue::from_str(&name)
            .map_err(|e| ServerError::Config(format!("invalid server name '{name}': {e}")))?;
        let serializer = ResultSerializer::new(server_name);

        Ok(Dispatcher {
            registry: self.registry,
            binder: Binder::new(self.binder_options),
            translator: ErrorTranslator::new(serializer.clone(), self.hooks.clone()),
            serializer,
            hooks: self.hooks,
        })
    }
}
