//! The interceptor trait.

use ferrule_core::{ActionResult, IncomingRequest};

/// A check that runs before an action and may answer in its place.
///
/// Returning `Some` short-circuits the remaining interceptors and the action;
/// the result is serialized with status 200. Returning `None` lets the
/// request continue.
///
/// Interceptors are shared across concurrent requests, so any internal state
/// must be synchronized.
///
/// # Example
///
/// ```
/// use ferrule_core::{ActionResult, IncomingRequest};
/// use ferrule_middleware::Interceptor;
///
/// struct Maintenance;
///
/// impl Interceptor for Maintenance {
///     fn name(&self) -> &str {
///         "maintenance"
///     }
///
///     fn intercept(&self, _request: &IncomingRequest) -> Option<ActionResult> {
///         Some(ActionResult::text("down for maintenance"))
///     }
/// }
/// ```
pub trait Interceptor: Send + Sync + 'static {
    /// Returns the name used in logs.
    fn name(&self) -> &str;

    /// Inspects the request, optionally answering it.
    fn intercept(&self, request: &IncomingRequest) -> Option<ActionResult>;
}

/// An interceptor built from a closure.
///
/// ```
/// use ferrule_core::{ActionResult, IncomingRequest};
/// use ferrule_middleware::{FnInterceptor, Interceptor};
/// use http::Method;
///
/// let only_get = FnInterceptor::new("only-get", |request: &IncomingRequest| {
///     (request.method() != Method::GET).then(|| ActionResult::text("read only"))
/// });
///
/// assert_eq!(only_get.name(), "only-get");
/// assert!(only_get.intercept(&IncomingRequest::new(Method::GET, "/")).is_none());
/// ```
pub struct FnInterceptor<F> {
    name: String,
    func: F,
}

impl<F> FnInterceptor<F>
where
    F: Fn(&IncomingRequest) -> Option<ActionResult> + Send + Sync + 'static,
{
    /// Creates a named closure interceptor.
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> Interceptor for FnInterceptor<F>
where
    F: Fn(&IncomingRequest) -> Option<ActionResult> + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn intercept(&self, request: &IncomingRequest) -> Option<ActionResult> {
        (self.func)(request)
    }
}

impl<F> std::fmt::Debug for FnInterceptor<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnInterceptor")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
