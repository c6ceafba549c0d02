//! Type-erased, immutable action descriptors.

use crate::controller::{Controller, Handler};
use crate::route::Route;
use ferrule_core::{ActionContext, ActionReturn};
use ferrule_extract::{Arguments, ParameterSpec, SupportedContentType};
use ferrule_middleware::InterceptorChain;
use http::Method;
use std::fmt;
use std::sync::Arc;

type Invoker = Arc<dyn Fn(&mut ActionContext<'_>, Arguments) -> ActionReturn + Send + Sync>;

/// Everything the dispatcher needs to run one action.
#[derive(Clone)]
pub struct ActionDescriptor {
    controller: &'static str,
    method: &'static str,
    route: Route,
    params: Vec<ParameterSpec>,
    content_type: Option<SupportedContentType>,
    interceptors: InterceptorChain,
    invoker: Invoker,
}

impl ActionDescriptor {
    pub(crate) fn new<C: Controller>(
        method: &'static str,
        route: Route,
        params: Vec<ParameterSpec>,
        content_type: Option<SupportedContentType>,
        interceptors: InterceptorChain,
        handler: Handler<C>,
    ) -> Self {
        let invoker: Invoker = Arc::new(move |ctx: &mut ActionContext<'_>, args: Arguments| {
            let mut controller = C::default();
            handler(&mut controller, ctx, args)
        });
        Self {
            controller: C::name(),
            method,
            route,
            params,
            content_type,
            interceptors,
            invoker,
        }
    }

    /// Returns the controller name.
    #[must_use]
    pub const fn controller(&self) -> &'static str {
        self.controller
    }

    /// Returns the method name.
    #[must_use]
    pub const fn method(&self) -> &'static str {
        self.method
    }

    /// Returns `Controller::method`, used in logs and metrics.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}::{}", self.controller, self.method)
    }

    /// Returns the route.
    #[must_use]
    pub const fn route(&self) -> &Route {
        &self.route
    }

    /// Returns the HTTP verb.
    #[must_use]
    pub const fn verb(&self) -> &Method {
        self.route.method()
    }

    /// Returns the exact path.
    #[must_use]
    pub fn path(&self) -> &str {
        self.route.path()
    }

    /// Returns the declared parameters in order.
    #[must_use]
    pub fn params(&self) -> &[ParameterSpec] {
        &self.params
    }

    /// Returns the content type the action requires.
    #[must_use]
    pub const fn content_type(&self) -> Option<SupportedContentType> {
        self.content_type
    }

    /// Returns the interceptor chain.
    #[must_use]
    pub const fn interceptors(&self) -> &InterceptorChain {
        &self.interceptors
    }

    /// Runs the action on a fresh controller instance.
    pub fn invoke(&self, ctx: &mut ActionContext<'_>, args: Arguments) -> ActionReturn {
        (self.invoker)(ctx, args)
    }
}

impl fmt::Debug for ActionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionDescriptor")
            .field("controller", &self.controller)
            .field("method", &self.method)
            .field("route", &self.route)
            .field("params", &self.params)
            .field("content_type", &self.content_type)
            .field("interceptors", &self.interceptors)
            .finish_non_exhaustive()
    }
}
