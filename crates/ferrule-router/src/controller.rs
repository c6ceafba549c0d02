//! Controller declarations.
//!
//! A controller lists its methods explicitly. Each [`MethodDecl`] says
//! whether the method is public, whether it is routed, and whether it
//! returns an action result; the registry turns valid combinations into
//! actions and rejects the rest.

use crate::route::Route;
use ferrule_core::{ActionContext, ActionReturn};
use ferrule_extract::{Arguments, ParameterSpec, SupportedContentType};
use ferrule_middleware::{Interceptor, InterceptorChain};
use http::Method;
use std::sync::Arc;

pub(crate) type Handler<C> =
    Arc<dyn Fn(&mut C, &mut ActionContext<'_>, Arguments) -> ActionReturn + Send + Sync>;

/// A group of actions sharing one type.
///
/// A fresh instance is created with [`Default`] for every dispatched
/// request, so controllers hold no state between requests.
///
/// # Example
///
/// ```
/// use ferrule_core::{ActionContext, ActionResult, ActionReturn};
/// use ferrule_extract::{Arguments, ParameterSpec};
/// use ferrule_router::{Controller, MethodDecl};
///
/// #[derive(Default)]
/// struct GreetingController;
///
/// impl GreetingController {
///     fn hello(&mut self, _ctx: &mut ActionContext<'_>, mut args: Arguments) -> ActionReturn {
///         let name: String = args.take("name")?;
///         Ok(Some(ActionResult::text(format!("Hello, {name}!"))))
///     }
/// }
///
/// impl Controller for GreetingController {
///     fn methods() -> Vec<MethodDecl<Self>> {
///         vec![MethodDecl::action("hello", Self::hello)
///             .get("/hello")
///             .param(ParameterSpec::string("name"))]
///     }
/// }
///
/// assert_eq!(GreetingController::name(), "GreetingController");
/// ```
pub trait Controller: Default + Send + 'static {
    /// Returns the controller name used in faults and logs.
    fn name() -> &'static str {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }

    /// Declares the controller's methods.
    fn methods() -> Vec<MethodDecl<Self>>;
}

/// Method visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Reachable by the dispatcher.
    Public,
    /// Internal to the controller.
    Private,
}

pub(crate) enum Returns<C> {
    ActionResult(Handler<C>),
    Other,
}

/// The declaration of one controller method.
pub struct MethodDecl<C> {
    pub(crate) name: &'static str,
    pub(crate) visibility: Visibility,
    pub(crate) route: Option<Route>,
    pub(crate) returns: Returns<C>,
    pub(crate) content_type: Option<SupportedContentType>,
    pub(crate) interceptors: InterceptorChain,
    pub(crate) params: Vec<ParameterSpec>,
}

impl<C: 'static> MethodDecl<C> {
    fn declare(name: &'static str, returns: Returns<C>) -> Self {
        Self {
            name,
            visibility: Visibility::Public,
            route: None,
            returns,
            content_type: None,
            interceptors: InterceptorChain::new(),
            params: Vec::new(),
        }
    }

    /// Declares a public method returning an action result.
    pub fn action<F>(name: &'static str, handler: F) -> Self
    where
        F: Fn(&mut C, &mut ActionContext<'_>, Arguments) -> ActionReturn + Send + Sync + 'static,
    {
        Self::declare(name, Returns::ActionResult(Arc::new(handler)))
    }

    /// Declares a method that returns something other than an action result.
    #[must_use]
    pub fn helper(name: &'static str) -> Self {
        Self::declare(name, Returns::Other)
    }

    /// Routes the method to a verb and exact path.
    #[must_use]
    pub fn route(mut self, method: Method, path: impl Into<String>) -> Self {
        self.route = Some(Route::new(method, path));
        self
    }

    /// Routes `GET path`.
    #[must_use]
    pub fn get(self, path: impl Into<String>) -> Self {
        self.route(Method::GET, path)
    }

    /// Routes `POST path`.
    #[must_use]
    pub fn post(self, path: impl Into<String>) -> Self {
        self.route(Method::POST, path)
    }

    /// Routes `PUT path`.
    #[must_use]
    pub fn put(self, path: impl Into<String>) -> Self {
        self.route(Method::PUT, path)
    }

    /// Routes `DELETE path`.
    #[must_use]
    pub fn delete(self, path: impl Into<String>) -> Self {
        self.route(Method::DELETE, path)
    }

    /// Routes `PATCH path`.
    #[must_use]
    pub fn patch(self, path: impl Into<String>) -> Self {
        self.route(Method::PATCH, path)
    }

    /// Marks the method private.
    #[must_use]
    pub fn private(mut self) -> Self {
        self.visibility = Visibility::Private;
        self
    }

    /// Requires requests to carry this content type.
    #[must_use]
    pub fn consumes(mut self, content_type: SupportedContentType) -> Self {
        self.content_type = Some(content_type);
        self
    }

    /// Appends a parameter.
    #[must_use]
    pub fn param(mut self, param: ParameterSpec) -> Self {
        self.params.push(param);
        self
    }

    /// Appends several parameters.
    #[must_use]
    pub fn params(mut self, params: impl IntoIterator<Item = ParameterSpec>) -> Self {
        self.params.extend(params);
        self
    }

    /// Appends an interceptor.
    #[must_use]
    pub fn intercept<I: Interceptor>(mut self, interceptor: I) -> Self {
        self.interceptors = self.interceptors.with(interceptor);
        self
    }

    /// Appends an interceptor shared with other actions.
    #[must_use]
    pub fn intercept_shared(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.interceptors = self.interceptors.with_shared(interceptor);
        self
    }

    /// Returns the method name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the declared visibility.
    #[must_use]
    pub const fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Returns the route, if declared.
    #[must_use]
    pub const fn route_decl(&self) -> Option<&Route> {
        self.route.as_ref()
    }

    /// Returns `true` when the method returns an action result.
    #[must_use]
    pub const fn returns_action_result(&self) -> bool {
        matches!(self.returns, Returns::ActionResult(_))
    }
}

impl<C> std::fmt::Debug for MethodDecl<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodDecl")
            .field("name", &self.name)
            .field("visibility", &self.visibility)
            .field("route", &self.route)
            .field("returns_action_result", &matches!(self.returns, Returns::ActionResult(_)))
            .field("content_type", &self.content_type)
            .field("interceptors", &self.interceptors)
            .field("params", &self.params.len())
            .finish()
    }
}
