//! Registry construction and lookup.

use crate::controller::{Controller, MethodDecl, Returns, Visibility};
use crate::descriptor::ActionDescriptor;
use crate::error::RegistrationFault;
use crate::route::{Route, RouteRef};
use http::Method;
use indexmap::IndexMap;

/// Collects controllers and validates them into an [`ActionRegistry`].
///
/// # Example
///
/// ```
/// use ferrule_core::{ActionContext, ActionResult, ActionReturn};
/// use ferrule_extract::Arguments;
/// use ferrule_router::{Controller, MethodDecl, RegistryBuilder};
/// use http::Method;
///
/// #[derive(Default)]
/// struct Health;
///
/// impl Controller for Health {
///     fn methods() -> Vec<MethodDecl<Self>> {
///         vec![MethodDecl::action("ping", |_: &mut Self, _: &mut ActionContext<'_>, _: Arguments| -> ActionReturn {
///             Ok(Some(ActionResult::text("pong")))
///         })
///         .get("/ping")]
///     }
/// }
///
/// let registry = RegistryBuilder::new().controller::<Health>().build().unwrap();
/// assert!(registry.find(&Method::GET, "/ping").is_some());
/// assert!(registry.find(&Method::GET, "/ping/").is_none());
/// ```
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    entries: Vec<Result<ActionDescriptor, RegistrationFault>>,
}

impl RegistryBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds every method a controller declares.
    #[must_use]
    pub fn controller<C: Controller>(mut self) -> Self {
        self.entries
            .extend(C::methods().into_iter().filter_map(classify::<C>));
        self
    }

    /// Validates all declarations and freezes the registry.
    ///
    /// Fails on the first invalid declaration, in registration order.
    pub fn build(self) -> Result<ActionRegistry, RegistrationFault> {
        let mut actions: IndexMap<Route, ActionDescriptor> = IndexMap::new();

        for entry in self.entries {
            let descriptor = entry?;
            if let Some(existing) = actions.get(descriptor.route()) {
                return Err(RegistrationFault::DuplicateRoute {
                    controller: descriptor.controller().to_string(),
                    method: descriptor.method().to_string(),
                    route: descriptor.route().to_string(),
                    existing: existing.qualified_name(),
                });
            }
            tracing::debug!(
                action = %descriptor.qualified_name(),
                route = %descriptor.route(),
                "registered action"
            );
            actions.insert(descriptor.route().clone(), descriptor);
        }

        tracing::info!(actions = actions.len(), "action registry built");
        Ok(ActionRegistry { actions })
    }
}

/// Turns one declaration into an action, a fault, or nothing.
fn classify<C: Controller>(
    decl: MethodDecl<C>,
) -> Option<Result<ActionDescriptor, RegistrationFault>> {
    let controller = C::name().to_string();
    let method = decl.name.to_string();

    let fault = match (decl.route, decl.returns) {
        (None, Returns::Other) => return None,
        (Some(_), Returns::Other) => {
            RegistrationFault::RouteWithoutActionResult { controller, method }
        }
        (None, Returns::ActionResult(_)) => {
            RegistrationFault::ActionResultWithoutRoute { controller, method }
        }
        (Some(_), Returns::ActionResult(_)) if decl.visibility == Visibility::Private => {
            RegistrationFault::NotPublic { controller, method }
        }
        (Some(route), Returns::ActionResult(handler)) => {
            return Some(Ok(ActionDescriptor::new::<C>(
                decl.name,
                route,
                decl.params,
                decl.content_type,
                decl.interceptors,
                handler,
            )))
        }
    };
    Some(Err(fault))
}

/// The frozen set of actions, looked up by exact verb and path.
///
/// Shared read-only across concurrent dispatches.
#[derive(Debug, Default)]
pub struct ActionRegistry {
    actions: IndexMap<Route, ActionDescriptor>,
}

impl ActionRegistry {
    /// Finds the action for a verb and path. Both must match exactly.
    #[must_use]
    pub fn find(&self, method: &Method, path: &str) -> Option<&ActionDescriptor> {
        self.actions.get(&RouteRef::new(method, path))
    }

    /// Iterates over actions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ActionDescriptor> {
        self.actions.values()
    }

    /// Iterates over the registered routes in registration order.
    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.actions.keys()
    }

    /// Returns the number of actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Returns `true` when no action is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
