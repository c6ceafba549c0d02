//! Registration faults.

use thiserror::Error;

/// A controller method whose declaration cannot become an action.
///
/// Any fault aborts registry construction, so a misdeclared action stops the
/// process before it serves traffic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationFault {
    /// A routed method does not return an `ActionResult`.
    #[error(
        "Method {method} in controller {controller} has a route declared but returns no ActionResult"
    )]
    RouteWithoutActionResult {
        /// Controller name.
        controller: String,
        /// Method name.
        method: String,
    },

    /// A method returning an `ActionResult` has no route.
    #[error("Method {method} in controller {controller} returns an ActionResult but has no route declared")]
    ActionResultWithoutRoute {
        /// Controller name.
        controller: String,
        /// Method name.
        method: String,
    },

    /// A routed method is not public.
    #[error("Action {method} in controller {controller} is not public")]
    NotPublic {
        /// Controller name.
        controller: String,
        /// Method name.
        method: String,
    },

    /// Two actions declare the same verb and path.
    #[error("Action {method} in controller {controller} declares {route}, already taken by {existing}")]
    DuplicateRoute {
        /// Controller name.
        controller: String,
        /// Method name.
        method: String,
        /// The contested route.
        route: String,
        /// The action that registered it first.
        existing: String,
    },
}

impl RegistrationFault {
    /// Returns the controller that declared the faulty method.
    #[must_use]
    pub fn controller(&self) -> &str {
        match self {
            Self::RouteWithoutActionResult { controller, .. }
            | Self::ActionResultWithoutRoute { controller, .. }
            | Self::NotPublic { controller, .. }
            | Self::DuplicateRoute { controller, .. } => controller,
        }
    }

    /// Returns the faulty method.
    #[must_use]
    pub fn method(&self) -> &str {
        match self {
            Self::RouteWithoutActionResult { method, .. }
            | Self::ActionResultWithoutRoute { method, .. }
            | Self::NotPublic { method, .. }
            | Self::DuplicateRoute { method, .. } => method,
        }
    }
}
