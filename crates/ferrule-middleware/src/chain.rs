//! Ordered interceptor chains.

use crate::interceptor::Interceptor;
use ferrule_core::{ActionResult, IncomingRequest};
use std::fmt;
use std::sync::Arc;

/// The interceptors declared on one action, in declaration order.
#[derive(Clone, Default)]
pub struct InterceptorChain {
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl InterceptorChain {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an interceptor.
    #[must_use]
    pub fn with<I: Interceptor>(mut self, interceptor: I) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    /// Appends a shared interceptor.
    #[must_use]
    pub fn with_shared(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    /// Returns the number of interceptors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    /// Returns `true` when the chain is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    /// Returns the interceptor names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.interceptors.iter().map(|interceptor| interceptor.name())
    }

    /// Runs the chain, returning the first result produced.
    pub fn run(&self, request: &IncomingRequest) -> Option<ActionResult> {
        self.run_named(request).map(|(_, result)| result)
    }

    /// Like [`run`](Self::run), also naming the interceptor that answered.
    pub fn run_named(&self, request: &IncomingRequest) -> Option<(&str, ActionResult)> {
        self.interceptors.iter().find_map(|interceptor| {
            let result = interceptor.intercept(request)?;
            tracing::debug!(
                interceptor = interceptor.name(),
                result = result.kind(),
                path = request.path(),
                "interceptor short-circuited request"
            );
            Some((interceptor.name(), result))
        })
    }
}

impl FromIterator<Arc<dyn Interceptor>> for InterceptorChain {
    fn from_iter<T: IntoIterator<Item = Arc<dyn Interceptor>>>(iter: T) -> Self {
        Self {
            interceptors: iter.into_iter().collect(),
        }
    }
}

impl fmt::Debug for InterceptorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
