//! Header presence guard.

use crate::interceptor::Interceptor;
use ferrule_core::{ActionResult, IncomingRequest};
use http::HeaderName;

/// Answers requests that lack a header.
///
/// Typical use is bouncing unauthenticated browsers to a login page.
///
/// # Example
///
/// ```
/// use ferrule_core::{ActionResult, IncomingRequest};
/// use ferrule_middleware::Interceptor;
/// use ferrule_middleware::stages::RequireHeader;
/// use http::{HeaderName, HeaderValue, Method};
///
/// let guard = RequireHeader::new(HeaderName::from_static("x-api-key"))
///     .respond_with(ActionResult::text("api key required"));
///
/// let anonymous = IncomingRequest::new(Method::GET, "/reports");
/// assert_eq!(guard.intercept(&anonymous), Some(ActionResult::text("api key required")));
///
/// let keyed = anonymous.with_header("x-api-key", HeaderValue::from_static("k-123"));
/// assert_eq!(guard.intercept(&keyed), None);
/// ```
#[derive(Debug, Clone)]
pub struct RequireHeader {
    header: HeaderName,
    name: String,
    response: ActionResult,
}

impl RequireHeader {
    /// Requires `header`; by default answers with a short text result.
    #[must_use]
    pub fn new(header: HeaderName) -> Self {
        Self {
            name: format!("require-header:{header}"),
            response: ActionResult::text(format!("missing required header '{header}'")),
            header,
        }
    }

    /// Answers with a redirect instead.
    #[must_use]
    pub fn redirect_to(mut self, location: impl Into<String>) -> Self {
        self.response = ActionResult::redirect(location);
        self
    }

    /// Answers with the given result instead.
    #[must_use]
    pub fn respond_with(mut self, response: ActionResult) -> Self {
        self.response = response;
        self
    }
}

impl Interceptor for RequireHeader {
    fn name(&self) -> &str {
        &self.name
    }

    fn intercept(&self, request: &IncomingRequest) -> Option<ActionResult> {
        let present = request
            .headers()
            .get(&self.header)
            .is_some_and(|value| !value.is_empty());
        (!present).then(|| self.response.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::AUTHORIZATION;
    use http::{HeaderValue, Method};

    #[test]
    fn test_default_response_names_header() {
        let guard = RequireHeader::new(AUTHORIZATION);
        let result = guard.intercept(&IncomingRequest::new(Method::GET, "/"));
        assert_eq!(
            result,
            Some(ActionResult::text("missing required header 'authorization'"))
        );
        assert_eq!(guard.name(), "require-header:authorization");
    }

    #[test]
    fn test_empty_value_counts_as_missing() {
        let guard = RequireHeader::new(AUTHORIZATION).redirect_to("/login");
        let request = IncomingRequest::new(Method::GET, "/")
            .with_header(AUTHORIZATION, HeaderValue::from_static(""));
        assert_eq!(guard.intercept(&request), Some(ActionResult::redirect("/login")));
    }

    #[test]
    fn test_present_header_passes() {
        let guard = RequireHeader::new(AUTHORIZATION);
        let request = IncomingRequest::new(Method::GET, "/")
            .with_header(AUTHORIZATION, HeaderValue::from_static("Bearer t"));
        assert!(guard.intercept(&request).is_none());
    }
}
