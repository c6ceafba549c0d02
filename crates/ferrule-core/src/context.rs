//! Per-request state handed to an action.

use crate::cookie::{self, CookieJar};
use crate::request::IncomingRequest;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// A unique identifier for each dispatch, using UUID v7.
///
/// UUID v7 is time-ordered, which keeps log correlation sortable.
///
/// ```
/// use ferrule_core::RequestId;
///
/// let a = RequestId::new();
/// let b = RequestId::new();
/// assert_ne!(a, b);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new request ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RequestId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Addresses of the connection a request arrived on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectionInfo {
    remote_addr: Option<SocketAddr>,
    local_addr: Option<SocketAddr>,
}

impl ConnectionInfo {
    /// Creates connection info from the peer and local addresses.
    #[must_use]
    pub const fn new(remote_addr: SocketAddr, local_addr: SocketAddr) -> Self {
        Self {
            remote_addr: Some(remote_addr),
            local_addr: Some(local_addr),
        }
    }

    /// Returns the peer address.
    #[must_use]
    pub const fn remote_addr(&self) -> Option<SocketAddr> {
        self.remote_addr
    }

    /// Returns the local address.
    #[must_use]
    pub const fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }
}

/// Everything an action can see about the request it is serving.
///
/// A fresh context is built for every dispatch; nothing in it outlives the
/// request except the cookies, which are merged into the response.
#[derive(Debug)]
pub struct ActionContext<'a> {
    request_id: RequestId,
    request: &'a IncomingRequest,
    connection: &'a ConnectionInfo,
    cookies: CookieJar,
    started_at: Instant,
}

impl<'a> ActionContext<'a> {
    /// Creates a context with an empty cookie jar.
    #[must_use]
    pub fn new(
        request_id: RequestId,
        request: &'a IncomingRequest,
        connection: &'a ConnectionInfo,
    ) -> Self {
        Self {
            request_id,
            request,
            connection,
            cookies: CookieJar::new(),
            started_at: Instant::now(),
        }
    }

    /// Returns the request ID.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the request being served.
    #[must_use]
    pub const fn request(&self) -> &'a IncomingRequest {
        self.request
    }

    /// Returns the connection addresses.
    #[must_use]
    pub const fn connection(&self) -> &'a ConnectionInfo {
        self.connection
    }

    /// Returns the cookies set so far.
    #[must_use]
    pub const fn cookies(&self) -> &CookieJar {
        &self.cookies
    }

    /// Returns the cookie jar for modification.
    pub fn cookies_mut(&mut self) -> &mut CookieJar {
        &mut self.cookies
    }

    /// Sets a response cookie.
    pub fn set_cookie(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.cookies.set(name, value);
    }

    /// Reads a cookie the client sent.
    #[must_use]
    pub fn request_cookie(&self, name: &str) -> Option<String> {
        cookie::request_cookie(self.request.headers(), name)
    }

    /// Returns the time elapsed since the context was created.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Consumes the context, returning its cookies.
    #[must_use]
    pub fn into_cookies(self) -> CookieJar {
        self.cookies
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::COOKIE;
    use http::{HeaderValue, Method};

    #[test]
    fn test_request_id_display_is_uuid() {
        let id = RequestId::new();
        assert_eq!(id.to_string().len(), 36);
        assert_eq!(id.as_uuid().get_version_num(), 7);
    }

    #[test]
    fn test_context_cookies() {
        let request = IncomingRequest::new(Method::GET, "/")
            .with_header(COOKIE, HeaderValue::from_static("visits=3"));
        let connection = ConnectionInfo::default();
        let mut ctx = ActionContext::new(RequestId::new(), &request, &connection);

        assert_eq!(ctx.request_cookie("visits"), Some("3".to_string()));
        ctx.set_cookie("visits", "4");
        assert_eq!(ctx.cookies().get("visits"), Some("4"));
        assert_eq!(ctx.into_cookies().len(), 1);
    }

    #[test]
    fn test_connection_info() {
        let remote: SocketAddr = "10.0.0.1:5000".parse().unwrap();
        let local: SocketAddr = "127.0.0.1:8080".parse().unwrap();
        let info = ConnectionInfo::new(remote, local);
        assert_eq!(info.remote_addr(), Some(remote));
        assert_eq!(info.local_addr(), Some(local));
        assert_eq!(ConnectionInfo::default().remote_addr(), None);
    }
}
