//! The serialized response handed back to the transport.

use bytes::Bytes;
use ferrule_core::CookieJar;
use http::header::{HeaderValue, SET_COOKIE};
use http::{HeaderMap, Response, StatusCode};
use http_body_util::Full;

/// Response body type used by the hyper adapter.
pub type ResponseBody = Full<Bytes>;

/// A fully serialized response: status, headers and body bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl WireResponse {
    /// Creates an empty response with the given status.
    #[must_use]
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Sets the body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Returns the status code.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the headers for modification.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Returns a header value as a string, if present and valid.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the body bytes.
    #[must_use]
    pub const fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the body as text, replacing invalid UTF-8.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Appends one `Set-Cookie` header per cookie in the jar.
    ///
    /// Cookies whose rendering is not a valid header value are skipped.
    pub fn append_cookies(&mut self, jar: &CookieJar) {
        for cookie in jar.to_header_values() {
            match HeaderValue::try_from(cookie) {
                Ok(value) => {
                    self.headers.append(SET_COOKIE, value);
                }
                Err(err) => {
                    tracing::warn!(error = %err, "dropping cookie with invalid header value");
                }
            }
        }
    }

    /// Converts into an `http::Response` for hyper.
    #[must_use]
    pub fn into_http(self) -> Response<ResponseBody> {
        let mut response = Response::new(Full::new(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}
