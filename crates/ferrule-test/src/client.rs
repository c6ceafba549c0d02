//! In-memory client that drives a [`Dispatcher`].

use crate::error::TestError;
use crate::request::{MultipartForm, TestRequest, TestRequestBuilder};
use crate::response::TestResponse;
use bytes::Bytes;
use ferrule_core::ConnectionInfo;
use ferrule_server::transport::{self, BodyLimits};
use ferrule_server::{Dispatcher, ServerConfig};
use http::Method;
use serde::Serialize;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

/// A client that sends requests straight to a [`Dispatcher`].
///
/// Requests go through the same body materialization as the HTTP server,
/// so form and multipart bodies are parsed exactly as they would be on the
/// wire. No socket is opened.
///
/// # Example
///
/// ```ignore
/// use ferrule_test::TestClient;
///
/// let client = TestClient::new(Dispatcher::new(registry));
/// let response = client.get("/users").query("id", 5).send().await;
/// response.assert_status_code(200);
/// ```
#[must_use]
#[derive(Clone)]
pub struct TestClient {
    dispatcher: Arc<Dispatcher>,
    default_headers: Vec<(String, String)>,
    connection: ConnectionInfo,
    limits: BodyLimits,
}

impl TestClient {
    /// Creates a client over `dispatcher`.
    pub fn new(dispatcher: Dispatcher) -> Self {
        let defaults = ServerConfig::default();
        Self {
            dispatcher: Arc::new(dispatcher),
            default_headers: Vec::new(),
            connection: ConnectionInfo::new(
                SocketAddr::from((Ipv4Addr::LOCALHOST, 50000)),
                SocketAddr::from((Ipv4Addr::LOCALHOST, 8080)),
            ),
            limits: BodyLimits {
                max_bytes: defaults.max_body_bytes(),
                timeout: defaults.request_timeout(),
            },
        }
    }

    /// Adds a header sent with every request.
    pub fn with_default_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Overrides the peer address the dispatcher sees.
    pub fn with_remote_addr(mut self, remote: SocketAddr) -> Self {
        let local = self
            .connection
            .local_addr()
            .unwrap_or_else(|| SocketAddr::from((Ipv4Addr::LOCALHOST, 8080)));
        self.connection = ConnectionInfo::new(remote, local);
        self
    }

    /// Sets the largest accepted body.
    pub fn with_max_body_bytes(mut self, max_bytes: usize) -> Self {
        self.limits.max_bytes = max_bytes;
        self
    }

    /// Returns the dispatcher.
    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Starts a GET request.
    pub fn get(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::get(uri))
    }

    /// Starts a POST request.
    pub fn post(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::post(uri))
    }

    /// Starts a PUT request.
    pub fn put(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::put(uri))
    }

    /// Starts a DELETE request.
    pub fn delete(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::delete(uri))
    }

    /// Starts a request with any method.
    pub fn request(&self, method: Method, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequestBuilder::new(method, uri))
    }

    /// Sends a built request.
    pub async fn execute(&self, request: TestRequest) -> Result<TestResponse, TestError> {
        let (parts, body) = request.into_http_request()?.into_parts();
        let head = transport::request_head(parts);

        let response = match transport::read_body(&head, body, self.limits).await {
            Ok(body) => self
                .dispatcher
                .dispatch(&head.with_body(body), &self.connection),
            Err(err) => self.dispatcher.protocol_error(
                &head,
                &self.connection,
                err.status_code(),
                &err.to_string(),
            ),
        };
        Ok(response.into())
    }
}

impl std::fmt::Debug for TestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestClient")
            .field("actions", &self.dispatcher.registry().len())
            .field("default_headers", &self.default_headers)
            .finish_non_exhaustive()
    }
}

/// A request builder bound to a [`TestClient`].
#[must_use]
pub struct TestClientRequest<'a> {
    client: &'a TestClient,
    builder: TestRequestBuilder,
}

impl<'a> TestClientRequest<'a> {
    fn new(client: &'a TestClient, mut builder: TestRequestBuilder) -> Self {
        for (name, value) in &client.default_headers {
            builder = builder.header(name, value);
        }
        Self { client, builder }
    }

    /// Sets a header.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.builder = self.builder.header(name, value);
        self
    }

    /// Sets the `Content-Type` header.
    pub fn content_type(mut self, content_type: impl AsRef<str>) -> Self {
        self.builder = self.builder.content_type(content_type);
        self
    }

    /// Sends a cookie.
    pub fn cookie(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.builder = self.builder.cookie(name, value);
        self
    }

    /// Appends a query parameter.
    pub fn query(mut self, name: impl AsRef<str>, value: impl ToString) -> Self {
        self.builder = self.builder.query(name, value);
        self
    }

    /// Sets a raw body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.builder = self.builder.body(body);
        self
    }

    /// Sets a JSON body.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        self.builder = self.builder.json(value);
        self
    }

    /// Sets a URL-encoded form body.
    pub fn form<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        self.builder = self.builder.form(value);
        self
    }

    /// Sets a multipart body.
    pub fn multipart(mut self, form: MultipartForm) -> Self {
        self.builder = self.builder.multipart(form);
        self
    }

    /// Sends the request.
    ///
    /// # Panics
    ///
    /// Panics if the request could not be built.
    pub async fn send(self) -> TestResponse {
        match self.try_send().await {
            Ok(response) => response,
            Err(err) => panic!("test request failed: {err}"),
        }
    }

    /// Sends the request, returning build errors.
    pub async fn try_send(self) -> Result<TestResponse, TestError> {
        let request = self.builder.build()?;
        self.client.execute(request).await
    }
}
