//! HTTP server.
//!
//! A hyper HTTP/1.1 server on Tokio. Each connection runs on its own task;
//! each request body is read asynchronously and then dispatched on the
//! blocking pool, since actions are synchronous.
//!
//! # Example
//!
//! ```rust,ignore
//! use ferrule_server::{Dispatcher, Server, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = build_registry()?;
//!     let config = ServerConfig::builder().http_addr("0.0.0.0:8080").build();
//!
//!     Server::new(Dispatcher::new(registry), config).run().await?;
//!     Ok(())
//! }
//! ```

use crate::config::ServerConfig;
use crate::dispatcher::Dispatcher;
use crate::error::ServerError;
use crate::response::ResponseBody;
use crate::shutdown::{ConnectionTracker, ShutdownSignal};
use crate::transport::{self, BodyLimits};
use ferrule_core::{ConnectionInfo, IncomingRequest};
use http::{Request, Response, StatusCode};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};

/// Serves a [`Dispatcher`] over HTTP.
#[derive(Debug)]
pub struct Server {
    dispatcher: Arc<Dispatcher>,
    config: ServerConfig,
}

impl Server {
    /// Creates a server.
    #[must_use]
    pub fn new(dispatcher: Dispatcher, config: ServerConfig) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            config,
        }
    }

    /// Returns the dispatcher.
    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Runs until SIGTERM or SIGINT.
    pub async fn run(self) -> Result<(), ServerError> {
        let shutdown = ShutdownSignal::with_os_signals();
        self.run_with_shutdown(shutdown).await
    }

    /// Binds the configured address and runs until `shutdown` fires.
    pub async fn run_with_shutdown(self, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let addr = self.config.socket_addr().map_err(|e| {
            ServerError::Bind(format!(
                "invalid address '{}': {e}",
                self.config.http_addr()
            ))
        })?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Bind(format!("failed to bind to {addr}: {e}")))?;

        self.serve(listener, shutdown).await
    }

    /// Runs on an already bound listener until `shutdown` fires.
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown: ShutdownSignal,
    ) -> Result<(), ServerError> {
        let local_addr = listener.local_addr()?;
        tracing::info!(
            addr = %local_addr,
            actions = self.dispatcher.registry().len(),
            "Server listening"
        );

        let server = Arc::new(self);
        let tracker = ConnectionTracker::new();

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, remote_addr)) => {
                        let server = Arc::clone(&server);
                        let token = tracker.acquire();
                        let shutdown = shutdown.clone();
                        let connection = ConnectionInfo::new(remote_addr, local_addr);

                        tokio::spawn(async move {
                            if let Err(err) = server.serve_connection(stream, connection, shutdown).await {
                                tracing::debug!(
                                    remote_addr = %remote_addr,
                                    error = %err,
                                    "Connection closed with error"
                                );
                            }
                            drop(token);
                        });
                    }
                    Err(err) => tracing::error!(error = %err, "Failed to accept connection"),
                },
                () = shutdown.recv() => {
                    tracing::info!("Shutdown signal received, no longer accepting connections");
                    break;
                }
            }
        }

        let timeout = server.config.shutdown_timeout();
        tracing::info!(
            active = tracker.active_connections(),
            timeout_secs = timeout.as_secs(),
            "Draining connections"
        );
        tokio::select! {
            () = tracker.wait_idle() => tracing::info!("All connections closed"),
            () = tokio::time::sleep(timeout) => tracing::warn!(
                active = tracker.active_connections(),
                "Shutdown timeout reached with connections still open"
            ),
        }

        tracing::info!("Server stopped");
        Ok(())
    }

    async fn serve_connection(
        self: &Arc<Self>,
        stream: TcpStream,
        connection: ConnectionInfo,
        shutdown: ShutdownSignal,
    ) -> Result<(), hyper::Error> {
        let io = TokioIo::new(stream);
        let server = Arc::clone(self);

        let service = service_fn(move |request: Request<Incoming>| {
            let server = Arc::clone(&server);
            async move { Ok::<_, Infallible>(server.handle(request, connection).await) }
        });

        let mut builder = http1::Builder::new();
        builder.keep_alive(self.config.keep_alive_timeout().is_some());
        let conn = builder.serve_connection(io, service);
        tokio::pin!(conn);

        tokio::select! {
            result = conn.as_mut() => result,
            () = shutdown.recv() => {
                conn.as_mut().graceful_shutdown();
                conn.await
            }
        }
    }

    async fn handle(
        &self,
        request: Request<Incoming>,
        connection: ConnectionInfo,
    ) -> Response<ResponseBody> {
        let (parts, body) = request.into_parts();
        let head = transport::request_head(parts);
        let limits = BodyLimits {
            max_bytes: self.config.max_body_bytes(),
            timeout: self.config.request_timeout(),
        };

        let request = match transport::read_body(&head, body, limits).await {
            Ok(body) => head.with_body(body),
            Err(err) => {
                tracing::warn!(error = %err, "Rejected request body");
                return self
                    .dispatcher
                    .protocol_error(&head, &connection, err.status_code(), &err.to_string())
                    .into_http();
            }
        };

        self.dispatch_blocking(request, connection).await
    }

    async fn dispatch_blocking(
        &self,
        request: IncomingRequest,
        connection: ConnectionInfo,
    ) -> Response<ResponseBody> {
        let dispatcher = Arc::clone(&self.dispatcher);
        let head = IncomingRequest::new(request.method().clone(), request.path());

        let joined =
            tokio::task::spawn_blocking(move || dispatcher.dispatch(&request, &connection)).await;

        match joined {
            Ok(response) => response.into_http(),
            Err(err) => {
                tracing::error!(error = %err, "Dispatch task failed");
                self.dispatcher
                    .protocol_error(
                        &head,
                        &connection,
                        StatusCode::INTERNAL_SERVER_ERROR,
                        crate::translator::GENERIC_FAILURE_MESSAGE,
                    )
                    .into_http()
            }
        }
    }
}

/// Binds `addr` and returns the listener with its resolved address.
///
/// Useful with port `0` to let the OS pick a free port.
pub async fn bind(addr: &str) -> Result<(TcpListener, SocketAddr), ServerError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::Bind(format!("failed to bind to {addr}: {e}")))?;
    let local = listener.local_addr()?;
    Ok((listener, local))
}
