//! # Ferrule Server
//!
//! Request dispatch and the HTTP transport for Ferrule.
//!
//! - [`Dispatcher`] - Routes a request, runs interceptors, binds arguments,
//!   invokes the action and serializes its result
//! - [`ResultSerializer`] - Turns an `ActionResult` into a [`WireResponse`]
//! - [`ErrorTranslator`] - Renders faults and unhandled failures
//! - [`Hooks`] - Observability callbacks
//! - [`Server`] - hyper HTTP/1.1 server with graceful shutdown
//!
//! The dispatcher is synchronous and transport-neutral. The server reads
//! each body on the async runtime, then dispatches on the blocking pool.
//!
//! ## Example
//!
//! ```rust,ignore
//! use ferrule_router::RegistryBuilder;
//! use ferrule_server::{Dispatcher, Server, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = RegistryBuilder::new().controller::<UsersController>().build()?;
//!     let dispatcher = Dispatcher::builder(registry).server_name("Users").build()?;
//!
//!     Server::new(dispatcher, ServerConfig::default()).run().await?;
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/ferrule-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
mod dispatcher;
mod error;
mod hooks;
mod response;
mod serializer;
mod server;
pub mod shutdown;
pub mod transport;
mod translator;

pub use config::{ServerConfig, ServerConfigBuilder};
pub use dispatcher::{Dispatcher, DispatcherBuilder};
pub use error::ServerError;
pub use hooks::{
    ExceptionHook, Hooks, HttpErrorHook, RequestEndHook, RequestStartHook, SendHook,
};
pub use response::{ResponseBody, WireResponse};
pub use serializer::{to_ascii_json, AsciiFormatter, ResultSerializer, DEFAULT_SERVER_NAME};
pub use server::{bind, Server};
pub use shutdown::{ConnectionToken, ConnectionTracker, ShutdownSignal};
pub use translator::{ErrorTranslator, GENERIC_FAILURE_MESSAGE};
