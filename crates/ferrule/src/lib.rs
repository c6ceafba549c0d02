//! # Ferrule
//!
//! **Declarative HTTP action dispatch and argument binding**
//!
//! Controllers declare their actions once: verb, exact path, accepted
//! content type, interceptors and parameters. Ferrule freezes those
//! declarations into a registry at startup, then for every request it
//! routes, runs the interceptors, binds arguments from the query and body,
//! invokes the action and serializes its result.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ferrule::prelude::*;
//!
//! #[derive(Default)]
//! struct UsersController;
//!
//! impl UsersController {
//!     fn get_user(&mut self, _ctx: &mut ActionContext<'_>, mut args: Arguments) -> ActionReturn {
//!         let id: i64 = args.take("id")?;
//!         Ok(Some(ActionResult::Json(serde_json::json!({ "id": id }))))
//!     }
//! }
//!
//! impl Controller for UsersController {
//!     fn methods() -> Vec<MethodDecl<Self>> {
//!         vec![MethodDecl::action("get_user", Self::get_user)
//!             .get("/users")
//!             .param(ParameterSpec::int("id"))]
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigLoader::new().with_env_prefix("FERRULE").load()?;
//!     let registry = RegistryBuilder::new().controller::<UsersController>().build()?;
//!
//!     ferrule::server_from_config(registry, &config, Hooks::default())?
//!         .run()
//!         .await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Request flow
//!
//! ```text
//! Request → Registry lookup → Interceptors → Binder → Action
//!                                                       ↓
//! Response ← Hooks ← Serializer / Error Translator ←────┘
//! ```

#![doc(html_root_url = "https://docs.rs/ferrule/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub use ferrule_config as config;
pub use ferrule_core as core;
pub use ferrule_extract as extract;
pub use ferrule_middleware as middleware;
pub use ferrule_router as router;
pub use ferrule_server as server;
pub use ferrule_telemetry as telemetry;

use ferrule_config::FerruleConfig;
use ferrule_extract::BinderOptions;
use ferrule_router::ActionRegistry;
use ferrule_server::{Dispatcher, Hooks, Server, ServerConfig, ServerError};

/// Builds a dispatcher from loaded configuration.
///
/// Uses `server.server_name` for the `Server` header and the `binding`
/// section for the binder.
pub fn dispatcher_from_config(
    registry: ActionRegistry,
    config: &FerruleConfig,
    hooks: Hooks,
) -> Result<Dispatcher, ServerError> {
    Dispatcher::builder(registry)
        .server_name(config.server.server_name.clone())
        .binder_options(BinderOptions {
            sole_file_part_fallback: config.binding.sole_file_part_fallback,
        })
        .hooks(hooks)
        .build()
}

/// Builds a ready-to-run server from loaded configuration.
pub fn server_from_config(
    registry: ActionRegistry,
    config: &FerruleConfig,
    hooks: Hooks,
) -> Result<Server, ServerError> {
    let dispatcher = dispatcher_from_config(registry, config, hooks)?;
    Ok(Server::new(dispatcher, ServerConfig::from(&config.server)))
}

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust,ignore
/// use ferrule::prelude::*;
/// ```
pub mod prelude {
    pub use ferrule_config::{ConfigLoader, FerruleConfig};

    pub use ferrule_core::{
        ActionContext, ActionError, ActionResult, ActionReturn, FilePart, HttpFault,
        IncomingRequest,
    };

    pub use ferrule_extract::{Arguments, BinderOptions, ParameterSpec, SupportedContentType};

    pub use ferrule_middleware::stages::{RateLimit, RequireHeader};
    pub use ferrule_middleware::{FnInterceptor, Interceptor};

    pub use ferrule_router::{Controller, MethodDecl, RegistrationFault, RegistryBuilder};

    pub use ferrule_server::{Dispatcher, Hooks, Server, ServerConfig, ShutdownSignal};

    pub use ferrule_telemetry::{init_logging, LogConfig};
}
