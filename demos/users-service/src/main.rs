//! Users Service
//!
//! A small users API served by Ferrule. Configuration comes from an optional
//! `users-service.toml`, a `.env` file and `FERRULE__*` environment
//! variables, in that order of precedence from lowest to highest.
//!
//! ```text
//! FERRULE__SERVER__HTTP_ADDR=127.0.0.1:3000 cargo run -p users-service
//! curl -X POST localhost:3000/users -H 'content-type: application/json' \
//!     -d '{"name":"Ada","email":"ada@example.com"}'
//! curl 'localhost:3000/users/find?id=1'
//! ```

mod users;

use anyhow::Context;
use ferrule::prelude::*;
use ferrule::telemetry::metrics::describe_metrics;
use tracing::info;
use users::UsersController;

fn load_config() -> anyhow::Result<FerruleConfig> {
    ConfigLoader::new()
        .with_optional_file("users-service.toml")?
        .with_dotenv()?
        .with_env_prefix("FERRULE")
        .load()
        .context("invalid configuration")
}

fn hooks() -> Hooks {
    Hooks::new().on_request_end(|request, response, connection| {
        info!(
            http.method = %request.method(),
            http.path = request.path(),
            http.status_code = response.status().as_u16(),
            client.address = ?connection.remote_addr(),
            "Access"
        );
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config()?;
    init_logging(&LogConfig::from(&config.logging)).context("failed to initialize logging")?;
    describe_metrics();

    info!(
        service = %config.logging.service_name,
        addr = %config.server.http_addr,
        "Starting users service"
    );

    let registry = RegistryBuilder::new()
        .controller::<UsersController>()
        .build()
        .context("failed to register controllers")?;

    ferrule::server_from_config(registry, &config, hooks())?
        .run()
        .await?;

    info!("Users service stopped");
    Ok(())
}
