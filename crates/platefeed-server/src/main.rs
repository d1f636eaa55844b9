use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use platefeed_server::api::{self, AppState};
use platefeed_server::config::ServerConfig;
use platefeed_server::media::MediaCdnClient;
use platefeed_server::token::TokenAuthority;
use platefeed_store::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,platefeed_server=debug")),
        )
        .init();

    info!("Starting platefeed server v{}", env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration (aborts if media storage credentials are missing)
    // -----------------------------------------------------------------------
    let config = ServerConfig::from_env()?;
    info!(
        addr = %config.http_addr,
        db = %config.database_path.display(),
        storage = %config.storage_url_endpoint,
        "Loaded configuration"
    );

    // -----------------------------------------------------------------------
    // 3. Initialize subsystems
    // -----------------------------------------------------------------------
    let db = Arc::new(Database::open_at(&config.database_path)?);
    let tokens = TokenAuthority::new(config.token_secret);
    let media = Arc::new(MediaCdnClient::new(&config));

    let app_state = AppState {
        db,
        tokens,
        media,
        config: Arc::new(config.clone()),
    };

    // -----------------------------------------------------------------------
    // 4. Run the HTTP API server until shutdown
    // -----------------------------------------------------------------------
    tokio::select! {
        result = api::serve(app_state, config.http_addr) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
