//! Lumora - account registration and token authentication service

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;

use config::{Config, LoggingConfig};
use lumora_api::{AppState, create_router};
use lumora_auth::{AuthResolver, AuthService, JwtManager};
use lumora_db::Database;

/// Lumora - account registration and token authentication service
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Bind address
    #[arg(long, env = "LUMORA_BIND")]
    bind: Option<String>,

    /// Port
    #[arg(short, long, env = "LUMORA_PORT")]
    port: Option<u16>,

    /// Database connection string
    #[arg(long, env = "LUMORA_DATABASE_URL")]
    database_url: Option<String>,

    /// Token signing secret
    #[arg(long, env = "LUMORA_JWT_SECRET", hide_env_values = true)]
    jwt_secret: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration
    let mut config = Config::load(&args.config)?;
    if let Some(url) = args.database_url {
        config.database.url = url;
    }
    if let Some(secret) = args.jwt_secret {
        config.auth.jwt_secret = Some(secret);
    }

    // Initialize logging
    init_logging(&config.logging);

    info!("Starting Lumora v{}", env!("CARGO_PKG_VERSION"));

    // A bad signing setup must stop startup before anything listens
    let jwt = Arc::new(
        JwtManager::new(&config.jwt_config()?).context("Invalid authentication configuration")?,
    );

    // Initialize database
    let db = Database::new(&config.database.url, config.database.max_connections).await?;

    let cookie = config.cookie_settings()?;
    if !cookie.secure {
        warn!("Token cookie is sent without the Secure attribute");
    }

    let auth = Arc::new(AuthService::new(db.clone(), jwt.clone(), cookie.clone())?);
    let resolver = Arc::new(AuthResolver::new(db.clone(), jwt, cookie));

    // Create application state
    let state = AppState::new(db, auth, resolver);

    // Create router
    let app = create_router(state).layer(TraceLayer::new_for_http());

    // Determine bind address
    if let Some(bind) = args.bind {
        config.server.bind_address = bind;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    let addr = config.server.socket_addr()?;

    info!("Listening on {}", addr);
    info!("Environment: {}", config.environment);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Initialize logging
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format.eq_ignore_ascii_case("json") {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
