//! Authgate Backend
//!
//! A small authentication service: registration, login, bearer tokens and
//! a role-gated user listing.
//!
//! ## Architecture
//!
//! The backend follows a layered architecture:
//! - Routes: HTTP request handling and routing
//! - Auth: credential hashing, token authority and access guard
//! - Services: registration/login flows
//! - Repositories: the `UserStore` boundary (Postgres or in-memory)

use anyhow::Result;
use authgate_backend::{
    config::{self, StoreBackend},
    db,
    repositories::{InMemoryUserStore, PgUserStore, UserStore},
    routes,
    state::AppState,
};
use secrecy::ExposeSecret;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    init_tracing();

    // Load configuration
    let config = config::AppConfig::load()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        env = if config::AppConfig::is_production() { "production" } else { "development" },
        store = ?config.store.backend,
        "Starting Authgate backend"
    );

    validate_config(&config)?;

    let store = connect_store(&config).await?;

    // Create application state
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(store, config)?;

    // Build application
    let app = routes::create_router(state);

    // Start server
    info!(address = %addr, "Server is running");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    // Serve with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Open the configured user store
///
/// The Postgres pool is created once here and shared for the life of the
/// process.
async fn connect_store(config: &config::AppConfig) -> Result<Arc<dyn UserStore>> {
    match config.store.backend {
        StoreBackend::Postgres => {
            info!("Connecting to database...");
            let pool = db::create_pool(&config.database).await?;
            db::run_migrations(&pool).await?;
            Ok(Arc::new(PgUserStore::new(pool)))
        }
        StoreBackend::Memory => {
            warn!("Using in-memory user store; accounts are lost on restart");
            Ok(Arc::new(InMemoryUserStore::new()))
        }
    }
}

/// Initialize tracing/logging
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if config::AppConfig::is_production() {
            "authgate_backend=info,tower_http=info".into()
        } else {
            "authgate_backend=debug,tower_http=debug,sqlx=warn".into()
        }
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if config::AppConfig::is_production() {
        // JSON logging for production (better for log aggregation)
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        // Pretty logging for development
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

/// Refuse to start without a usable signing secret
fn validate_config(config: &config::AppConfig) -> Result<()> {
    let secret = config.jwt_secret()?;

    if config::AppConfig::is_production() {
        let mut errors = Vec::new();

        if secret.expose_secret().len() < 32 {
            errors.push("JWT secret must be at least 32 characters");
        }

        if config.store.backend == StoreBackend::Memory {
            errors.push("The in-memory store is not allowed in production");
        }

        if config.database.host == "localhost" || config.database.host == "127.0.0.1" {
            warn!("Database host is localhost - ensure this is intentional for production");
        }

        if !errors.is_empty() {
            for err in &errors {
                error!("Configuration error: {}", err);
            }
            anyhow::bail!("Invalid production configuration");
        }
    }

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
