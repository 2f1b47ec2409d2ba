//! Game Shelf Back binary entrypoint wiring REST, auth, and storage layers.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{
    Router,
    http::{HeaderValue, Method, header},
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod auth;
mod config;
mod dao;
mod dto;
mod error;
mod library;
mod routes;
mod services;
mod state;

use auth::{IdentityConfig, IdentityVerifier};
use config::{AppConfig, StoreBackend};
use dao::game_store::GameStore;
use dao::game_store::memory::MemoryGameStore;
#[cfg(feature = "sqlite-store")]
use dao::game_store::sqlite::{SqliteConfig, SqliteGameStore};
use services::storage_supervisor;
use state::{AppState, SharedState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::from_env();
    let identity_config = IdentityConfig::from_env().context("loading identity configuration")?;
    let identity = IdentityVerifier::new(identity_config).context("building identity client")?;

    let app_state = AppState::new(identity);
    spawn_store_supervisor(app_state.clone(), &config)?;

    let app = build_router(app_state, &config)?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Start the background task that connects and supervises the configured
/// storage backend.
fn spawn_store_supervisor(state: SharedState, config: &AppConfig) -> anyhow::Result<()> {
    match config.store {
        #[cfg(feature = "sqlite-store")]
        StoreBackend::Sqlite => {
            let sqlite = SqliteConfig::from_env().context("loading sqlite configuration")?;
            tokio::spawn(storage_supervisor::run(state, move || {
                let sqlite = sqlite.clone();
                async move {
                    SqliteGameStore::connect(sqlite)
                        .await
                        .map(|store| Arc::new(store) as Arc<dyn GameStore>)
                        .map_err(Into::into)
                }
            }));
        }
        #[cfg(not(feature = "sqlite-store"))]
        StoreBackend::Sqlite => {
            anyhow::bail!("built without the `sqlite-store` feature; set GAME_STORE=memory");
        }
        StoreBackend::Memory => {
            warn!("using the ephemeral in-memory store; records vanish on restart");
            tokio::spawn(storage_supervisor::run(state, move || async move {
                Ok(Arc::new(MemoryGameStore::new()) as Arc<dyn GameStore>)
            }));
        }
    }

    Ok(())
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState, config: &AppConfig) -> anyhow::Result<Router<()>> {
    Ok(routes::router(state)
        .layer(cors_layer(config)?)
        .layer(TraceLayer::new_for_http()))
}

/// CORS policy admitting the configured frontend origins with credentials.
fn cors_layer(config: &AppConfig) -> anyhow::Result<CorsLayer> {
    let origins = config
        .frontend_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("invalid frontend origin `{origin}`"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true))
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
