mod availability;
mod config;
mod errors;
mod handlers;
mod identity;
mod kv;
mod models;
mod remote;
mod routes;
mod state;
mod stats;
mod store;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, LocalBackend};
use crate::identity::SessionProvider;
use crate::kv::{FileKv, KeyValueStore, MemoryKv, RedisKv};
use crate::remote::{PostgrestClient, RemoteTables};
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::build_stores;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume analyzer API v{}", env!("CARGO_PKG_VERSION"));

    // Local key-value storage backs guest records and the session id
    let kv = open_local_store(&config.local).await?;

    let session = SessionProvider::new(kv.clone()).get_session_id().await?;
    info!("Session {session}");

    let backend = config.backend_mode();
    let remote: Option<Arc<dyn RemoteTables>> = match &config.remote {
        Some(settings) => {
            let client = PostgrestClient::new(settings)?;
            info!("Remote backend configured at {}", settings.url);
            Some(Arc::new(client))
        }
        None => {
            info!("Remote backend not configured, using local storage only");
            None
        }
    };

    let state = AppState {
        stores: build_stores(kv, remote, session.clone()),
        session,
        backend,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn open_local_store(backend: &LocalBackend) -> Result<Arc<dyn KeyValueStore>> {
    let kv: Arc<dyn KeyValueStore> = match backend {
        LocalBackend::File(dir) => {
            let store = FileKv::open(dir.clone()).await?;
            info!("Local storage at {}", store.dir().display());
            Arc::new(store)
        }
        LocalBackend::Redis(url) => {
            let store = RedisKv::open(url)?;
            info!("Local storage on Redis");
            Arc::new(store)
        }
        LocalBackend::Memory => {
            info!("Local storage in memory; records are lost on exit");
            Arc::new(MemoryKv::new())
        }
    };
    Ok(kv)
}
