//! `fieldcrypt` — service binary entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise the telemetry pipeline (JSON logs, optional OTLP traces).
//! 3. Connect the record store (REST backend, or in-memory when unset).
//! 4. Build the Axum router and start serving.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use fieldcrypt::config::Config;
use fieldcrypt::server::{self, state::AppState};
use fieldcrypt::store::{MemoryStore, RecordStore, RestStore};
use fieldcrypt::telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init_telemetry(cfg.otel_exporter_otlp_endpoint.as_deref(), &cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        listen_port = cfg.listen_port,
        "fieldcrypt starting"
    );

    // -----------------------------------------------------------------------
    // 3. Record store
    // -----------------------------------------------------------------------
    let store: Arc<dyn RecordStore> = match &cfg.store_url {
        Some(url) => {
            let api_key = cfg.store_api_key.as_deref().unwrap_or_default();
            let rest = RestStore::new(url, api_key, &cfg.store_table, &cfg.store_id_column)
                .context("failed to build record store client")?;
            info!(table = %cfg.store_table, "using REST record store");
            Arc::new(rest)
        }
        None => {
            warn!("STORE_URL not set; using an in-memory record store");
            Arc::new(MemoryStore::new())
        }
    };

    // -----------------------------------------------------------------------
    // 4. HTTP server
    // -----------------------------------------------------------------------
    let state = AppState::new(
        store,
        cfg.credential_field.clone(),
        cfg.identity_header_name.clone(),
    );
    let router = server::router::build(state);

    let addr: std::net::SocketAddr = ([0, 0, 0, 0], cfg.listen_port).into();
    info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, router).await?;

    Ok(())
}
