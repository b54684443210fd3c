//! Tasklist document store -- serves task collections over WebSocket.
//!
//! An axum WebSocket server holding named document collections in memory,
//! optionally persisted to a JSON snapshot file.
//!
//! # Usage
//!
//! ```bash
//! # Run on default address 0.0.0.0:9100, memory only
//! cargo run --bin tasklist-store
//!
//! # Persist to a snapshot file on a custom address
//! cargo run --bin tasklist-store -- --bind 127.0.0.1:8080 --data-file tasks.json
//!
//! # Or via environment variables
//! TASKLIST_STORE_ADDR=127.0.0.1:8080 cargo run --bin tasklist-store
//! ```

use std::sync::Arc;

use clap::Parser;
use tasklist_store::config::{StoreCliArgs, StoreConfig};
use tasklist_store::server::{self, StoreState};
use tasklist_store::store::DocumentStore;

#[tokio::main]
async fn main() {
    let cli = StoreCliArgs::parse();

    // Load config from CLI args + config file + env vars + defaults.
    let config = match StoreConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            std::process::exit(1);
        }
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!(addr = %config.bind_addr, "starting tasklist store");

    let store = match &config.data_file {
        Some(path) => match DocumentStore::open(path).await {
            Ok(store) => store,
            Err(e) => {
                tracing::error!(error = %e, "failed to open snapshot");
                std::process::exit(1);
            }
        },
        None => {
            tracing::warn!("no data file configured, documents are kept in memory only");
            DocumentStore::new()
        }
    };
    let state = Arc::new(StoreState::with_config(config.max_payload_size, store));

    match server::start_server_with_state(&config.bind_addr.to_string(), state).await {
        Ok((bound_addr, handle)) => {
            tracing::info!(addr = %bound_addr, "store server listening");
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "store server task failed");
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to start store server");
            std::process::exit(1);
        }
    }
}
