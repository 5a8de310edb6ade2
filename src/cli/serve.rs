//! `toneshift serve` — wire the store, provider and service, then run the API.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use toneshift::api::{start_server, AppState};
use toneshift::config::{Config, StoreBackend};
use toneshift::providers::MistralProvider;
use toneshift::store::{KeyValueStore, MemoryStore, RedisStore};
use toneshift::transform::TransformationService;

pub async fn cmd_serve(
    mut config: Config,
    bind: Option<String>,
    port: Option<u16>,
    memory_store: bool,
) -> Result<()> {
    if let Some(bind) = bind {
        config.server.bind = bind;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    if memory_store {
        config.store.backend = StoreBackend::Memory;
    }

    let store: Arc<dyn KeyValueStore> = match config.store.backend {
        StoreBackend::Redis => Arc::new(
            RedisStore::connect(&config.store.url)
                .await
                .context("Failed to connect to the key-value store")?,
        ),
        StoreBackend::Memory => {
            info!("Using in-process store; history and cache are not persisted");
            Arc::new(MemoryStore::new())
        }
    };

    let provider = MistralProvider::from_config(&config.upstream)
        .context("Failed to configure the upstream rewriter")?;
    info!(model = %provider.model(), "Upstream rewriter configured");

    let service = TransformationService::new(
        store,
        Arc::new(provider),
        config.cache.ttl_secs,
        config.store.history_ttl_secs,
    );

    start_server(&config.server, AppState::new(Arc::new(service)))
        .await
        .map_err(|e| anyhow::anyhow!("API server failed: {e}"))
}
