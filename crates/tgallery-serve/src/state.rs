//! Application state shared across all request handlers.

use std::sync::Arc;

use anyhow::Context;

use crate::cache::{self, ResponseCache};
use crate::config::Config;
use crate::history::KV_SCHEMA;
use crate::query::IMAGES_SCHEMA;
use crate::store::Store;
use crate::telegram::FileResolver;

/// Shared application state available to all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Relational store holding the `images` table.
    pub store: Store,

    /// Key/value store holding the history blob.
    pub kv: Store,

    /// Bot API client used by the image proxy.
    pub resolver: FileResolver,

    /// Application configuration.
    pub config: Arc<Config>,

    /// Listing page cache; `None` when disabled.
    pub cache: Option<ResponseCache>,
}

impl AppState {
    /// Open both stores from the configured paths and build the state.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::open(&config.database_path, IMAGES_SCHEMA)
            .with_context(|| format!("opening image store at {}", config.database_path))?;
        let kv = Store::open(&config.kv_path, KV_SCHEMA)
            .with_context(|| format!("opening history store at {}", config.kv_path))?;

        Self::from_parts(config, store, kv)
    }

    /// Build the state around already opened stores.
    pub fn from_parts(config: Config, store: Store, kv: Store) -> anyhow::Result<Self> {
        let resolver = FileResolver::new(&config).context("building Bot API client")?;
        let cache = cache::new_cache(config.list_cache_ttl);

        tracing::info!(
            database = %config.database_path,
            kv = %config.kv_path,
            history_api = config.history_api,
            list_cache_ttl_secs = config.list_cache_ttl.as_secs(),
            upstream_timeout_secs = config.upstream_timeout.as_secs(),
            "application state initialized"
        );

        Ok(Self {
            store,
            kv,
            resolver,
            config: Arc::new(config),
            cache,
        })
    }
}
