//! In-memory caching of listing pages with moka.
//!
//! Listing queries are cheap but hit on every scroll, so identical pages are
//! served from memory for a short TTL. Entries hold the page serialized as
//! JSON and are decoded back into rows on a hit; the listing endpoint then
//! encodes the rows again for the response.
//!
//! Random samples and failed queries are never cached; callers signal the
//! former by passing no key.

use std::future::Future;
use std::time::Duration;

use moka::future::Cache;
use serde::{Serialize, de::DeserializeOwned};

use crate::error::GalleryError;

/// Maximum number of cached pages.
pub const DEFAULT_CACHE_CAPACITY: u64 = 1000;

/// Cached response with metadata.
#[derive(Clone, Debug)]
pub struct CachedEntry {
    /// Serialized JSON response.
    pub json: String,
    /// When this entry was cached.
    pub cached_at: chrono::DateTime<chrono::Utc>,
}

/// Type alias for the listing cache.
pub type ResponseCache = Cache<String, CachedEntry>;

/// Create a listing cache, or `None` when `ttl` is zero.
pub fn new_cache(ttl: Duration) -> Option<ResponseCache> {
    if ttl.is_zero() {
        return None;
    }

    Some(
        Cache::builder()
            .max_capacity(DEFAULT_CACHE_CAPACITY)
            .time_to_live(ttl)
            .build(),
    )
}

/// Get a cached value or compute and cache it.
///
/// With no cache or no key this is just `compute()`. Errors from `compute`
/// are returned untouched and leave the cache as it was.
pub async fn get_or_compute<T, F, Fut>(
    cache: Option<&ResponseCache>,
    key: Option<&str>,
    compute: F,
) -> Result<T, GalleryError>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, GalleryError>>,
{
    let (cache, key) = match (cache, key) {
        (Some(cache), Some(key)) => (cache, key),
        _ => return compute().await,
    };

    if let Some(entry) = cache.get(key).await {
        match serde_json::from_str(&entry.json) {
            Ok(value) => {
                tracing::debug!(key = %key, cached_at = %entry.cached_at, "cache hit");
                return Ok(value);
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "failed to deserialize cached entry");
            }
        }
    }

    tracing::debug!(key = %key, "cache miss, computing");
    let value = compute().await?;

    match serde_json::to_string(&value) {
        Ok(json) => {
            let entry = CachedEntry {
                json,
                cached_at: chrono::Utc::now(),
            };
            cache.insert(key.to_string(), entry).await;
        }
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "failed to serialize for cache");
        }
    }

    Ok(value)
}
