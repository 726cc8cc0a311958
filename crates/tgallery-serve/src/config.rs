//! Application configuration loaded from environment variables.

use std::time::Duration;

/// Application configuration.
#[derive(Clone)]
pub struct Config {
    /// Server bind address (e.g., "0.0.0.0:8787").
    pub bind_addr: String,

    /// Path to the SQLite database holding the `images` table.
    pub database_path: String,

    /// Path to the SQLite database used as the key-value store.
    pub kv_path: String,

    /// Telegram bot token used for both `getFile` and file downloads.
    pub bot_token: String,

    /// Base URL of the Telegram Bot API, without trailing slash.
    pub telegram_api_base: String,

    /// Upper bound for each of the two upstream calls of the image proxy.
    pub upstream_timeout: Duration,

    /// Site name shown in page titles and headers.
    pub site_name: String,

    /// Whether `/api/get_history` and `/api/update_history` are served.
    pub history_api: bool,

    /// TTL for cached listing pages. Zero disables the cache.
    pub list_cache_ttl: Duration,
}

// Hand-written so the bot token never ends up in logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("bind_addr", &self.bind_addr)
            .field("database_path", &self.database_path)
            .field("kv_path", &self.kv_path)
            .field("bot_token", &"<redacted>")
            .field("telegram_api_base", &self.telegram_api_base)
            .field("upstream_timeout", &self.upstream_timeout)
            .field("site_name", &self.site_name)
            .field("history_api", &self.history_api)
            .field("list_cache_ttl", &self.list_cache_ttl)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `BOT_TOKEN`: Telegram bot token
    ///
    /// Optional:
    /// - `GALLERY_BIND_ADDR`: Server bind address (default: "0.0.0.0:8787")
    /// - `GALLERY_DATABASE_PATH`: SQLite database with images (default: "gallery.db")
    /// - `GALLERY_KV_PATH`: SQLite key-value database (default: "gallery-kv.db")
    /// - `TELEGRAM_API_BASE`: Bot API base URL (default: "https://api.telegram.org")
    /// - `GALLERY_UPSTREAM_TIMEOUT_SECS`: Per-call upstream timeout (default: 15)
    /// - `GALLERY_SITE_NAME`: Site name (default: "Gallery")
    /// - `GALLERY_HISTORY_API`: "0", "false", "off" or "no" disables the history API
    /// - `GALLERY_LIST_CACHE_TTL_SECS`: Listing cache TTL, 0 disables (default: 30)
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr =
            std::env::var("GALLERY_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8787".to_string());

        let database_path =
            std::env::var("GALLERY_DATABASE_PATH").unwrap_or_else(|_| "gallery.db".to_string());

        let kv_path =
            std::env::var("GALLERY_KV_PATH").unwrap_or_else(|_| "gallery-kv.db".to_string());

        let bot_token = std::env::var("BOT_TOKEN")
            .map(|s| s.trim().to_string())
            .map_err(|_| anyhow::anyhow!("BOT_TOKEN environment variable is required"))?;

        if bot_token.is_empty() {
            anyhow::bail!("BOT_TOKEN must not be empty");
        }

        let telegram_api_base = std::env::var("TELEGRAM_API_BASE")
            .unwrap_or_else(|_| "https://api.telegram.org".to_string())
            .trim_end_matches('/')
            .to_string();

        let upstream_timeout = Duration::from_secs(parse_secs("GALLERY_UPSTREAM_TIMEOUT_SECS", 15)?);

        let site_name =
            std::env::var("GALLERY_SITE_NAME").unwrap_or_else(|_| "Gallery".to_string());

        let history_api = std::env::var("GALLERY_HISTORY_API")
            .map(|v| !matches!(v.trim().to_lowercase().as_str(), "0" | "false" | "off" | "no"))
            .unwrap_or(true);

        let list_cache_ttl = Duration::from_secs(parse_secs("GALLERY_LIST_CACHE_TTL_SECS", 30)?);

        tracing::info!(
            bind_addr = %bind_addr,
            database_path = %database_path,
            kv_path = %kv_path,
            telegram_api_base = %telegram_api_base,
            upstream_timeout_secs = upstream_timeout.as_secs(),
            site_name = %site_name,
            history_api,
            list_cache_ttl_secs = list_cache_ttl.as_secs(),
            "gallery configuration loaded"
        );

        Ok(Self {
            bind_addr,
            database_path,
            kv_path,
            bot_token,
            telegram_api_base,
            upstream_timeout,
            site_name,
            history_api,
            list_cache_ttl,
        })
    }
}

/// Parse a whole number of seconds from an env var, falling back to `default` when unset.
fn parse_secs(key: &str, default: u64) -> anyhow::Result<u64> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{key} must be a whole number of seconds: {e}")),
        Err(_) => Ok(default),
    }
}
