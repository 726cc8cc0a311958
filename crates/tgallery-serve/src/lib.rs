//! tgallery-serve - image gallery backed by the Telegram Bot API file store.
//!
//! Images live in Telegram; this service keeps only their metadata in SQLite
//! and proxies the bytes on demand. It is designed to be placed behind a CDN:
//! proxied images are marked immutable, pages carry ETags.
//!
//! # Architecture
//!
//! - **Routes**: one pure classifier maps method and path onto a [`routes::Route`]
//! - **Proxy**: two-step Bot API resolution (`getFile`, then download), streamed
//! - **Query**: fixed SQL statements for listing, random sampling and detail lookups
//! - **Render**: HTML pages with maud (compile-time templates)
//! - **Cache**: moka cache for listing pages + Cache-Control headers for the CDN
//!
//! # URL Pattern
//!
//! ```text
//! /image/{file_id}         proxied image bytes
//! /api/posts?q=&offset=    JSON listing, 20 per page (q=random for one random image)
//! /detail/{id}[.json]      detail page or its JSON context
//! /api/get_history         history blob (optional)
//! /api/update_history      replace the history blob (POST, optional)
//! ```
//!
//! # Security
//!
//! - All dynamic content is HTML-escaped by maud; the gallery script builds
//!   cards with `textContent`
//! - Search terms are bound as parameters with LIKE wildcards escaped
//! - The bot token never appears in logs or error messages

pub mod cache;
pub mod config;
pub mod detail;
pub mod error;
pub mod history;
pub mod proxy;
pub mod query;
pub mod render;
pub mod routes;
pub mod state;
pub mod store;
pub mod telegram;

pub use config::Config;
pub use routes::router;
pub use state::AppState;
