//! Error types for the gallery service.
//!
//! Page and store errors are rendered as simple HTML error pages, since
//! browsers are the main consumer. Image proxy errors are short plain-text
//! bodies because they only ever land in an `<img>` tag.

use std::time::Duration;

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use maud::{DOCTYPE, html};

/// Gallery service error type.
#[derive(Debug, thiserror::Error)]
pub enum GalleryError {
    /// The requested record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// SQLite query error.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Internal server error (blocking task failure, serialization, etc.).
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for GalleryError {
    fn into_response(self) -> Response {
        let (status, title, message) = match &self {
            Self::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                "Not Found",
                format!("Nothing lives here: {msg}"),
            ),
            Self::Database(err) => {
                tracing::error!(error = %err, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Service Unavailable",
                    "The database is temporarily unavailable. Please try again later.".to_string(),
                )
            }
            Self::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Error",
                    "An internal error occurred. Please try again later.".to_string(),
                )
            }
        };

        let markup = html! {
            (DOCTYPE)
            html lang="en" {
                head {
                    meta charset="utf-8";
                    meta name="viewport" content="width=device-width, initial-scale=1";
                    title { (title) }
                    meta name="robots" content="noindex";
                    style { (maud::PreEscaped(crate::render::components::ERROR_CSS)) }
                }
                body {
                    main class="error-page" {
                        h1 { (title) }
                        p { (message) }
                        a href="/" { "Back to the gallery" }
                    }
                }
            }
        };

        (status, markup).into_response()
    }
}

/// Failure of the two-step image resolution.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// The path carried no file identifier at all.
    #[error("empty file id")]
    EmptyFileId,

    /// The Bot API answered, but refused to resolve or serve the file.
    #[error("upstream rejected request: {0}")]
    Rejected(String),

    /// Transport failure or undecodable upstream response.
    #[error("upstream transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// An upstream call did not complete within the configured bound.
    #[error("upstream timed out after {0:?}")]
    Timeout(Duration),
}

impl ProxyError {
    /// HTTP status this failure maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::EmptyFileId => StatusCode::NOT_FOUND,
            Self::Rejected(_) => StatusCode::BAD_GATEWAY,
            Self::Transport(_) | Self::Timeout(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::EmptyFileId => "Not Found",
            Self::Rejected(reason) => {
                tracing::warn!(reason = %reason, "image upstream rejected");
                "Upstream Error"
            }
            Self::Transport(err) => {
                tracing::error!(error = %err, "image proxy transport error");
                "Proxy Error"
            }
            Self::Timeout(after) => {
                tracing::error!(timeout_ms = after.as_millis() as u64, "image proxy timed out");
                "Proxy Error"
            }
        };

        (
            status,
            [(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; charset=utf-8"),
            )],
            body,
        )
            .into_response()
    }
}
