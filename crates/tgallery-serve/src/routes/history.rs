//! History blob endpoints.
//!
//! The blob belongs to an external client (the channel bot keeps its
//! de-duplication state here). It is stored and returned byte for byte.

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

use crate::history;
use crate::state::AppState;

/// Largest accepted history upload; enforced by the router's body limit.
pub const MAX_HISTORY_BYTES: usize = 16 * 1024 * 1024;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// `GET /api/get_history`: the stored blob, or an empty body when unset.
pub async fn get_history(state: &AppState) -> Response {
    match history::get_history(&state.kv).await {
        Ok(blob) => (
            [
                (header::CONTENT_TYPE, TEXT_PLAIN),
                (header::CACHE_CONTROL, "no-store"),
            ],
            blob.unwrap_or_default(),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "reading history failed");
            text(StatusCode::INTERNAL_SERVER_ERROR, "Internal Error")
        }
    }
}

/// `POST /api/update_history`: replace the blob with the request body.
pub async fn update_history(state: &AppState, request: Request) -> Response {
    let bytes = match Bytes::from_request(request, &()).await {
        Ok(bytes) => bytes,
        Err(rejection) => {
            tracing::warn!(status = %rejection.status(), "history upload rejected");
            return rejection.into_response();
        }
    };

    match history::put_history(&state.kv, bytes.to_vec()).await {
        Ok(()) => text(StatusCode::OK, "OK"),
        Err(e) => {
            tracing::error!(error = %e, "storing history failed");
            text(StatusCode::INTERNAL_SERVER_ERROR, "Internal Error")
        }
    }
}

/// Any method other than POST on the update endpoint.
pub fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "POST"), (header::CONTENT_TYPE, TEXT_PLAIN)],
        "Method not allowed",
    )
        .into_response()
}

fn text(status: StatusCode, body: &'static str) -> Response {
    (status, [(header::CONTENT_TYPE, TEXT_PLAIN)], body).into_response()
}
