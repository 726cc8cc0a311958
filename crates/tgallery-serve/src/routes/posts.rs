//! Listing endpoint: `/api/posts?q=&offset=`.
//!
//! Always answers a JSON array. A failed query is reported as an empty
//! array with status 500, so clients must check the status to tell it apart
//! from the end of the listing.

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};

use crate::cache;
use crate::query::{self, ImageRecord, ListRequest, PostsParams};
use crate::state::AppState;

/// Cache policy for listing pages; new uploads show up within a minute.
const PAGE_CACHE_CONTROL: &str = "public, max-age=30, stale-while-revalidate=30";

/// Random samples and failures must never be reused.
const NO_STORE: &str = "no-store";

/// Handle a listing request.
pub async fn list_posts(state: &AppState, params: &PostsParams) -> Response {
    let request = ListRequest::from_params(params);
    let key = request.cache_key();

    let result = cache::get_or_compute(state.cache.as_ref(), key.as_deref(), || {
        query::list_images(&state.store, &request)
    })
    .await;

    match result {
        Ok(rows) => {
            let cache_control = match request {
                ListRequest::RandomSample => NO_STORE,
                ListRequest::Page { .. } => PAGE_CACHE_CONTROL,
            };
            tracing::debug!(?request, rows = rows.len(), "listing served");
            json_response(StatusCode::OK, cache_control, rows)
        }
        Err(e) => {
            tracing::error!(?request, error = %e, "listing query failed");
            json_response(StatusCode::INTERNAL_SERVER_ERROR, NO_STORE, Vec::new())
        }
    }
}

fn json_response(status: StatusCode, cache_control: &'static str, rows: Vec<ImageRecord>) -> Response {
    (
        status,
        [(header::CACHE_CONTROL, HeaderValue::from_static(cache_control))],
        Json(rows),
    )
        .into_response()
}
