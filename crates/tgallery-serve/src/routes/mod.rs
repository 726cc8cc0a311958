//! Route definitions for the gallery service.
//!
//! ## Routes
//!
//! - `/image/{file_id}` - Image proxy (file id taken verbatim, may contain `/`)
//! - `/api/posts?q=&offset=` - Listing page as JSON (`q=random` for one random image)
//! - `GET /api/get_history` - Stored history blob (when the history API is on)
//! - `POST /api/update_history` - Replace the history blob (when the history API is on)
//! - `/detail/{id}` - Detail page (or `.json` for the JSON context)
//! - `/about` - About page
//! - `/health` - Health check (JSON)
//! - `/robots.txt` - Crawler instructions
//! - anything else - Home page
//!
//! Matching is done by [`classify`], a pure function over method and path,
//! so the whole table is testable without a server. Methods are ignored
//! except on the history update endpoint.

mod health;
mod history;
mod pages;
mod posts;

use axum::Router;
use axum::extract::{DefaultBodyLimit, Query, Request, State};
use axum::http::{Method, header};
use axum::response::{IntoResponse, Response};

use crate::proxy;
use crate::query::PostsParams;
use crate::state::AppState;

/// Where a request is dispatched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route<'a> {
    /// Image proxy for the opaque file id.
    Image { file_id: &'a str },
    /// JSON listing page.
    Posts,
    /// Read the history blob.
    GetHistory,
    /// Replace the history blob.
    UpdateHistory,
    /// History update with a method other than POST.
    MethodNotAllowed,
    /// HTML detail page for the raw id.
    Detail { id: &'a str },
    /// JSON detail context for the raw id.
    DetailJson { id: &'a str },
    /// Static about page.
    About,
    /// Health probe.
    Health,
    /// Crawler instructions.
    RobotsTxt,
    /// Gallery home page; the fallback for everything unmatched.
    Home,
}

/// Map a request onto exactly one route.
///
/// Priority: image prefix, exact API paths, detail prefix, exact static
/// paths, then home.
pub fn classify<'a>(method: &Method, path: &'a str, history_enabled: bool) -> Route<'a> {
    if let Some(file_id) = path.strip_prefix("/image/") {
        return Route::Image { file_id };
    }

    match path {
        "/api/posts" => return Route::Posts,
        "/api/get_history" if history_enabled => return Route::GetHistory,
        "/api/update_history" if history_enabled => {
            return if method == Method::POST {
                Route::UpdateHistory
            } else {
                Route::MethodNotAllowed
            };
        }
        _ => {}
    }

    if let Some(rest) = path.strip_prefix("/detail/").filter(|rest| !rest.is_empty()) {
        return match rest.strip_suffix(".json") {
            Some(id) => Route::DetailJson { id },
            None => Route::Detail { id: rest },
        };
    }

    match path {
        "/about" => Route::About,
        "/health" => Route::Health,
        "/robots.txt" => Route::RobotsTxt,
        _ => Route::Home,
    }
}

/// Build the complete gallery router.
///
/// Everything goes through one fallback handler so that [`classify`] alone
/// decides where a request lands. Only the history upload reads a body.
pub fn router(state: AppState) -> Router {
    Router::new()
        .fallback(dispatch)
        .layer(DefaultBodyLimit::max(history::MAX_HISTORY_BYTES))
        .with_state(state)
}

async fn dispatch(State(state): State<AppState>, request: Request) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    match classify(&method, uri.path(), state.config.history_api) {
        Route::Image { file_id } => proxy::image_response(&state.resolver, file_id).await,
        Route::Posts => {
            let params = match Query::<PostsParams>::try_from_uri(&uri) {
                Ok(Query(params)) => params,
                Err(e) => {
                    tracing::debug!(error = %e, "unreadable listing query, using defaults");
                    PostsParams::default()
                }
            };
            posts::list_posts(&state, &params).await
        }
        Route::GetHistory => history::get_history(&state).await,
        Route::UpdateHistory => history::update_history(&state, request).await,
        Route::MethodNotAllowed => history::method_not_allowed(),
        Route::Detail { id } => pages::detail_page(&state, id).await.into_response(),
        Route::DetailJson { id } => pages::detail_json(&state, id).await.into_response(),
        Route::About => pages::about_page(&state),
        Route::Health => health::health_check().await.into_response(),
        Route::RobotsTxt => robots_txt().into_response(),
        Route::Home => pages::home_page(&state),
    }
}

/// Serve robots.txt allowing all crawlers except on the API.
fn robots_txt() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        "User-agent: *\nAllow: /\nDisallow: /api/\n",
    )
}
