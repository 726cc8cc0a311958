//! HTML pages and the JSON detail endpoint.

use axum::Json;
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use maud::Markup;

use crate::detail;
use crate::error::GalleryError;
use crate::render;
use crate::render::components::CSP_HEADER;
use crate::state::AppState;

/// Static pages change only on deploy.
const STATIC_CACHE_CONTROL: &str = "public, max-age=300, s-maxage=3600";

/// Detail pages embed a random related sample, so keep them short-lived.
const DETAIL_CACHE_CONTROL: &str = "public, max-age=60, s-maxage=600, stale-while-revalidate=600";

/// Gallery home page.
pub fn home_page(state: &AppState) -> Response {
    let markup = render::home::render(&state.config.site_name);
    build_response(markup, STATIC_CACHE_CONTROL)
}

/// About page.
pub fn about_page(state: &AppState) -> Response {
    let markup = render::about::render(&state.config.site_name);
    build_response(markup, STATIC_CACHE_CONTROL)
}

/// `/detail/{id}`: resolve and render the detail page.
pub async fn detail_page(state: &AppState, raw_id: &str) -> Result<Response, GalleryError> {
    let ctx = detail::resolve_detail(&state.store, raw_id).await?;
    tracing::debug!(id = ctx.record.id, related = ctx.related.len(), "detail resolved");

    let markup = render::detail::render(&ctx, &state.config.site_name);
    Ok(build_response(markup, DETAIL_CACHE_CONTROL))
}

/// `/detail/{id}.json`: the same context as JSON.
pub async fn detail_json(state: &AppState, raw_id: &str) -> Result<Response, GalleryError> {
    let ctx = detail::resolve_detail(&state.store, raw_id).await?;

    Ok((
        [
            (header::CACHE_CONTROL, HeaderValue::from_static(DETAIL_CACHE_CONTROL)),
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*")),
        ],
        Json(ctx),
    )
        .into_response())
}

/// Build an HTTP response with HTML content and security/cache headers.
fn build_response(markup: Markup, cache_control: &'static str) -> Response {
    let html = markup.into_string();
    let mut headers = HeaderMap::new();

    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static(CSP_HEADER),
    );
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(cache_control));

    if let Ok(val) = HeaderValue::from_str(&etag(&html)) {
        headers.insert(header::ETAG, val);
    }

    (StatusCode::OK, headers, html).into_response()
}

/// Strong ETag from the xxh3 hash of the rendered page.
fn etag(html: &str) -> String {
    let hash = xxhash_rust::xxh3::xxh3_64(html.as_bytes());
    format!("\"{}\"", hex_fmt::HexFmt(&hash.to_be_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn etag_is_quoted_hex_and_content_sensitive() {
        let a = etag("<p>a</p>");
        assert_eq!(a.len(), 18);
        assert!(a.starts_with('"') && a.ends_with('"'));
        assert_eq!(a, etag("<p>a</p>"));
        assert_ne!(a, etag("<p>b</p>"));
    }

    #[test]
    fn html_response_carries_security_headers() {
        let response = build_response(maud::html! { p { "x" } }, STATIC_CACHE_CONTROL);
        let headers = response.headers();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], "text/html; charset=utf-8");
        assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert_eq!(headers[header::X_FRAME_OPTIONS], "DENY");
        assert_eq!(headers[header::CACHE_CONTROL], STATIC_CACHE_CONTROL);
        assert!(headers.contains_key(header::ETAG));
        assert!(headers.contains_key(header::CONTENT_SECURITY_POLICY));
    }
}
