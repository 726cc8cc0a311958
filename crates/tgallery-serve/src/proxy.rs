//! Image proxy: `GET /image/{file_id}`.
//!
//! Resolves the file through the Bot API and streams the bytes back with a
//! long-lived cache policy, so a CDN in front only ever asks once per file.

use axum::body::Body;
use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use axum::response::{IntoResponse, Response};

use crate::error::ProxyError;
use crate::telegram::FileResolver;

/// Cache policy for proxied images. File ids never change content.
pub const IMAGE_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// Headers that describe the upstream connection rather than the payload.
fn is_hop_by_hop(name: &HeaderName) -> bool {
    matches!(
        name.as_str(),
        "connection"
            | "keep-alive"
            | "proxy-authenticate"
            | "proxy-authorization"
            | "te"
            | "trailer"
            | "transfer-encoding"
            | "upgrade"
    )
}

/// Resolve `file_id` and build the streaming response.
///
/// Resolution and download failures are detected before the first body byte
/// is produced. An upstream that stalls mid-body hits the client's read
/// timeout and the stream ends with an error. The file id is passed to the
/// resolver untouched.
pub async fn proxy_image(resolver: &FileResolver, file_id: &str) -> Result<Response, ProxyError> {
    if file_id.is_empty() {
        return Err(ProxyError::EmptyFileId);
    }

    let file_path = resolver.describe(file_id).await?;
    tracing::debug!(file_id = %file_id, file_path = %file_path, "image resolved");

    let upstream = resolver.fetch(&file_path).await?;
    let headers = rewrite_headers(upstream.headers());

    let mut response = Body::from_stream(upstream.bytes_stream()).into_response();
    *response.headers_mut() = headers;
    Ok(response)
}

/// Route entry point; failures become short plain-text responses.
pub async fn image_response(resolver: &FileResolver, file_id: &str) -> Response {
    match proxy_image(resolver, file_id).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

/// Copy upstream headers, then force the cache and CORS policy.
fn rewrite_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(upstream.len() + 2);
    for (name, value) in upstream {
        if is_hop_by_hop(name) {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }

    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(IMAGE_CACHE_CONTROL),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrite_overrides_cache_control_and_sets_cors() {
        let mut upstream = HeaderMap::new();
        upstream.insert(header::CONTENT_TYPE, HeaderValue::from_static("image/jpeg"));
        upstream.insert(header::CONTENT_LENGTH, HeaderValue::from_static("2048"));
        upstream.insert(header::CACHE_CONTROL, HeaderValue::from_static("max-age=0"));

        let headers = rewrite_headers(&upstream);
        assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "image/jpeg");
        assert_eq!(headers.get(header::CONTENT_LENGTH).unwrap(), "2048");
        assert_eq!(
            headers.get(header::CACHE_CONTROL).unwrap(),
            IMAGE_CACHE_CONTROL
        );
        assert_eq!(headers.get_all(header::CACHE_CONTROL).iter().count(), 1);
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
    }

    #[test]
    fn rewrite_drops_hop_by_hop_headers() {
        let mut upstream = HeaderMap::new();
        upstream.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        upstream.insert(
            HeaderName::from_static("keep-alive"),
            HeaderValue::from_static("timeout=5"),
        );
        upstream.insert(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        upstream.insert(header::ETAG, HeaderValue::from_static("\"abc\""));

        let headers = rewrite_headers(&upstream);
        assert!(headers.get(header::CONNECTION).is_none());
        assert!(headers.get("keep-alive").is_none());
        assert!(headers.get(header::TRANSFER_ENCODING).is_none());
        assert_eq!(headers.get(header::ETAG).unwrap(), "\"abc\"");
    }
}
