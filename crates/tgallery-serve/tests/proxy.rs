//! Image proxy against a fake Bot API.

mod common;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use tower::ServiceExt;

use common::{IMAGE_BYTES, TestApp, UPSTREAM_TIMEOUT};
use tgallery_serve::proxy::IMAGE_CACHE_CONTROL;

#[tokio::test]
async fn resolvable_file_is_streamed_with_cache_headers() {
    let app = TestApp::new().await;

    let res = app.get("/image/good").await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(&res.body[..], IMAGE_BYTES);
    assert_eq!(res.header(header::CONTENT_TYPE), Some("image/jpeg"));
    assert_eq!(res.header(header::CACHE_CONTROL), Some(IMAGE_CACHE_CONTROL));
    assert_eq!(res.header(header::ACCESS_CONTROL_ALLOW_ORIGIN), Some("*"));
    assert_eq!(app.telegram.get_file_calls(), 1);
}

#[tokio::test]
async fn file_id_with_slashes_is_passed_through_whole() {
    let app = TestApp::new().await;

    let res = app.get("/image/photo/with/slash").await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(&res.body[..], IMAGE_BYTES);
}

#[tokio::test]
async fn refused_get_file_is_bad_gateway() {
    let app = TestApp::new().await;

    let res = app.get("/image/abc123").await;

    assert_eq!(res.status, StatusCode::BAD_GATEWAY);
    assert!(res.body.len() < 64);
    assert_eq!(
        res.header(header::CONTENT_TYPE),
        Some("text/plain; charset=utf-8")
    );
    assert!(res.header(header::CACHE_CONTROL).is_none());
}

#[tokio::test]
async fn failed_download_is_bad_gateway() {
    let app = TestApp::new().await;

    let res = app.get("/image/gone").await;

    assert_eq!(res.status, StatusCode::BAD_GATEWAY);
    assert_ne!(&res.body[..], IMAGE_BYTES);
}

#[tokio::test]
async fn undecodable_reply_is_internal_error() {
    let app = TestApp::new().await;

    let res = app.get("/image/garbage").await;

    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn slow_upstream_times_out_as_internal_error() {
    let app = TestApp::new().await;

    let res = app.get("/image/slow").await;

    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn download_that_stalls_mid_body_is_aborted() {
    let app = TestApp::new().await;

    let request = Request::builder()
        .uri("/image/stall")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = tokio::time::timeout(
        UPSTREAM_TIMEOUT * 6,
        to_bytes(response.into_body(), usize::MAX),
    )
    .await
    .expect("body read should end once the upstream goes quiet");
    assert!(body.is_err());
}

#[tokio::test]
async fn unreachable_upstream_is_internal_error() {
    let app = TestApp::with_config(|config| {
        config.telegram_api_base = "http://127.0.0.1:1".to_string();
    })
    .await;

    let res = app.get("/image/good").await;

    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!res.text().contains(common::TOKEN));
}

#[tokio::test]
async fn empty_file_id_never_reaches_upstream() {
    let app = TestApp::new().await;

    let res = app.get("/image/").await;

    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(app.telegram.get_file_calls(), 0);
}
