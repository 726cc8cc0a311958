//! Shared fixtures: in-memory stores, a fake Bot API, and a request helper.

#![allow(dead_code)]

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::Router;
use axum::body::{Body, Bytes, to_bytes};
use axum::extract::{Query, State};
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use futures::{StreamExt, stream};
use rusqlite::params;
use serde::Deserialize;
use tokio::sync::oneshot;
use tower::ServiceExt;

use tgallery_serve::history::KV_SCHEMA;
use tgallery_serve::query::IMAGES_SCHEMA;
use tgallery_serve::store::Store;
use tgallery_serve::{AppState, Config, router};

/// Token the fake Bot API answers to.
pub const TOKEN: &str = "test-token";

/// Bytes served for every downloadable file.
pub const IMAGE_BYTES: &[u8] = b"\xFF\xD8\xFF\xE0fake-jpeg-payload";

/// Upstream bound used by test apps; the slow file id outlasts it.
pub const UPSTREAM_TIMEOUT: Duration = Duration::from_millis(500);

/// First and only chunk of the stalled download.
pub const STALL_PREFIX: &[u8] = b"\xFF\xD8partial";

#[derive(Clone)]
struct FakeState {
    get_file_calls: Arc<AtomicUsize>,
}

#[derive(Debug, Deserialize)]
struct GetFileQuery {
    file_id: String,
}

/// Bot API double serving `getFile` and file downloads on `127.0.0.1:0`.
///
/// File ids drive the behaviour:
/// - `good`, `photo/with/slash`: resolvable and downloadable
/// - `gone`: resolvable, but the download answers 404
/// - `garbage`: `getFile` answers a body that is not JSON
/// - `slow`: `getFile` never answers within [`UPSTREAM_TIMEOUT`]
/// - `stall`: the download sends its head and [`STALL_PREFIX`], then goes quiet
/// - anything else: `{"ok": false}` with status 400
pub struct FakeTelegram {
    base_url: String,
    get_file_calls: Arc<AtomicUsize>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    _task: tokio::task::JoinHandle<()>,
}

impl FakeTelegram {
    pub async fn start() -> Self {
        let get_file_calls = Arc::new(AtomicUsize::new(0));
        let state = FakeState {
            get_file_calls: get_file_calls.clone(),
        };

        let app = Router::new()
            .route(&format!("/bot{TOKEN}/getFile"), get(get_file))
            .route(&format!("/file/bot{TOKEN}/photos/good.jpg"), get(download))
            .route(&format!("/file/bot{TOKEN}/photos/stall.jpg"), get(stalled_download))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake bot api");
        let addr: SocketAddr = listener.local_addr().expect("local addr");
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });
            let _ = server.await;
        });

        Self {
            base_url: format!("http://{addr}"),
            get_file_calls,
            shutdown_tx: Some(shutdown_tx),
            _task: task,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Number of `getFile` calls received so far.
    pub fn get_file_calls(&self) -> usize {
        self.get_file_calls.load(Ordering::SeqCst)
    }
}

impl Drop for FakeTelegram {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn get_file(State(state): State<FakeState>, Query(query): Query<GetFileQuery>) -> Response {
    state.get_file_calls.fetch_add(1, Ordering::SeqCst);

    let resolved = |path: &str| {
        axum::Json(serde_json::json!({
            "ok": true,
            "result": {
                "file_id": query.file_id,
                "file_unique_id": "unique",
                "file_size": IMAGE_BYTES.len(),
                "file_path": path,
            }
        }))
        .into_response()
    };

    match query.file_id.as_str() {
        "good" | "photo/with/slash" => resolved("photos/good.jpg"),
        "gone" => resolved("photos/gone.jpg"),
        "stall" => resolved("photos/stall.jpg"),
        "garbage" => (StatusCode::OK, "definitely not json").into_response(),
        "slow" => {
            tokio::time::sleep(UPSTREAM_TIMEOUT * 10).await;
            resolved("photos/good.jpg")
        }
        _ => (
            StatusCode::BAD_REQUEST,
            axum::Json(serde_json::json!({
                "ok": false,
                "error_code": 400,
                "description": "Bad Request: invalid file_id",
            })),
        )
            .into_response(),
    }
}

async fn download() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "image/jpeg"),
            (header::CACHE_CONTROL, "max-age=0"),
        ],
        IMAGE_BYTES,
    )
}

/// Announces 100 bytes, sends a few, then never finishes.
async fn stalled_download() -> impl IntoResponse {
    let body = stream::once(async { Ok::<_, Infallible>(Bytes::from_static(STALL_PREFIX)) })
        .chain(stream::pending());

    (
        [
            (header::CONTENT_TYPE, "image/jpeg"),
            (header::CONTENT_LENGTH, "100"),
        ],
        Body::from_stream(body),
    )
}

/// Configuration pointing at `api_base`, listing cache off.
pub fn test_config(api_base: &str) -> Config {
    Config {
        bind_addr: "127.0.0.1:0".to_string(),
        database_path: ":memory:".to_string(),
        kv_path: ":memory:".to_string(),
        bot_token: TOKEN.to_string(),
        telegram_api_base: api_base.to_string(),
        upstream_timeout: UPSTREAM_TIMEOUT,
        site_name: "Test Gallery".to_string(),
        history_api: true,
        list_cache_ttl: Duration::ZERO,
    }
}

/// A row of the `images` table.
pub struct Row {
    pub id: i64,
    pub file_name: &'static str,
    pub caption: Option<&'static str>,
    pub tags: Option<&'static str>,
    pub created_at: i64,
}

/// Router plus handles on everything behind it.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub telegram: FakeTelegram,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Build an app whose config is adjusted by `tweak` before use.
    pub async fn with_config(tweak: impl FnOnce(&mut Config)) -> Self {
        let telegram = FakeTelegram::start().await;
        let mut config = test_config(telegram.base_url());
        tweak(&mut config);

        let store = Store::open_in_memory(IMAGES_SCHEMA).expect("image store");
        let kv = Store::open_in_memory(KV_SCHEMA).expect("kv store");
        let state = AppState::from_parts(config, store, kv).expect("state");

        Self {
            router: router(state.clone()),
            state,
            telegram,
        }
    }

    pub async fn seed(&self, rows: Vec<Row>) {
        self.state
            .store
            .call(move |conn| {
                for row in &rows {
                    conn.execute(
                        "INSERT INTO images (id, file_name, caption, tags, created_at) \
                         VALUES (?1, ?2, ?3, ?4, ?5)",
                        params![row.id, row.file_name, row.caption, row.tags, row.created_at],
                    )?;
                }
                Ok(())
            })
            .await
            .expect("seed");
    }

    /// Break the image store so every query fails.
    pub async fn drop_images_table(&self) {
        self.state
            .store
            .call(|conn| conn.execute_batch("DROP TABLE images"))
            .await
            .expect("drop table");
    }

    pub async fn send(&self, method: Method, uri: &str, body: Body) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(body)
            .expect("request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible router");

        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, Body::empty()).await
    }
}

/// Fully buffered response.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("json body")
    }

    pub fn header(&self, name: header::HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Ids of a JSON listing, in order.
    pub fn ids(&self) -> Vec<i64> {
        self.json()
            .as_array()
            .expect("json array")
            .iter()
            .map(|row| row["id"].as_i64().expect("id"))
            .collect()
    }
}
