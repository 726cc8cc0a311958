//! Telegram Bot API file resolution.
//!
//! Files are reachable in two steps: `getFile` turns a `file_id` into a
//! short-lived `file_path`, then the bytes are downloaded from
//! `/file/bot<token>/<file_path>`. Nothing is cached between calls; a
//! `file_path` is only guaranteed valid for about an hour.

use std::future::Future;
use std::time::Duration;

use serde::Deserialize;

use crate::config::Config;
use crate::error::ProxyError;

/// Envelope of every Bot API reply.
#[derive(Debug, Deserialize)]
struct GetFileResponse {
    ok: bool,
    #[serde(default)]
    result: Option<TelegramFile>,
    #[serde(default)]
    description: Option<String>,
}

/// The `File` object returned by `getFile`.
#[derive(Debug, Deserialize)]
struct TelegramFile {
    /// Absent when the file is too large to be downloaded by bots.
    #[serde(default)]
    file_path: Option<String>,
}

impl GetFileResponse {
    /// Extract the download path, treating every refusal as a rejection.
    fn into_file_path(self) -> Result<String, ProxyError> {
        if !self.ok {
            return Err(ProxyError::Rejected(
                self.description
                    .unwrap_or_else(|| "getFile returned ok=false".to_string()),
            ));
        }

        self.result
            .and_then(|file| file.file_path)
            .filter(|path| !path.is_empty())
            .ok_or_else(|| ProxyError::Rejected("getFile returned no file_path".to_string()))
    }
}

/// Client for the two Bot API calls the image proxy needs.
#[derive(Clone)]
pub struct FileResolver {
    http: reqwest::Client,
    api_base: String,
    token: String,
    timeout: Duration,
}

impl std::fmt::Debug for FileResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileResolver")
            .field("api_base", &self.api_base)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl FileResolver {
    /// Build a resolver from configuration.
    ///
    /// The read timeout also covers the streamed download body: an upstream
    /// that goes quiet for longer than `upstream_timeout` ends the stream
    /// with an error.
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.upstream_timeout)
            .read_timeout(config.upstream_timeout)
            .user_agent(concat!("tgallery-serve/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            api_base: config.telegram_api_base.clone(),
            token: config.bot_token.clone(),
            timeout: config.upstream_timeout,
        })
    }

    /// Step 1: resolve an opaque `file_id` into a transient `file_path`.
    ///
    /// The reply is decoded whatever the HTTP status, since the Bot API
    /// reports refusals as `{"ok": false}` bodies with 4xx statuses.
    pub async fn describe(&self, file_id: &str) -> Result<String, ProxyError> {
        let url = format!("{}/bot{}/getFile", self.api_base, self.token);

        let reply: GetFileResponse = self
            .bounded(async {
                self.http
                    .get(&url)
                    .query(&[("file_id", file_id)])
                    .send()
                    .await?
                    .json::<GetFileResponse>()
                    .await
            })
            .await?;

        reply.into_file_path()
    }

    /// Step 2: start downloading the bytes at `file_path`.
    ///
    /// Only the response head is awaited here; the body is left for the
    /// caller to stream, bounded per read by the client's read timeout.
    pub async fn fetch(&self, file_path: &str) -> Result<reqwest::Response, ProxyError> {
        let url = format!(
            "{}/file/bot{}/{}",
            self.api_base,
            self.token,
            file_path.trim_start_matches('/')
        );

        let response = self.bounded(self.http.get(&url).send()).await?;

        if !response.status().is_success() {
            return Err(ProxyError::Rejected(format!(
                "file download answered {}",
                response.status()
            )));
        }

        Ok(response)
    }

    /// Apply the upstream timeout and strip URLs (which embed the token) from errors.
    async fn bounded<T, F>(&self, call: F) -> Result<T, ProxyError>
    where
        F: Future<Output = Result<T, reqwest::Error>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(ProxyError::Transport(err.without_url())),
            Err(_) => Err(ProxyError::Timeout(self.timeout)),
        }
    }
}
