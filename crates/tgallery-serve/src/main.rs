//! tgallery-serve binary.
//!
//! Loads configuration from the environment (optionally seeded from a
//! dotenv file), opens both SQLite files and serves until SIGINT or SIGTERM.

use std::path::PathBuf;

use anyhow::Context;
use axum::Router;
use axum::http::Request;
use clap::Parser;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use tgallery_serve::{AppState, Config, router};

#[derive(Parser, Debug)]
#[command(name = "tgallery-serve", version)]
#[command(about = "Image gallery server backed by the Telegram Bot API", long_about = None)]
struct Args {
    /// Dotenv file read before the environment; skipped when missing.
    #[arg(long, env = "DOTENV_PATH", default_value = ".env")]
    dotenv: PathBuf,

    /// Listen address, overriding GALLERY_BIND_ADDR.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Before tracing starts, so RUST_LOG can come from the file.
    let dotenv_loaded = args.dotenv.is_file();
    if dotenv_loaded {
        dotenvy::from_path(&args.dotenv)
            .with_context(|| format!("reading {}", args.dotenv.display()))?;
    }

    init_tracing();
    if dotenv_loaded {
        tracing::info!(path = %args.dotenv.display(), "loaded dotenv file");
    }

    let mut config = Config::from_env()?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    let bind_addr = config.bind_addr.clone();

    let app = with_http_layers(router(AppState::new(config)?));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {bind_addr}"))?;
    tracing::info!(addr = %listener.local_addr()?, "gallery listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("gallery stopped");
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Request spans and a permissive CORS policy; every route is public.
fn with_http_layers(app: Router) -> Router {
    let trace = TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
        tracing::span!(
            Level::INFO,
            "http_request",
            method = %request.method(),
            path = %request.uri().path(),
            query = request.uri().query().unwrap_or_default(),
        )
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    app.layer(trace).layer(cors)
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = tokio::signal::ctrl_c() => {}
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable, waiting for ctrl-c only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    tracing::info!("shutdown signal received, draining connections");
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn args_are_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn bind_flag_is_optional() {
        let args = Args::try_parse_from(["tgallery-serve"]).unwrap();
        assert!(args.bind.is_none());

        let args = Args::try_parse_from(["tgallery-serve", "--bind", "0.0.0.0:9000"]).unwrap();
        assert_eq!(args.bind.as_deref(), Some("0.0.0.0:9000"));
    }
}
