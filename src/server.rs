//! Static file server for the browser build.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Router,
    body::Body,
    extract::{Request, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tower_http::trace::TraceLayer;

pub const DEFAULT_PORT: u16 = 3000;

pub struct ServerConfig {
    pub port: u16,
    pub root: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            root: PathBuf::from("public"),
        }
    }
}

impl ServerConfig {
    /// Serve `root` on the port named by `PORT`, or 3000.
    pub fn from_env(root: PathBuf) -> Result<Self> {
        let port = parse_port(std::env::var("PORT").ok().as_deref())?;
        Ok(Self { port, root })
    }
}

fn parse_port(value: Option<&str>) -> Result<u16> {
    match value {
        None => Ok(DEFAULT_PORT),
        Some(raw) if raw.trim().is_empty() => Ok(DEFAULT_PORT),
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid PORT value '{}'", raw)),
    }
}

pub fn build_router(root: PathBuf) -> Router {
    Router::new()
        .fallback(static_handler)
        .with_state(Arc::new(root))
        .layer(TraceLayer::new_for_http())
}

/// Map a request path onto `root`. `None` when it tries to leave the root.
fn resolve(root: &Path, request_path: &str) -> Option<PathBuf> {
    let mut resolved = root.to_path_buf();
    for component in Path::new(request_path.trim_start_matches('/')).components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(resolved)
}

async fn static_handler(State(root): State<Arc<PathBuf>>, req: Request<Body>) -> Response {
    let Some(mut path) = resolve(&root, req.uri().path()) else {
        return (StatusCode::FORBIDDEN, "Forbidden").into_response();
    };

    if tokio::fs::metadata(&path).await.map(|m| m.is_dir()).unwrap_or(false) {
        path.push("index.html");
    }

    match tokio::fs::read(&path).await {
        Ok(content) => {
            let mime = mime_guess::from_path(&path).first_or_octet_stream();
            ([(header::CONTENT_TYPE, mime.as_ref().to_string())], content).into_response()
        }
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Static file not found");
            (StatusCode::NOT_FOUND, "Not Found").into_response()
        }
    }
}

pub async fn start_server(config: ServerConfig) -> Result<()> {
    let app = build_router(config.root.clone());

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    println!("Listening on port {}", config.port);
    tracing::info!(root = %config.root.display(), port = config.port, "Serving static files");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    println!("Server shut down gracefully.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    println!("\nShutting down...");
}
