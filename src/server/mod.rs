//! Preview server
//!
//! Serves the public directory the way a static host would, mapping
//! extensionless routes to their `.html` files, and rebuilds the site when
//! sources change.

use anyhow::Result;
use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower_http::services::ServeFile;
use tower_http::trace::TraceLayer;

use crate::commands::generate;
use crate::helpers::join_url;
use crate::Folio;

/// Server state
struct ServerState {
    public_dir: PathBuf,
    /// Site base path (`base_url`), always starting with `/`
    base_path: String,
}

/// Start the preview server
pub async fn start(folio: &Folio, ip: &str, port: u16, watch: bool) -> Result<()> {
    let state = Arc::new(ServerState {
        public_dir: folio.public_dir.clone(),
        base_path: join_url(&[&folio.config.base_url]),
    });

    let app = Router::new()
        .fallback(fallback_handler)
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!(
        "http://{}:{}{}",
        ip,
        port,
        join_url(&[&folio.config.base_url])
    );
    println!("Server running at {}", url);
    if watch {
        println!("Watching for changes...");
    }
    println!("Press Ctrl+C to stop.");

    if watch {
        let paths = generate::watched_paths(folio);
        let base_dir = folio.base_dir.clone();
        tokio::task::spawn_blocking(move || {
            let result = generate::watch_with(&paths, |_| {
                match Folio::new(&base_dir).and_then(|folio| generate::run(&folio)) {
                    Ok(()) => tracing::info!("Regenerated successfully"),
                    // The previous build stays in place and keeps being served
                    Err(e) => tracing::error!("Generation failed: {:#}", e),
                }
            });
            if let Err(e) = result {
                tracing::error!("File watcher error: {}", e);
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Serve the file a request path maps to
async fn fallback_handler(
    State(state): State<Arc<ServerState>>,
    request: Request<Body>,
) -> Response {
    let Some(file_path) = resolve_file(&state.public_dir, &state.base_path, request.uri().path())
    else {
        return not_found(&state.public_dir).await;
    };

    match ServeFile::new(&file_path).try_call(request).await {
        Ok(response) => response.into_response(),
        Err(e) => {
            tracing::error!("Failed to serve {:?}: {}", file_path, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
        }
    }
}

async fn not_found(public_dir: &Path) -> Response {
    match tokio::fs::read_to_string(public_dir.join("404.html")).await {
        Ok(html) => (StatusCode::NOT_FOUND, axum::response::Html(html)).into_response(),
        Err(_) => (StatusCode::NOT_FOUND, "Not found").into_response(),
    }
}

/// Map a request path to a file under `public_dir`.
///
/// The base path is stripped first; then the path is tried as a file, as a
/// directory with `index.html`, and as `<path>.html`.
fn resolve_file(public_dir: &Path, base_path: &str, request_path: &str) -> Option<PathBuf> {
    let clean = join_url(&[request_path]);
    let rel = if base_path == "/" {
        clean.as_str()
    } else {
        match clean.strip_prefix(base_path) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
            _ => return None,
        }
    };
    let rel = rel.trim_matches('/');

    let candidate = public_dir.join(rel);
    if candidate.is_file() {
        return Some(candidate);
    }
    let index = candidate.join("index.html");
    if index.is_file() {
        return Some(index);
    }
    let html = public_dir.join(format!("{}.html", rel));
    if !rel.is_empty() && html.is_file() {
        return Some(html);
    }
    None
}
