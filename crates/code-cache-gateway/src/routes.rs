//! HTTP routing and the cache operations
//!
//! Every request lands in one handler: the first path segment is parsed as
//! the resource key and the method picks GET, PUT or DELETE.

use crate::config::GatewayConfig;
use crate::response::{CacheStatus, Reply};
use crate::upstream::UpstreamFetcher;
use axum::{
    body::Body,
    extract::{Request, State},
    http::Method,
    response::{IntoResponse, Response},
    Router,
};
use flat_file_cache::{FileCache, ResourceKey};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

/// Shared state for the HTTP server
pub struct ServerState {
    pub cache: FileCache,
    pub upstream: UpstreamFetcher,
    pub config: GatewayConfig,
}

impl ServerState {
    pub fn new(cache: FileCache, upstream: UpstreamFetcher, config: GatewayConfig) -> Self {
        Self {
            cache,
            upstream,
            config,
        }
    }
}

pub type SharedState = Arc<ServerState>;

/// Create the HTTP router
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .fallback(handle_request)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(state: SharedState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(state.config.listen_addr()).await?;
    let addr = listener.local_addr()?;
    info!(
        "Server listening at http://{}, cache={}",
        addr,
        state.config.cache_dir.display()
    );

    let router = create_router(state);
    axum::serve(listener, router).await
}

/// Resource key from the first non-empty path segment
pub fn extract_key(path: &str) -> Option<ResourceKey> {
    path.split('/')
        .find(|segment| !segment.is_empty())
        .and_then(ResourceKey::parse)
}

async fn handle_request(State(state): State<SharedState>, request: Request) -> Response {
    let Some(key) = extract_key(request.uri().path()) else {
        debug!(path = %request.uri().path(), "No valid key in path");
        return Reply::NotFound.into_response();
    };

    let method = request.method().clone();
    let reply = match method {
        Method::GET => handle_get(&state, &key).await,
        Method::PUT => handle_put(&state, &key, request.into_body()).await,
        Method::DELETE => handle_delete(&state, &key).await,
        _ => Reply::MethodNotAllowed,
    };

    reply.into_response()
}

/// Serve from the cache, falling back to the upstream and storing what it returns
async fn handle_get(state: &ServerState, key: &ResourceKey) -> Reply {
    match state.cache.get(key).await {
        Ok(Some(data)) => {
            return Reply::Image {
                data,
                cache: CacheStatus::Hit,
            }
        }
        Ok(None) => {}
        Err(e) => {
            warn!(key = %key, error = %e, "Failed to read cached entry, treating as miss");
        }
    }

    let data = match state.upstream.fetch(key).await {
        Ok(data) => data,
        Err(e) => {
            warn!(key = %key, error = %e, "Upstream fetch failed");
            return Reply::NotFound;
        }
    };

    if let Err(e) = state.cache.put(key, &data).await {
        error!(key = %key, error = %e, "Failed to cache fetched entry");
        return Reply::NotFound;
    }
    info!(key = %key, size = data.len(), "Cached entry from upstream");

    Reply::Image {
        data,
        cache: CacheStatus::Miss,
    }
}

/// Store the request body as the entry for `key`
async fn handle_put(state: &ServerState, key: &ResourceKey, body: Body) -> Reply {
    let data = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(data) => data,
        Err(e) => {
            error!(key = %key, error = %e, "Failed to read request body");
            return Reply::InternalError;
        }
    };

    if data.is_empty() {
        return Reply::EmptyBody;
    }

    match state.cache.put(key, &data).await {
        Ok(()) => {
            info!(key = %key, size = data.len(), "Stored entry");
            Reply::Created
        }
        Err(e) => {
            error!(key = %key, error = %e, "Failed to store entry");
            Reply::InternalError
        }
    }
}

async fn handle_delete(state: &ServerState, key: &ResourceKey) -> Reply {
    match state.cache.remove(key).await {
        Ok(true) => {
            info!(key = %key, "Deleted entry");
            Reply::Ok
        }
        Ok(false) => Reply::NotFound,
        Err(e) => {
            error!(key = %key, error = %e, "Failed to delete entry");
            Reply::InternalError
        }
    }
}
