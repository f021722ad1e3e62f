//! Local stand-in for the upstream image service

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Nothing listens on port 1, so connections are refused immediately
pub const UNREACHABLE_UPSTREAM: &str = "http://127.0.0.1:1";

pub struct FakeUpstream {
    pub base_url: String,
    hits: Arc<AtomicUsize>,
}

impl FakeUpstream {
    /// Number of requests the upstream has received
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Deterministic non-empty image payload
pub fn image_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

/// Serve `/200` (9000 bytes), `/0` (empty 200), `/503` (503), anything else 404
pub async fn spawn_upstream() -> FakeUpstream {
    let hits = Arc::new(AtomicUsize::new(0));
    let router = Router::new()
        .route("/{code}", get(serve_code))
        .with_state(hits.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    FakeUpstream {
        base_url: format!("http://{}", addr),
        hits,
    }
}

async fn serve_code(State(hits): State<Arc<AtomicUsize>>, Path(code): Path<String>) -> Response {
    hits.fetch_add(1, Ordering::SeqCst);

    match code.as_str() {
        "200" => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "image/jpeg")],
            image_bytes(9000),
        )
            .into_response(),
        "0" => (StatusCode::OK, Vec::<u8>::new()).into_response(),
        "503" => StatusCode::SERVICE_UNAVAILABLE.into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}
