//! Terminal responses of the gateway

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

const IMAGE_CONTENT_TYPE: &str = "image/jpeg";
const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Where an image reply was served from, reported in `X-Cache`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    fn as_str(self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
        }
    }
}

/// Every outcome a request can end with
#[derive(Debug)]
pub enum Reply {
    Image { data: Vec<u8>, cache: CacheStatus },
    Created,
    Ok,
    NotFound,
    EmptyBody,
    MethodNotAllowed,
    InternalError,
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        match self {
            Reply::Image { data, cache } => {
                let mut response = send_response(StatusCode::OK, IMAGE_CONTENT_TYPE, data.into());
                response
                    .headers_mut()
                    .insert("x-cache", HeaderValue::from_static(cache.as_str()));
                response
            }
            Reply::Created => text(StatusCode::CREATED, "Created"),
            Reply::Ok => text(StatusCode::OK, "OK"),
            Reply::NotFound => text(StatusCode::NOT_FOUND, "Not Found"),
            Reply::EmptyBody => text(StatusCode::BAD_REQUEST, "Empty body"),
            Reply::MethodNotAllowed => text(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed"),
            Reply::InternalError => {
                text(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
        }
    }
}

fn text(status: StatusCode, message: &'static str) -> Response {
    send_response(status, TEXT_CONTENT_TYPE, Body::from(message))
}

/// Build the single response for a request
fn send_response(status: StatusCode, content_type: &'static str, body: Body) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, HeaderValue::from_static(content_type))],
        body,
    )
        .into_response()
}
