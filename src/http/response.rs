//! HTTP response building module
//!
//! Every body this service produces is plain UTF-8 text.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Build a text response; `is_head` keeps the headers but drops the body
pub fn build_text_response(
    status: StatusCode,
    content: impl Into<Bytes>,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let content = content.into();
    let content_length = content.len();
    let body = if is_head { Bytes::new() } else { content };

    Response::builder()
        .status(status)
        .header("Content-Type", TEXT_PLAIN)
        .header("Content-Length", content_length)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 400 Bad Request response
pub fn build_400_response(message: &str) -> Response<Full<Bytes>> {
    build_text_response(StatusCode::BAD_REQUEST, message.to_string(), false)
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<Full<Bytes>> {
    build_text_response(StatusCode::NOT_FOUND, "404 Not Found", false)
}

/// Build 405 Method Not Allowed response
pub fn build_405_response(allow: &str) -> Response<Full<Bytes>> {
    let mut resp = build_text_response(
        StatusCode::METHOD_NOT_ALLOWED,
        "405 Method Not Allowed",
        false,
    );
    if let Ok(value) = allow.parse() {
        resp.headers_mut().insert("Allow", value);
    }
    resp
}

/// Build OPTIONS response listing the methods accepted for the path
pub fn build_options_response(allow: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Allow", allow)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("OPTIONS", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 413 Payload Too Large response
pub fn build_413_response() -> Response<Full<Bytes>> {
    build_text_response(StatusCode::PAYLOAD_TOO_LARGE, "413 Payload Too Large", false)
}

/// Build 500 Internal Server Error response; details stay in the error log
pub fn build_500_response() -> Response<Full<Bytes>> {
    build_text_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        "500 Internal Server Error",
        false,
    )
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
