//! Request routing dispatch module
//!
//! Entry point for HTTP request processing, responsible for body-size
//! validation, route matching, dispatching, and mapping handler errors to
//! responses.

use crate::config::AppState;
use crate::handler::{files, vendor};
use crate::http::{self, params};
use crate::logger;
use crate::routing::{Endpoint, RouteMatch};
use crate::storage::StorageError;
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderValue, SERVER};
use hyper::{Method, Request, Response, StatusCode};
use std::convert::Infallible;
use std::sync::Arc;

pub const GREETING: &str = "Spring Boot + Vendor JARs (Port 33333) ✅";

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let mut response = dispatch(req, &state).await;

    if let Ok(value) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, value);
    }
    Ok(response)
}

async fn dispatch<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let max_body_size = usize::try_from(state.config.http.max_body_size).unwrap_or(usize::MAX);

    // 1. Check body size
    if let Some(resp) = check_body_size(&req, max_body_size) {
        return resp;
    }

    // 2. OPTIONS is answered from the route table
    let path = req.uri().path().to_string();
    if req.method() == Method::OPTIONS {
        return state
            .routes
            .allowed_methods(&path)
            .map_or_else(http::build_404_response, |allow| {
                http::build_options_response(&allow)
            });
    }

    // 3. Route
    let is_head = req.method() == Method::HEAD;
    let (endpoint, name) = match state.routes.match_route(req.method(), &path) {
        RouteMatch::Found { endpoint, params } => {
            (endpoint, params.get("name").map(ToString::to_string))
        }
        RouteMatch::MethodNotAllowed { allow } => {
            logger::log_warning(&format!("Method not allowed: {} {path}", req.method()));
            return http::build_405_response(&allow);
        }
        RouteMatch::NotFound => return http::build_404_response(),
    };

    // 4. Dispatch
    let store = &state.store;
    let result = match endpoint {
        Endpoint::Hello => Ok(GREETING.to_string()),
        Endpoint::WriteFile => match params::collect_params(req, max_body_size).await {
            Ok(params) => files::write_file(&params, store).await,
            Err(e) => {
                logger::log_warning(&e);
                return http::build_400_response(&e);
            }
        },
        Endpoint::ReadFile => files::read_file(name.as_deref().unwrap_or_default(), store).await,
        Endpoint::VendorTest => vendor::test_vendor(store, &state.config.storage.vendor_file).await,
    };

    storage_response(result, is_head)
}

/// Map a handler result to a response.
///
/// Invalid names are the client's fault; every other storage failure is a
/// generic 500 with the detail kept in the error log.
fn storage_response(result: Result<String, StorageError>, is_head: bool) -> Response<Full<Bytes>> {
    match result {
        Ok(body) => http::build_text_response(StatusCode::OK, body, is_head),
        Err(StorageError::InvalidName { name, reason }) => {
            logger::log_warning(&format!("Rejected file name '{name}': {reason}"));
            http::build_400_response(&format!("❌ Invalid file name: {name}"))
        }
        Err(err @ StorageError::Io { .. }) => {
            logger::log_error(&err.to_string());
            http::build_500_response()
        }
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size<B>(req: &Request<B>, max_body_size: usize) -> Option<Response<Full<Bytes>>> {
    let content_length = req.headers().get("content-length")?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<usize>() {
            Ok(size) if size > max_body_size => {
                logger::log_warning(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}
