//! Request parameter extraction
//!
//! Parameters come from the query string and, for form-encoded bodies, from
//! the body. Query values come first, so they win when a name appears in both.

use http_body_util::{BodyExt, Limited};
use hyper::body::Body;
use hyper::header::CONTENT_TYPE;
use hyper::{HeaderMap, Request};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Decoded request parameters in arrival order
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Params(Vec<(String, String)>);

impl Params {
    /// Parse a raw query string (without the leading `?`)
    pub fn from_query(query: Option<&str>) -> Self {
        query.map_or_else(Self::default, |q| Self::from_encoded(q.as_bytes()))
    }

    fn from_encoded(input: &[u8]) -> Self {
        Self(url::form_urlencoded::parse(input).into_owned().collect())
    }

    fn extend(&mut self, other: Self) {
        self.0.extend(other.0);
    }

    /// First non-empty value for `key`, or `default`.
    ///
    /// A present-but-empty value counts as absent.
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.0
            .iter()
            .find(|(k, v)| k == key && !v.is_empty())
            .map_or(default, |(_, v)| v.as_str())
    }
}

/// Collect query parameters plus form-body parameters from `req`.
///
/// Bodies larger than `max_body_size` are rejected even when the client
/// sent no `Content-Length`.
pub async fn collect_params<B>(req: Request<B>, max_body_size: usize) -> Result<Params, String>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let mut params = Params::from_query(req.uri().query());

    if is_form(req.headers()) {
        let body = Limited::new(req.into_body(), max_body_size)
            .collect()
            .await
            .map_err(|e| format!("Failed to read request body: {e}"))?
            .to_bytes();
        params.extend(Params::from_encoded(&body));
    }

    Ok(params)
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
}
