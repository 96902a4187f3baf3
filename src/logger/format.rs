//! Access log format module
//!
//! Supported formats:
//! - `combined` (Apache/Nginx combined format)
//! - `common` (Common Log Format - CLF)
//! - `json` (one JSON object per line)
//!
//! Unknown format names fall back to `combined`.

use chrono::{DateTime, Local};
use hyper::{Request, Version};
use std::net::SocketAddr;
use std::time::Duration;

pub const KNOWN_FORMATS: [&str; 3] = ["combined", "common", "json"];

/// Access log entry containing all request/response information
#[derive(Debug, Clone)]
pub struct AccessLogEntry {
    pub remote_addr: String,
    pub time: DateTime<Local>,
    pub method: String,
    pub path: String,
    /// Query string (without leading ?)
    pub query: Option<String>,
    /// Protocol as sent on the request line, e.g. `HTTP/1.1`
    pub protocol: &'static str,
    pub status: u16,
    pub body_bytes: u64,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
    pub request_time_us: u64,
}

impl AccessLogEntry {
    /// Capture the request side of the entry; the response side is filled by [`Self::finish`]
    pub fn from_request<B>(remote_addr: SocketAddr, req: &Request<B>) -> Self {
        let header = |name: &str| {
            req.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string)
        };

        Self {
            remote_addr: remote_addr.ip().to_string(),
            time: Local::now(),
            method: req.method().to_string(),
            path: req.uri().path().to_string(),
            query: req.uri().query().map(ToString::to_string),
            protocol: protocol_name(req.version()),
            status: 0,
            body_bytes: 0,
            referer: header("referer"),
            user_agent: header("user-agent"),
            request_time_us: 0,
        }
    }

    pub fn finish(&mut self, status: u16, body_bytes: u64, elapsed: Duration) {
        self.status = status;
        self.body_bytes = body_bytes;
        self.request_time_us = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
    }

    /// Format the log entry according to the specified format
    pub fn format(&self, format: &str) -> String {
        match format {
            "common" => self.format_common(),
            "json" => self.format_json(),
            _ => self.format_combined(),
        }
    }

    fn request_line(&self) -> String {
        match &self.query {
            Some(q) => format!("{} {}?{} {}", self.method, self.path, q, self.protocol),
            None => format!("{} {} {}", self.method, self.path, self.protocol),
        }
    }

    /// `$remote_addr - - [$time_local] "$request" $status $body_bytes_sent`
    fn format_common(&self) -> String {
        format!(
            "{} - - [{}] \"{}\" {} {}",
            self.remote_addr,
            self.time.format("%d/%b/%Y:%H:%M:%S %z"),
            self.request_line(),
            self.status,
            self.body_bytes,
        )
    }

    /// Common format plus `"$http_referer" "$http_user_agent"`
    fn format_combined(&self) -> String {
        format!(
            "{} \"{}\" \"{}\"",
            self.format_common(),
            self.referer.as_deref().unwrap_or("-"),
            self.user_agent.as_deref().unwrap_or("-"),
        )
    }

    fn format_json(&self) -> String {
        serde_json::json!({
            "remote_addr": self.remote_addr,
            "time": self.time.to_rfc3339(),
            "method": self.method,
            "path": self.path,
            "query": self.query,
            "protocol": self.protocol,
            "status": self.status,
            "body_bytes": self.body_bytes,
            "referer": self.referer,
            "user_agent": self.user_agent,
            "request_time_us": self.request_time_us,
        })
        .to_string()
    }
}

fn protocol_name(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "HTTP/0.9",
        Version::HTTP_10 => "HTTP/1.0",
        Version::HTTP_2 => "HTTP/2.0",
        Version::HTTP_3 => "HTTP/3.0",
        _ => "HTTP/1.1",
    }
}
