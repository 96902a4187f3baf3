//! Routing module
//!
//! Explicit routing table built at startup:
//! - Literal path segments and `{param}` single-segment captures
//! - Method dispatch with 405 detection (HEAD served by GET routes)

mod matcher;

pub use matcher::{default_routes, Endpoint, RouteMatch, RouteTable};
