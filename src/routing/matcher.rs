//! Route matching module
//!
//! Matches a request method and path against the route table.

use hyper::Method;

/// Handler selected by a matched route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Hello,
    WriteFile,
    ReadFile,
    VendorTest,
}

/// Build the service's routing table
pub fn default_routes() -> RouteTable {
    RouteTable::new()
        .route(Method::GET, "/api/hello", Endpoint::Hello)
        .route(Method::POST, "/api/write", Endpoint::WriteFile)
        .route(Method::GET, "/api/read/{name}", Endpoint::ReadFile)
        .route(Method::GET, "/actimize/test", Endpoint::VendorTest)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// Parsed path pattern such as `/api/read/{name}`
#[derive(Debug, Clone)]
pub struct PathPattern {
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Self {
        let segments = split_path(pattern)
            .map(|seg| {
                seg.strip_prefix('{')
                    .and_then(|s| s.strip_suffix('}'))
                    .map_or_else(
                        || Segment::Literal(seg.to_string()),
                        |name| Segment::Param(name.to_string()),
                    )
            })
            .collect();
        Self { segments }
    }

    /// Match `path`, returning captured (raw, still percent-encoded) params
    fn captures<'a>(&'a self, path: &'a str) -> Option<PathParams<'a>> {
        let mut params = Vec::new();
        let mut parts = split_path(path);

        for segment in &self.segments {
            let part = parts.next()?;
            match segment {
                Segment::Literal(lit) if lit == part => {}
                Segment::Param(name) if !part.is_empty() => params.push((name.as_str(), part)),
                _ => return None,
            }
        }

        if parts.next().is_some() {
            return None;
        }
        Some(PathParams(params))
    }
}

fn split_path(path: &str) -> std::str::Split<'_, char> {
    path.strip_prefix('/').unwrap_or(path).split('/')
}

/// Path parameters captured by a route
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PathParams<'a>(Vec<(&'a str, &'a str)>);

impl<'a> PathParams<'a> {
    pub fn get(&self, name: &str) -> Option<&'a str> {
        self.0.iter().find(|(k, _)| *k == name).map(|(_, v)| *v)
    }
}

/// A single route entry
#[derive(Debug, Clone)]
pub struct Route {
    pub method: Method,
    pub pattern: PathPattern,
    pub endpoint: Endpoint,
}

/// Result of matching a request against the table
#[derive(Debug, PartialEq, Eq)]
pub enum RouteMatch<'a> {
    Found {
        endpoint: Endpoint,
        params: PathParams<'a>,
    },
    /// Path exists but not for this method; carries the `Allow` header value
    MethodNotAllowed { allow: String },
    NotFound,
}

/// Ordered routing table; first match wins
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn route(mut self, method: Method, pattern: &str, endpoint: Endpoint) -> Self {
        self.routes.push(Route {
            method,
            pattern: PathPattern::parse(pattern),
            endpoint,
        });
        self
    }

    pub fn match_route<'a>(&'a self, method: &Method, path: &'a str) -> RouteMatch<'a> {
        let mut path_matched = false;

        for route in &self.routes {
            let Some(params) = route.pattern.captures(path) else {
                continue;
            };
            if method_accepts(&route.method, method) {
                return RouteMatch::Found {
                    endpoint: route.endpoint,
                    params,
                };
            }
            path_matched = true;
        }

        if path_matched {
            RouteMatch::MethodNotAllowed {
                allow: self.allowed_methods(path).unwrap_or_default(),
            }
        } else {
            RouteMatch::NotFound
        }
    }

    /// Comma-separated methods accepted for `path`, or `None` if no route matches it
    pub fn allowed_methods(&self, path: &str) -> Option<String> {
        let mut methods: Vec<&str> = Vec::new();
        for route in &self.routes {
            if route.pattern.captures(path).is_none() {
                continue;
            }
            let mut push = |m: &'static str| {
                if !methods.contains(&m) {
                    methods.push(m);
                }
            };
            if route.method == Method::GET {
                push("GET");
                push("HEAD");
            } else if let Some(name) = static_method_name(&route.method) {
                push(name);
            }
        }

        if methods.is_empty() {
            return None;
        }
        methods.push("OPTIONS");
        Some(methods.join(", "))
    }
}

fn method_accepts(route_method: &Method, request_method: &Method) -> bool {
    route_method == request_method
        || (*route_method == Method::GET && *request_method == Method::HEAD)
}

fn static_method_name(method: &Method) -> Option<&'static str> {
    match *method {
        Method::POST => Some("POST"),
        Method::PUT => Some("PUT"),
        Method::DELETE => Some("DELETE"),
        Method::PATCH => Some("PATCH"),
        _ => None,
    }
}
