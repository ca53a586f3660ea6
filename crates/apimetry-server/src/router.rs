//! Request routing with per-route interception markers.
//!
//! The router maps method + path to an operation ID and carries the
//! [`RouteMarkers`] declared at registration. Markers are resolved exactly
//! once, when the route is added, so a request never pays a policy lookup.
//!
//! Path templates use `{paramName}` segments:
//!
//! ```rust
//! use apimetry_core::RouteMarkers;
//! use apimetry_server::Router;
//! use http::Method;
//!
//! let mut router = Router::new();
//! router.add_route(Method::GET, "/merchants/{merchantId}", "getMerchant", RouteMarkers::new());
//!
//! let m = router.match_route(&Method::GET, "/merchants/42").unwrap();
//! assert_eq!(m.operation_id(), "getMerchant");
//! assert_eq!(m.param("merchantId"), Some("42"));
//! ```

use std::collections::HashMap;

use apimetry_core::RouteMarkers;
use http::Method;

/// A matched route with its markers and extracted path parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    operation_id: String,
    markers: RouteMarkers,
    params: HashMap<String, String>,
}

impl RouteMatch {
    /// Creates a new route match.
    #[must_use]
    pub fn new(
        operation_id: impl Into<String>,
        markers: RouteMarkers,
        params: HashMap<String, String>,
    ) -> Self {
        Self {
            operation_id: operation_id.into(),
            markers,
            params,
        }
    }

    /// Returns the operation ID for this route.
    #[must_use]
    pub fn operation_id(&self) -> &str {
        &self.operation_id
    }

    /// Returns the interception markers declared for this route.
    #[must_use]
    pub fn markers(&self) -> RouteMarkers {
        self.markers
    }

    /// Returns the extracted path parameters.
    #[must_use]
    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    /// Returns a specific path parameter by name.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// A segment of a path template.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PathSegment {
    Literal(String),
    Param(String),
}

#[derive(Debug, Clone)]
struct Route {
    method: Method,
    segments: Vec<PathSegment>,
    operation_id: String,
    markers: RouteMarkers,
}

impl Route {
    fn new(
        method: Method,
        pattern: &str,
        operation_id: impl Into<String>,
        markers: RouteMarkers,
    ) -> Self {
        Self {
            method,
            segments: Self::parse_segments(pattern),
            operation_id: operation_id.into(),
            markers,
        }
    }

    fn parse_segments(pattern: &str) -> Vec<PathSegment> {
        pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| {
                if s.starts_with('{') && s.ends_with('}') {
                    PathSegment::Param(s[1..s.len() - 1].to_string())
                } else {
                    PathSegment::Literal(s.to_string())
                }
            })
            .collect()
    }

    fn match_path(&self, path: &str) -> Option<HashMap<String, String>> {
        let path_segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        if path_segments.len() != self.segments.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (pattern, actual) in self.segments.iter().zip(path_segments.iter()) {
            match pattern {
                PathSegment::Literal(expected) => {
                    if expected != *actual {
                        return None;
                    }
                }
                PathSegment::Param(name) => {
                    params.insert(name.clone(), (*actual).to_string());
                }
            }
        }

        Some(params)
    }
}

/// HTTP request router.
///
/// First registered match wins.
#[derive(Debug, Clone, Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    /// Creates a new empty router.
    #[must_use]
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Adds a route with its interception markers.
    pub fn add_route(
        &mut self,
        method: Method,
        pattern: impl AsRef<str>,
        operation_id: impl Into<String>,
        markers: RouteMarkers,
    ) {
        self.routes
            .push(Route::new(method, pattern.as_ref(), operation_id, markers));
    }

    /// Returns the number of registered routes.
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// Matches an incoming request to a route.
    #[must_use]
    pub fn match_route(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        for route in &self.routes {
            if route.method == *method {
                if let Some(params) = route.match_path(path) {
                    return Some(RouteMatch::new(&route.operation_id, route.markers, params));
                }
            }
        }

        None
    }

    /// Checks if a specific operation ID is registered.
    #[must_use]
    pub fn has_operation(&self, operation_id: &str) -> bool {
        self.routes.iter().any(|r| r.operation_id == operation_id)
    }

    /// Returns all registered operation IDs.
    pub fn operation_ids(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|r| r.operation_id.as_str())
    }
}
