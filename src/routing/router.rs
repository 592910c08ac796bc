//! Route table: lookup and target resolution.
//!
//! # Responsibilities
//! - Parse configured targets into ready-to-use URI parts
//! - Look up the matching route for a request path
//! - Return matched route or explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) ordered prefix scan; declaration order is the tie-break
//! - Explicit no-match rather than silent default

use axum::http::uri::{Authority, Scheme};
use axum::http::HeaderValue;
use thiserror::Error;
use url::Url;

use crate::config::schema::RouteConfig;
use crate::routing::matcher;

/// A configured target could not be turned into a usable route.
#[derive(Debug, Error)]
#[error("route {prefix:?}: target {target:?} not usable: {reason}")]
pub struct RouteBuildError {
    pub prefix: String,
    pub target: String,
    pub reason: String,
}

/// A single routing descriptor. Immutable once the table is built.
#[derive(Debug, Clone)]
pub struct Route {
    /// Matched against the start of the request path.
    pub prefix: String,

    /// Whether the auth gate must pass before forwarding.
    pub requires_auth: bool,

    scheme: Scheme,
    authority: Authority,
    host_header: HeaderValue,
    base_path: String,
}

impl Route {
    fn from_config(config: &RouteConfig) -> Result<Self, RouteBuildError> {
        let fail = |reason: String| RouteBuildError {
            prefix: config.prefix.clone(),
            target: config.target.clone(),
            reason,
        };

        let url = Url::parse(&config.target).map_err(|e| fail(e.to_string()))?;
        let host = url.host_str().ok_or_else(|| fail("missing host".to_string()))?;

        let authority = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        let authority: Authority = authority
            .parse()
            .map_err(|e| fail(format!("bad authority: {e}")))?;
        let scheme: Scheme = url
            .scheme()
            .parse()
            .map_err(|_| fail(format!("bad scheme {:?}", url.scheme())))?;
        let host_header = HeaderValue::from_str(authority.as_str())
            .map_err(|e| fail(format!("bad host header: {e}")))?;

        Ok(Self {
            prefix: config.prefix.clone(),
            requires_auth: config.requires_auth,
            scheme,
            authority,
            host_header,
            base_path: url.path().to_string(),
        })
    }

    pub fn scheme(&self) -> &Scheme {
        &self.scheme
    }

    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    /// Host header value for change-origin forwarding.
    pub fn host_header(&self) -> &HeaderValue {
        &self.host_header
    }

    /// Rewrite an inbound path for this route's backend: the matched prefix
    /// is stripped and the remainder joined onto the target's base path.
    pub fn rewrite(&self, path: &str) -> String {
        matcher::rewrite_path(&self.prefix, &self.base_path, path)
    }
}

/// Ordered, read-only route table.
///
/// Built once at startup and shared across request tasks without locking.
#[derive(Debug)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// Build the table, preserving declaration order exactly.
    pub fn from_config(configs: &[RouteConfig]) -> Result<Self, RouteBuildError> {
        let routes = configs
            .iter()
            .map(Route::from_config)
            .collect::<Result<Vec<_>, _>>()?;

        // First match wins, so a prefix that extends an earlier one can
        // never be reached. Legal config, but worth surfacing.
        for (i, route) in routes.iter().enumerate() {
            if let Some(earlier) = routes[..i]
                .iter()
                .find(|e| matcher::prefix_matches(&e.prefix, &route.prefix))
            {
                tracing::warn!(
                    unreachable = %route.prefix,
                    shadowed_by = %earlier.prefix,
                    "Route declared after a broader prefix will never match"
                );
            }
        }

        Ok(Self { routes })
    }

    /// First route whose prefix matches `path`, in declaration order.
    pub fn matches(&self, path: &str) -> Option<&Route> {
        self.routes
            .iter()
            .find(|route| matcher::prefix_matches(&route.prefix, path))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
