//! Upstream forwarding.
//!
//! # Responsibilities
//! - Rewrite the matched path prefix onto the target's base path
//! - Rewrite the host header to the target authority (change origin)
//! - Strip hop-by-hop headers in both directions
//! - Stream the upstream response back without buffering
//! - Map upstream failures to gateway errors within a bounded time
//!
//! Cancellation rides on drop: if the client disconnects, the handler
//! future is dropped and the in-flight upstream call aborts with it.

use std::time::Duration;

use axum::body::Body;
use axum::http::{header, uri::Uri, HeaderMap, Request, Response};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use tokio::time::timeout;

use crate::config::schema::TimeoutConfig;
use crate::http::error::GatewayError;
use crate::routing::router::Route;

/// Headers that describe the connection hop, not the message.
const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Relays requests to a route's backend and streams responses back.
pub struct Forwarder {
    client: Client<HttpConnector, Body>,
    upstream_timeout: Duration,
}

impl Forwarder {
    pub fn new(timeouts: &TimeoutConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(timeouts.connect_secs)));

        let client = Client::builder(TokioExecutor::new()).build(connector);

        Self {
            client,
            upstream_timeout: Duration::from_secs(timeouts.upstream_secs),
        }
    }

    /// Forward `request` to `route`'s target.
    ///
    /// Method, query string, remaining headers, and body are preserved;
    /// status, headers, and body of the upstream response are relayed
    /// verbatim. Failures surface as gateway errors, never as panics.
    pub async fn forward(
        &self,
        route: &Route,
        request: Request<Body>,
    ) -> Result<Response<Body>, GatewayError> {
        let (mut parts, body) = request.into_parts();

        let path = route.rewrite(parts.uri.path());
        let path_and_query = match parts.uri.query() {
            Some(query) => format!("{path}?{query}"),
            None => path,
        };

        parts.uri = Uri::builder()
            .scheme(route.scheme().clone())
            .authority(route.authority().clone())
            .path_and_query(path_and_query)
            .build()
            .map_err(|e| GatewayError::Internal(format!("rewritten URI invalid: {e}")))?;

        strip_hop_by_hop(&mut parts.headers);
        parts.headers.insert(header::HOST, route.host_header().clone());

        let upstream_request = Request::from_parts(parts, body);

        let response = timeout(self.upstream_timeout, self.client.request(upstream_request))
            .await
            .map_err(|_| GatewayError::UpstreamTimeout)??;

        let (mut parts, body) = response.into_parts();
        strip_hop_by_hop(&mut parts.headers);

        Ok(Response::from_parts(parts, Body::new(body)))
    }
}

/// RFC 9110 §7.6.1: drop the fixed hop-by-hop set plus anything the
/// Connection header names.
fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let connection_named: Vec<String> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(|name| name.trim().to_ascii_lowercase())
        .filter(|name| !name.is_empty())
        .collect();

    for name in HOP_BY_HOP {
        headers.remove(name);
    }
    for name in connection_named {
        headers.remove(name.as_str());
    }
}
