//! Structured logging.

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins when set; the configured level is the fallback.
pub fn init(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("edge_gateway={log_level},tower_http={log_level}").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Access log: records every completed request.
///
/// Failures (status above 299) log at error severity so they stand out in
/// aggregation.
pub async fn access_log(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    if status > 299 {
        tracing::error!(method = %method, url = %uri, status, "request");
    } else {
        tracing::info!(method = %method, url = %uri, status, "request");
    }
    response
}
