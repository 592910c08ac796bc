//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create the axum Router with the health and proxy handlers
//! - Wire up middleware (tracing, request ID, CORS, compression, limits)
//! - Gate proxied traffic behind the rate limiter and body sanitizer
//! - Dispatch requests: route table match, conditional auth, forward
//! - Convert every pipeline failure to the standard error envelope

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, Request},
    middleware,
    response::Response,
    routing::{any, get},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::schema::GatewayConfig;
use crate::http::error::GatewayError;
use crate::http::forward::Forwarder;
use crate::http::request::MakeRequestUuid;
use crate::observability::{logging, metrics};
use crate::routing::router::{RouteBuildError, RouteTable};
use crate::security::auth::{AuthGate, StaticTokenGate};
use crate::security::headers;
use crate::security::rate_limit::{rate_limit_middleware, RateLimiter};
use crate::security::sanitize::{
    sanitize_middleware, BodySanitizer, SanitizerState, ScriptStripSanitizer,
};

/// Identity header added to upstream requests after a successful auth check.
pub const X_AUTHENTICATED_SUBJECT: &str = "x-authenticated-subject";

/// Application state injected into the dispatch handler.
#[derive(Clone)]
pub struct AppState {
    pub table: Arc<RouteTable>,
    pub auth: Arc<dyn AuthGate>,
    pub forwarder: Arc<Forwarder>,
    pub expose_error_detail: bool,
}

/// HTTP server for the gateway.
pub struct GatewayServer {
    router: Router,
    config: GatewayConfig,
}

impl GatewayServer {
    /// Create a server with the default collaborators: bearer-token auth
    /// and script-stripping sanitization.
    pub fn new(config: GatewayConfig) -> Result<Self, RouteBuildError> {
        let auth = Arc::new(StaticTokenGate::from_config(&config.auth));
        Self::with_gates(config, auth, Arc::new(ScriptStripSanitizer))
    }

    /// Create a server with explicit gate implementations.
    ///
    /// Tests substitute collaborators here; production wiring goes through
    /// [`GatewayServer::new`].
    pub fn with_gates(
        config: GatewayConfig,
        auth: Arc<dyn AuthGate>,
        sanitizer: Arc<dyn BodySanitizer>,
    ) -> Result<Self, RouteBuildError> {
        let table = Arc::new(RouteTable::from_config(&config.routes)?);
        let forwarder = Arc::new(Forwarder::new(&config.timeouts));

        let state = AppState {
            table,
            auth,
            forwarder,
            expose_error_detail: config.security.expose_error_detail,
        };

        let router = Self::build_router(&config, state, sanitizer);
        Ok(Self { router, config })
    }

    /// Build the axum router with all middleware layers.
    fn build_router(
        config: &GatewayConfig,
        state: AppState,
        sanitizer: Arc<dyn BodySanitizer>,
    ) -> Router {
        let limiter = Arc::new(RateLimiter::new(&config.rate_limit));
        let sanitizer_state = SanitizerState {
            sanitizer,
            enabled: config.sanitizer.enabled,
            max_body_size: config.security.max_body_size,
        };

        // The rate gate and sanitizer cover the whole proxy surface,
        // matched or not. /health is merged outside them: liveness probes
        // must keep answering no matter what the gates or backends do.
        let proxied = Router::new()
            .route("/", any(dispatch_handler))
            .route("/{*path}", any(dispatch_handler))
            .with_state(state)
            .layer(middleware::from_fn_with_state(
                sanitizer_state,
                sanitize_middleware,
            ))
            .layer(middleware::from_fn_with_state(
                limiter,
                rate_limit_middleware,
            ));

        let mut router = Router::new()
            .route("/health", get(health_handler))
            .merge(proxied)
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(CompressionLayer::new());

        if config.security.enable_headers {
            router = router
                .layer(headers::nosniff_layer())
                .layer(headers::frame_options_layer())
                .layer(headers::referrer_policy_layer());
        }

        router
            .layer(CorsLayer::permissive())
            .layer(middleware::from_fn(logging::access_log))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server until shutdown is signalled.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Gateway listening");

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = shutdown.recv() => {}
                }
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("Gateway stopped");
        Ok(())
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Liveness probe. Answers locally so infrastructure checks keep passing
/// during total backend outage.
async fn health_handler() -> &'static str {
    "Ok"
}

/// Main dispatch handler. Converts every pipeline failure into the error
/// envelope; nothing escapes unconverted.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let started = Instant::now();
    let method = request.method().to_string();

    let (route_label, result) = dispatch(&state, request).await;
    match result {
        Ok(response) => {
            metrics::record_request(&method, response.status().as_u16(), &route_label, started);
            response
        }
        Err(err) => {
            let status = err.status_code();
            metrics::record_request(&method, status.as_u16(), &route_label, started);
            err.into_envelope(state.expose_error_detail)
        }
    }
}

/// Pipeline stages for a single request, in strict order: route match,
/// conditional auth, forward. Returns the matched prefix for metrics.
async fn dispatch(
    state: &AppState,
    mut request: Request<Body>,
) -> (String, Result<Response, GatewayError>) {
    let path = request.uri().path().to_string();

    let Some(route) = state.table.matches(&path) else {
        tracing::debug!(path = %path, "No route matched");
        return ("none".to_string(), Err(GatewayError::RouteNotFound));
    };

    if route.requires_auth {
        let (mut parts, body) = request.into_parts();
        match state.auth.authorize(&parts).await {
            Ok(ctx) => {
                if let Ok(value) = HeaderValue::from_str(&ctx.subject) {
                    parts.headers.insert(X_AUTHENTICATED_SUBJECT, value);
                }
                parts.extensions.insert(ctx);
                request = Request::from_parts(parts, body);
            }
            Err(denied) => {
                tracing::debug!(
                    path = %path,
                    status = %denied.status,
                    "Auth gate denied request"
                );
                return (route.prefix.clone(), Err(GatewayError::AuthDenied(denied)));
            }
        }
    }

    let result = state.forwarder.forward(route, request).await;
    (route.prefix.clone(), result)
}
