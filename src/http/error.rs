//! Gateway error taxonomy and the client-facing error envelope.
//!
//! Every failure the gateway itself produces is converted to an HTTP
//! response with a fixed-shape JSON body; proxied responses pass through
//! untouched. Nothing in this taxonomy terminates the process.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::security::auth::AuthDenied;

/// Errors produced by the gateway pipeline.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// No configured prefix matches the request path.
    #[error("Route not found.")]
    RouteNotFound,

    /// The auth gate rejected the request.
    #[error("{}", .0.message)]
    AuthDenied(AuthDenied),

    /// The rate gate rejected the request.
    #[error("Too many requests.")]
    RateLimited,

    /// The request body exceeded the configured limit.
    #[error("Request body too large.")]
    PayloadTooLarge,

    /// The upstream call failed before a response arrived.
    #[error("upstream request failed: {0}")]
    UpstreamUnavailable(#[from] hyper_util::client::legacy::Error),

    /// The upstream call exceeded its deadline.
    #[error("upstream request timed out")]
    UpstreamTimeout,

    /// Anything else that escapes the pipeline.
    #[error("{0}")]
    Internal(String),
}

/// Fixed-shape body for gateway-generated errors.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: u16,
    pub status: &'static str,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::RouteNotFound => StatusCode::NOT_FOUND,
            GatewayError::AuthDenied(denied) => denied.status,
            GatewayError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            GatewayError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
            GatewayError::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message. Internal detail only leaves the process when
    /// `expose_detail` is set.
    fn message(&self, expose_detail: bool) -> String {
        match self {
            GatewayError::UpstreamUnavailable(e) if expose_detail => {
                format!("Upstream request failed: {e}")
            }
            GatewayError::UpstreamUnavailable(_) => "Bad gateway.".to_string(),
            GatewayError::UpstreamTimeout => "Upstream timed out.".to_string(),
            GatewayError::Internal(detail) if expose_detail => detail.clone(),
            GatewayError::Internal(_) => "Internal server error.".to_string(),
            other => other.to_string(),
        }
    }

    /// Render the error envelope.
    pub fn into_envelope(self, expose_detail: bool) -> Response {
        let status = self.status_code();
        let body = ErrorBody {
            code: status.as_u16(),
            status: "Error",
            message: self.message(expose_detail),
            data: None,
        };
        (status, Json(body)).into_response()
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        self.into_envelope(false)
    }
}
