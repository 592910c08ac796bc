//! Request body sanitization.
//!
//! The transform itself is a collaborator concern behind [`BodySanitizer`];
//! this module owns the pipeline mechanics: buffer the body, transform it,
//! and put it back. Reinstalling matters as much as transforming. The
//! transport consumes the body stream once, so anything read here must be
//! restored or the backend receives an empty body.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body, Bytes},
    extract::State,
    http::{header, HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::http::error::GatewayError;

/// Request-body transform applied before routing.
pub trait BodySanitizer: Send + Sync {
    fn sanitize(&self, body: Bytes) -> Bytes;
}

/// Default sanitizer: removes `<script>` blocks from textual bodies.
/// Non-UTF-8 payloads pass through untouched.
#[derive(Debug, Default, Clone)]
pub struct ScriptStripSanitizer;

impl BodySanitizer for ScriptStripSanitizer {
    fn sanitize(&self, body: Bytes) -> Bytes {
        let Ok(text) = std::str::from_utf8(&body) else {
            return body;
        };
        // ASCII-only lowering keeps byte offsets aligned with the original.
        let lower = text.to_ascii_lowercase();
        if !lower.contains("<script") {
            return body;
        }

        let mut out = String::with_capacity(text.len());
        let mut pos = 0;
        while let Some(found) = lower[pos..].find("<script") {
            let start = pos + found;
            out.push_str(&text[pos..start]);
            match lower[start..].find("</script>") {
                Some(end) => pos = start + end + "</script>".len(),
                None => {
                    pos = text.len();
                }
            }
        }
        out.push_str(&text[pos..]);
        Bytes::from(out)
    }
}

/// State for the sanitizer middleware.
#[derive(Clone)]
pub struct SanitizerState {
    pub sanitizer: Arc<dyn BodySanitizer>,
    pub enabled: bool,
    pub max_body_size: usize,
}

/// Buffers, transforms, and reinstalls the request body.
pub async fn sanitize_middleware(
    State(state): State<SanitizerState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !state.enabled {
        return next.run(request).await;
    }

    let (mut parts, body) = request.into_parts();
    let bytes = match to_bytes(body, state.max_body_size).await {
        Ok(bytes) => bytes,
        Err(_) => return GatewayError::PayloadTooLarge.into_response(),
    };

    let cleaned = if bytes.is_empty() {
        bytes
    } else {
        state.sanitizer.sanitize(bytes)
    };

    // The body is now a known-length buffer; fix framing headers so the
    // forwarder sends a length that matches what it streams.
    parts.headers.remove(header::TRANSFER_ENCODING);
    if cleaned.is_empty() {
        parts.headers.remove(header::CONTENT_LENGTH);
    } else {
        parts
            .headers
            .insert(header::CONTENT_LENGTH, HeaderValue::from(cleaned.len()));
    }

    next.run(Request::from_parts(parts, Body::from(cleaned))).await
}
