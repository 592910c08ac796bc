//! Rate limiting middleware.
//!
//! Runs as global middleware ahead of routing, so requests to nonexistent
//! endpoints pay the cost too.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;

use crate::config::schema::RateLimitConfig;
use crate::http::error::GatewayError;
use crate::observability::metrics;

/// A simple token bucket.
struct TokenBucket {
    tokens: f64,
    last_update: Instant,
}

impl TokenBucket {
    fn new(capacity: f64) -> Self {
        Self {
            tokens: capacity,
            last_update: Instant::now(),
        }
    }

    fn try_acquire(&mut self, capacity: f64, refill_rate: f64) -> bool {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update).as_secs_f64();

        self.tokens = (self.tokens + elapsed * refill_rate).min(capacity);
        self.last_update = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

/// Per-client-IP admission control.
pub struct RateLimiter {
    buckets: DashMap<IpAddr, TokenBucket>,
    refill_rate: f64,
    burst: f64,
    enabled: bool,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            buckets: DashMap::new(),
            refill_rate: config.requests_per_second as f64,
            burst: config.burst_size as f64,
            enabled: config.enabled,
        }
    }

    /// Admit or reject a single request from `client`.
    pub fn check(&self, client: IpAddr) -> bool {
        if !self.enabled {
            return true;
        }
        let mut bucket = self
            .buckets
            .entry(client)
            .or_insert_with(|| TokenBucket::new(self.burst));
        bucket.try_acquire(self.burst, self.refill_rate)
    }
}

/// Middleware applying the rate gate to every request it wraps.
pub async fn rate_limit_middleware(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(limiter): State<Arc<RateLimiter>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if limiter.check(addr.ip()) {
        next.run(request).await
    } else {
        tracing::warn!(client = %addr.ip(), "Rate limit exceeded");
        metrics::record_rate_limited();
        GatewayError::RateLimited.into_response()
    }
}
