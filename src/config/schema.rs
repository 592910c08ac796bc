//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Route definitions mapping path prefixes to backends.
    ///
    /// Declaration order is match priority: the first prefix that matches
    /// wins, so more specific routes must be listed before broader ones.
    pub routes: Vec<RouteConfig>,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Rate limiting configuration.
    pub rate_limit: RateLimitConfig,

    /// Authentication gate configuration.
    pub auth: AuthConfig,

    /// Request body sanitizer configuration.
    pub sanitizer: SanitizerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Security hardening settings.
    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:5000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5000".to_string(),
        }
    }
}

/// Route configuration mapping a path prefix to a backend target.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Path prefix to match (anchored, case-sensitive).
    pub prefix: String,

    /// Backend base URL (scheme + host + port + optional path).
    /// The matched prefix is stripped and the remainder is joined onto
    /// the target's path.
    pub target: String,

    /// Whether requests to this route must pass the auth gate first.
    #[serde(default)]
    pub requires_auth: bool,
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout for upstream calls, in seconds.
    pub connect_secs: u64,

    /// Total upstream call timeout in seconds. Elapsing surfaces as 504.
    pub upstream_secs: u64,

    /// Whole-request timeout at the listener in seconds. Must exceed the
    /// upstream timeout so gateway error mapping runs first.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            upstream_secs: 30,
            request_secs: 60,
        }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting.
    pub enabled: bool,

    /// Sustained requests per second per client IP.
    pub requests_per_second: u32,

    /// Burst capacity per client IP.
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            requests_per_second: 100,
            burst_size: 200,
        }
    }
}

/// Authentication gate configuration.
///
/// The default gate compares `Authorization: Bearer <key>` against this key
/// set. An empty set means every protected route denies (fail closed).
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AuthConfig {
    /// Accepted API keys.
    pub keys: Vec<AuthKeyConfig>,
}

/// A single accepted credential.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthKeyConfig {
    /// The bearer token value.
    pub key: String,

    /// Identity attached to requests authenticated with this key.
    pub subject: String,
}

/// Request body sanitizer configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SanitizerConfig {
    /// Enable body sanitization.
    pub enabled: bool,
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Enable security response headers.
    pub enable_headers: bool,

    /// Maximum request body size in bytes.
    pub max_body_size: usize,

    /// Include internal error detail in error envelopes.
    /// Leave off in production; detail is redacted to a generic message.
    pub expose_error_detail: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enable_headers: true,
            max_body_size: 2 * 1024 * 1024, // 2MB
            expose_error_detail: false,
        }
    }
}
