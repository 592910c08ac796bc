//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → rate_limit.rs (admit/reject per client IP, before routing)
//!     → sanitize.rs (buffer, transform, restore request body)
//!     → headers.rs (hardening response headers)
//!     → auth.rs (credential gate, only for routes that require it)
//! ```
//!
//! # Design Decisions
//! - Fail closed: reject on any security check failure
//! - Gates sit behind trait seams; the gateway consumes pass/fail decisions
//! - No trust in client input

pub mod auth;
pub mod headers;
pub mod rate_limit;
pub mod sanitize;

pub use auth::{AuthContext, AuthDenied, AuthGate, StaticTokenGate};
pub use rate_limit::RateLimiter;
pub use sanitize::{BodySanitizer, ScriptStripSanitizer};
