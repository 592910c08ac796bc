//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events, per-request access log)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging via tracing; level configurable via config and env
//! - Every completed request is logged; failures at error severity
//! - Metrics are cheap (atomic increments) and optional

pub mod logging;
pub mod metrics;
