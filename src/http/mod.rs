//! HTTP surface subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → server.rs (axum setup, middleware, health endpoint)
//!     → [rate gate, sanitizer] (global, before routing)
//!     → dispatch (route table match, conditional auth)
//!     → forward.rs (path rewrite, upstream call, streaming relay)
//!     → error.rs (gateway error envelope on any failure)
//! ```

pub mod error;
pub mod forward;
pub mod request;
pub mod server;

pub use error::GatewayError;
pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use server::{AppState, GatewayServer, X_AUTHENTICATED_SUBJECT};
