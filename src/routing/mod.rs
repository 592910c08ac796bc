//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path)
//!     → router.rs (first-match lookup over the route table)
//!     → matcher.rs (prefix test, path rewrite)
//!     → Return: matched Route or NoMatch
//!
//! Table Construction (at startup):
//!     RouteConfig[]
//!     → Parse targets into scheme/authority/base path
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Table built at startup, immutable at runtime, shared without locking
//! - No regex in hot path (prefix matching only)
//! - Declaration order IS the priority: first match wins, so configuration
//!   order must be preserved exactly

pub mod matcher;
pub mod router;

pub use router::{Route, RouteTable};
