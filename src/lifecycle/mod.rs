//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     Load config → Validate → Build route table → Bind listener → Serve
//!
//! Shutdown:
//!     SIGINT or trigger() → Stop accepting → Drain in-flight → Exit
//! ```

pub mod shutdown;

pub use shutdown::Shutdown;
