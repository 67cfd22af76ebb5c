//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain in-flight requests → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Configuration reload is driven by the file watcher, not by signals
//! - Every long-running task subscribes to one shutdown broadcast

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
