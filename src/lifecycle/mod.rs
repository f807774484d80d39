//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs → startup.rs):
//!     Load config → Validate → Logging/metrics → Spawn tasks → Bind HTTP
//!
//! Shutdown (shutdown.rs):
//!     Signal received → broadcast → every task leaves its select! loop
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Pending outbound replies are dropped on shutdown

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{run, StartupError};
