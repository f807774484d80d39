//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Chat connection lost:
//!     → backoff.rs (exponential delay with jitter)
//!     → chat::client reconnects and re-joins channels
//! ```

pub mod backoff;
