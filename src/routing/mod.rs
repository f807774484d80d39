//! Command routing subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound chat line
//!     → chat::parser (tokenize into segments)
//!     → root Router (segments[0] = command prefix)
//!     → middleware chain (in registration order, each must call next)
//!     → nested Router for segments[1]   ─┐ repeat per segment
//!     → terminal handler(remaining args) ◀┘
//!
//! Router Compilation (at startup):
//!     register(key, [middleware.., handler])
//!     → register_next_router(key, child)
//!     → freeze behind Arc
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at dispatch time
//! - Exact segment lookup, no regex, no prefix trees
//! - Unknown segments are ignored silently
//! - Setup mistakes (binding an unknown key, continuing from a terminal
//!   handler) are hard errors

pub mod handler;
pub mod router;

pub use handler::{handler, BoxFuture, BoxedHandler, Handler, HandlerResult, Next};
pub use router::{Route, Router};

/// Errors raised by the router or by the handlers it runs.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    /// `register_next_router` was called for a key that was never registered.
    #[error("router not found: {0}")]
    RouteNotFound(String),

    /// `register` was called without any function.
    #[error("route {0} registered without a handler")]
    MissingHandler(String),

    /// A terminal handler tried to continue the chain.
    #[error("can't invoke next in the final segment")]
    NoContinuation,

    /// A middleware or handler failed.
    #[error("handler failed: {0}")]
    Handler(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl RouteError {
    /// Wrap an arbitrary handler failure.
    pub fn handler(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        RouteError::Handler(err.into())
    }
}
