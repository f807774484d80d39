//! Outbound reply subsystem.
//!
//! # Data Flow
//! ```text
//! Command handler
//!     → responder.rs (format reply, bind room + user)
//!     → queue.rs (run now if capacity remains, else defer)
//!     → ReplySink::say(room, text) (chat client writer)
//!
//! Every reset interval:
//!     queue.rs refills capacity → drains deferred replies in FIFO order
//! ```

pub mod queue;
pub mod responder;

pub use queue::OutboundQueue;
pub use responder::{ReplySink, Responder};
