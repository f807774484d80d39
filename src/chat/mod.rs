//! Chat transport subsystem.
//!
//! # Data Flow
//! ```text
//! WebSocket frame (IRC lines)
//!     → irc.rs (parse tags, prefix, command, params)
//!     → client.rs (PING/PONG, RECONNECT, PRIVMSG → ChatMessage)
//!     → commands::dispatcher (tokenize with parser.rs, route)
//!
//! Replies:
//!     ChatHandle::say → outgoing channel → client.rs writer → WebSocket
//! ```
//!
//! # Design Decisions
//! - Only the IRC subset the bot needs is implemented
//! - The writer is fed through an unbounded channel so `say` never blocks
//! - Reconnects use jittered exponential backoff and re-join known channels

pub mod client;
pub mod irc;
pub mod parser;
pub mod tags;

pub use client::{ChatClient, ChatControl, ChatError, ChatHandle, ChatMessage};
pub use parser::parse_message;
pub use tags::{ChatTags, Privileges};
