//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept loop, connection limits)
//!     → connection.rs (per-connection id for tracing)
//!     → Hand off to the HTTP worker
//! ```
//!
//! # Design Decisions
//! - Bounded accept queue prevents resource exhaustion
//! - The permit returned by accept travels into the worker task, so a
//!   panicking worker still frees its slot

pub mod connection;
pub mod listener;

pub use connection::ConnectionId;
pub use listener::{ConnectionPermit, Listener, ListenerError};
