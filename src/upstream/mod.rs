//! Upstream (origin) subsystem.
//!
//! # Data Flow
//! ```text
//! Worker (cache miss)
//!     → relay.rs connect (bounded connect timeout)
//!     → relay.rs send_request (HTTP/1.0 line + rewritten headers)
//!     → relay.rs relay_response (stream to client, buffer if cacheable)
//!     → RelayOutcome back to the worker for the cache decision
//! ```

pub mod relay;

pub use relay::RelayOutcome;
