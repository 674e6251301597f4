//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! ProxyConfig::default()
//!     → CLI applies the listening port (the only external input)
//!     → shared via Arc to the accept loop and every worker
//! ```
//!
//! # Design Decisions
//! - Config is immutable once constructed; there is no file or reload path
//! - All fields have defaults so tests can tweak a single section
//! - Cache limits default to the documented 1,049,000 / 102,400 bytes

pub mod schema;

pub use schema::CacheConfig;
pub use schema::ListenerConfig;
pub use schema::ProxyConfig;
pub use schema::TimeoutConfig;
