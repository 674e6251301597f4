//! Cache subsystem.
//!
//! # Data Flow
//! ```text
//! Worker (cache miss, body fully relayed)
//!     → SharedCache::store (one exclusive critical section:
//!       replace duplicate → evict tail until it fits → insert at head)
//!
//! Worker (request received)
//!     → SharedCache::lookup (find + promote in one critical section)
//!     → Arc<CacheEntry> written to the client outside the lock
//! ```
//!
//! # Design Decisions
//! - The store owns every body; hits borrow via `Arc` clone
//! - Recency order lives in an index-based linked list (no raw pointers)
//! - One `Mutex` guards all mutation; sections are short and never await

pub mod entry;
mod list;
pub mod store;


pub use entry::CacheEntry;
pub use store::{CacheStore, SharedCache};
