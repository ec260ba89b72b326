//! Cache Module
//!
//! Provides the cache entry value object with TTL normalization and its
//! JSON wire format.

mod clock;
mod entry;
mod expiration;
pub mod iso;
pub mod ttl;


// Re-export public types
pub use clock::{Clock, FixedClock, SystemClock};
pub use entry::CacheEntry;
pub use expiration::Expiration;
pub use ttl::{normalize, normalize_with, Ttl};
