//! Cache Entry - TTL-aware cache entries with a JSON round-trip
//!
//! Provides the value object a cache stores: a payload, an expiration derived
//! from several TTL forms, expiry checks, and serialize/parse.

pub mod cache;
pub mod commands;
pub mod config;
pub mod error;

pub use cache::{CacheEntry, Clock, Expiration, FixedClock, SystemClock, Ttl};
pub use config::Config;
pub use error::{EntryError, Result};
