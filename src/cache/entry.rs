//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support, and
//! their transportable string form:
//!
//! ```text
//! {"exp":null | "<ISO-8601>","val":<json>}
//! ```

use chrono::{DateTime, TimeDelta, Utc};
use serde::de::DeserializeOwned;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::error::Category;
use serde_json::Value;
use tracing::debug;

use crate::cache::clock::{Clock, SystemClock};
use crate::cache::expiration::Expiration;
use crate::cache::ttl::{self, Ttl};
use crate::error::{EntryError, Result};

// == Cache Entry ==
/// A value together with the instant it expires.
///
/// Immutable once built: the expiration is normalized at construction and
/// never changes afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<V> {
    value: V,
    expiration: Expiration,
}

/// Borrowed wire layout used when encoding.
#[derive(Serialize)]
struct WireRef<'a, V> {
    exp: &'a Expiration,
    val: &'a V,
}

/// Owned wire layout used when decoding.
#[derive(Deserialize)]
struct Wire<V> {
    exp: Expiration,
    val: V,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry, normalizing `ttl` against the system clock.
    ///
    /// # Errors
    /// Returns [`EntryError::InvalidTtl`] if `ttl` cannot be turned into an
    /// expiration.
    pub fn new(value: V, ttl: impl Into<Ttl>) -> Result<Self> {
        Self::new_with(value, ttl, &SystemClock)
    }

    /// Creates a new cache entry, normalizing `ttl` against `clock`.
    pub fn new_with(value: V, ttl: impl Into<Ttl>, clock: &impl Clock) -> Result<Self> {
        let expiration = ttl::normalize_with(ttl, clock)?;
        Ok(Self { value, expiration })
    }

    /// Creates an entry from an already normalized expiration.
    pub fn with_expiration(value: V, expiration: Expiration) -> Self {
        Self { value, expiration }
    }

    // == Accessors ==
    /// The stored value.
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Consumes the entry, returning the stored value.
    pub fn into_value(self) -> V {
        self.value
    }

    /// The normalized expiration.
    pub fn expiration(&self) -> Expiration {
        self.expiration
    }

    /// The expiration instant, or `None` if the entry never expires.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expiration.instant()
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: an entry whose expiration equals the current
    /// instant is not yet expired.
    ///
    /// # Returns
    /// - `true` if the entry has an expiration strictly before now
    /// - `false` if the entry never expires or the expiration is now or later
    pub fn is_expired(&self) -> bool {
        self.is_expired_with(&SystemClock)
    }

    /// Same as [`CacheEntry::is_expired`], reading the time from `clock`.
    pub fn is_expired_with(&self, clock: &impl Clock) -> bool {
        self.expiration.is_expired_at(clock.now())
    }

    // == Time To Live ==
    /// Returns the time left before expiration, or `None` if it never expires.
    ///
    /// The duration turns negative once the entry has expired; pair with
    /// [`CacheEntry::is_expired`] when a non-negative value is required.
    pub fn remaining_ttl(&self) -> Option<TimeDelta> {
        self.remaining_ttl_with(&SystemClock)
    }

    /// Same as [`CacheEntry::remaining_ttl`], reading the time from `clock`.
    pub fn remaining_ttl_with(&self, clock: &impl Clock) -> Option<TimeDelta> {
        self.expiration.remaining_at(clock.now())
    }
}

impl<V: Serialize> CacheEntry<V> {
    // == Serialize ==
    /// Encodes the entry as `{"exp":...,"val":...}`.
    ///
    /// # Errors
    /// Returns [`EntryError::Serialization`] if the value cannot be encoded
    /// as JSON.
    pub fn serialize(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|err| {
            debug!("Failed to serialize cache entry: {}", err);
            EntryError::Serialization(err)
        })
    }
}

impl<V: DeserializeOwned> CacheEntry<V> {
    // == Parse ==
    /// Decodes an entry previously produced by [`CacheEntry::serialize`].
    ///
    /// # Errors
    /// - [`EntryError::Deserialization`] if `text` is not well-formed JSON
    /// - [`EntryError::InvalidEntryFormat`] if the JSON is not an entry: not an
    ///   object, `exp` neither null nor a canonical ISO-8601 string, or `val`
    ///   not decodable as `V`
    ///
    /// Unknown fields are ignored and a repeated key keeps its last value.
    pub fn parse(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|err| match err.classify() {
            Category::Data => {
                debug!("Rejected cache entry: {}", err);
                EntryError::InvalidEntryFormat(err.to_string())
            }
            Category::Syntax | Category::Eof | Category::Io => EntryError::Deserialization(err),
        })
    }
}

impl<V: Serialize> Serialize for CacheEntry<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        WireRef {
            exp: &self.expiration,
            val: &self.value,
        }
        .serialize(serializer)
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for CacheEntry<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        // Collapse repeated keys (last one wins) before checking the layout.
        let document = Value::deserialize(deserializer)?;
        let Wire { exp, val } = Wire::deserialize(document).map_err(D::Error::custom)?;
        Ok(Self::with_expiration(val, exp))
    }
}
