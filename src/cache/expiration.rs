//! Expiration Module
//!
//! The absolute expiration of an entry and its wire encoding.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::de::{self, Deserializer, Unexpected, Visitor};
use serde::{Deserialize, Serialize, Serializer};

use crate::cache::iso;
use crate::error::{EntryError, Result};

// == Expiration ==
/// When an entry stops being valid.
///
/// Serialized as `null` or as a canonical ISO-8601 string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Expiration {
    /// The entry never expires
    #[default]
    Never,
    /// The entry expires once this instant is in the past
    At(DateTime<Utc>),
}

impl Expiration {
    /// Returns true if the entry never expires.
    pub fn is_never(&self) -> bool {
        matches!(self, Expiration::Never)
    }

    /// Returns the expiration instant, if any.
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        match self {
            Expiration::Never => None,
            Expiration::At(instant) => Some(*instant),
        }
    }

    // == Is Expired ==
    /// Checks expiry against `now`.
    ///
    /// Boundary condition: an expiration equal to `now` is still valid; only
    /// an instant strictly before `now` counts as expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self {
            Expiration::Never => false,
            Expiration::At(instant) => *instant < now,
        }
    }

    /// Time left until expiration, negative once it has passed.
    pub fn remaining_at(&self, now: DateTime<Utc>) -> Option<TimeDelta> {
        self.instant().map(|instant| instant - now)
    }

    /// Canonical ISO-8601 rendering, or `None` for [`Expiration::Never`].
    pub fn to_iso_string(&self) -> Option<String> {
        self.instant().map(|instant| iso::format_iso(&instant))
    }

    /// Parses a canonical ISO-8601 expiration string.
    ///
    /// Only strings that reformat to themselves are accepted.
    pub fn parse_canonical(text: &str) -> Result<Self> {
        iso::parse_canonical(text)
            .map(Expiration::At)
            .ok_or_else(|| {
                EntryError::InvalidEntryFormat(format!(
                    "expiration {:?} is not a canonical ISO-8601 date-time",
                    text
                ))
            })
    }
}

impl fmt::Display for Expiration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_iso_string() {
            Some(text) => f.write_str(&text),
            None => f.write_str("never"),
        }
    }
}

impl Serialize for Expiration {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.to_iso_string() {
            Some(text) => serializer.serialize_str(&text),
            None => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for Expiration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_option(ExpirationVisitor)
    }
}

struct ExpirationVisitor;

impl<'de> Visitor<'de> for ExpirationVisitor {
    type Value = Expiration;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a canonical ISO-8601 date-time string or null")
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
        Ok(Expiration::Never)
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
        Ok(Expiration::Never)
    }

    fn visit_some<D: Deserializer<'de>>(
        self,
        deserializer: D,
    ) -> std::result::Result<Self::Value, D::Error> {
        deserializer.deserialize_str(ExpirationVisitor)
    }

    fn visit_str<E: de::Error>(self, text: &str) -> std::result::Result<Self::Value, E> {
        Expiration::parse_canonical(text)
            .map_err(|_| E::invalid_value(Unexpected::Str(text), &self))
    }
}
