//! TTL Normalizer Module
//!
//! Turns the accepted TTL forms into an absolute [`Expiration`].
//!
//! Numbers and numeric strings are always offsets in milliseconds from now;
//! an absolute instant is given as a date value or a non-numeric date string.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::debug;

use crate::cache::clock::{Clock, SystemClock};
use crate::cache::expiration::Expiration;
use crate::cache::iso;
use crate::error::{EntryError, Result};

// == TTL Input ==
/// Raw time-to-live as supplied by a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ttl {
    /// The entry never expires
    None,
    /// Offset in milliseconds from the current instant (may be negative)
    Milliseconds(i64),
    /// Absolute expiration instant
    Absolute(DateTime<Utc>),
    /// Unparsed text: a numeric offset or a date string
    Raw(String),
}

impl Ttl {
    /// Builds an absolute TTL from milliseconds since the Unix epoch.
    pub fn from_epoch_millis(millis: i64) -> Result<Self> {
        DateTime::from_timestamp_millis(millis)
            .map(Ttl::Absolute)
            .ok_or_else(|| EntryError::InvalidTtl(format!("epoch millis {} out of range", millis)))
    }
}

impl From<i32> for Ttl {
    fn from(millis: i32) -> Self {
        Ttl::Milliseconds(i64::from(millis))
    }
}

impl From<i64> for Ttl {
    fn from(millis: i64) -> Self {
        Ttl::Milliseconds(millis)
    }
}

impl From<Duration> for Ttl {
    fn from(offset: Duration) -> Self {
        Ttl::Milliseconds(i64::try_from(offset.as_millis()).unwrap_or(i64::MAX))
    }
}

impl From<DateTime<Utc>> for Ttl {
    fn from(instant: DateTime<Utc>) -> Self {
        Ttl::Absolute(instant)
    }
}

impl From<String> for Ttl {
    fn from(text: String) -> Self {
        Ttl::Raw(text)
    }
}

impl From<&str> for Ttl {
    fn from(text: &str) -> Self {
        Ttl::Raw(text.to_string())
    }
}

impl<T: Into<Ttl>> From<Option<T>> for Ttl {
    fn from(ttl: Option<T>) -> Self {
        ttl.map_or(Ttl::None, Into::into)
    }
}

impl TryFrom<f64> for Ttl {
    type Error = EntryError;

    /// Truncates toward zero; NaN and infinities are rejected.
    fn try_from(millis: f64) -> Result<Self> {
        if !millis.is_finite() {
            return Err(EntryError::InvalidTtl(format!(
                "offset must be a finite number, given {}",
                millis
            )));
        }
        Ok(Ttl::Milliseconds(truncate_offset(millis)))
    }
}

impl TryFrom<&Value> for Ttl {
    type Error = EntryError;

    fn try_from(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Ttl::None),
            Value::Number(number) => match number.as_i64() {
                Some(millis) => Ok(Ttl::Milliseconds(millis)),
                None => number
                    .as_f64()
                    .ok_or_else(|| EntryError::InvalidTtl(format!("unsupported number {}", number)))
                    .and_then(Ttl::try_from),
            },
            Value::String(text) => Ok(Ttl::Raw(text.clone())),
            Value::Bool(_) => Err(EntryError::InvalidTtl("boolean is not a TTL".to_string())),
            Value::Array(_) => Err(EntryError::InvalidTtl("array is not a TTL".to_string())),
            Value::Object(_) => Err(EntryError::InvalidTtl("object is not a TTL".to_string())),
        }
    }
}

// == Normalize ==
/// Normalizes a TTL against the system clock.
pub fn normalize(ttl: impl Into<Ttl>) -> Result<Expiration> {
    normalize_with(ttl, &SystemClock)
}

/// Normalizes a TTL against the given clock.
///
/// Resulting instants are truncated to whole milliseconds.
pub fn normalize_with(ttl: impl Into<Ttl>, clock: &impl Clock) -> Result<Expiration> {
    let instant = match ttl.into() {
        Ttl::None => return Ok(Expiration::Never),
        Ttl::Milliseconds(offset) => offset_from_now(clock, offset)?,
        Ttl::Absolute(instant) => truncate_to_millis(instant)?,
        Ttl::Raw(text) => match parse_numeric(&text) {
            Some(offset) => offset_from_now(clock, truncate_offset(offset))?,
            None => iso::parse_loose(&text)
                .ok_or_else(|| {
                    debug!("Rejected TTL string {:?}", text);
                    EntryError::InvalidTtl(format!("{:?} is neither numeric nor a date", text))
                })
                .and_then(truncate_to_millis)?,
        },
    };

    Ok(Expiration::At(instant))
}

/// Returns the instant `offset` milliseconds away from the clock's now.
fn offset_from_now(clock: &impl Clock, offset: i64) -> Result<DateTime<Utc>> {
    let now = clock.now().timestamp_millis();
    now.checked_add(offset)
        .and_then(DateTime::from_timestamp_millis)
        .ok_or_else(|| {
            debug!("TTL offset {}ms overflows from {}", offset, now);
            EntryError::InvalidTtl(format!("offset of {}ms is out of range", offset))
        })
}

/// Rounds a finite offset toward zero.
///
/// The cast saturates; offsets that large fail later in `offset_from_now`.
fn truncate_offset(millis: f64) -> i64 {
    millis.trunc() as i64
}

fn truncate_to_millis(instant: DateTime<Utc>) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(instant.timestamp_millis())
        .ok_or_else(|| EntryError::InvalidTtl(format!("instant {} out of range", instant)))
}

/// Reads `text` as a finite number, if it is one.
///
/// Surrounding whitespace is ignored. Decimal notation with sign, fraction
/// and exponent is accepted, as are `0x`, `0o` and `0b` integer literals.
fn parse_numeric(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let radix = match text.get(..2) {
        Some("0x" | "0X") => 16,
        Some("0o" | "0O") => 8,
        Some("0b" | "0B") => 2,
        _ => return text.parse::<f64>().ok().filter(|n| n.is_finite()),
    };

    let digits = &text[2..];
    if digits.is_empty() {
        return None;
    }
    digits
        .chars()
        .try_fold(0.0_f64, |acc, c| {
            c.to_digit(radix)
                .map(|digit| acc * f64::from(radix) + f64::from(digit))
        })
        .filter(|n| n.is_finite())
}
