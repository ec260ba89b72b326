//! Command Handlers
//!
//! The operations behind each `entryctl` subcommand, kept free of I/O so the
//! binary only parses arguments and prints results.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::cache::{CacheEntry, Clock, Ttl};
use crate::error::Result;

/// Report printed by `entryctl inspect`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InspectReport {
    /// The decoded value
    pub value: Value,
    /// Canonical expiration, `None` = never expires
    pub expiration: Option<String>,
    /// Whether the entry is expired at inspection time
    pub expired: bool,
    /// Milliseconds until expiration, negative once expired
    pub remaining_ms: Option<i64>,
}

/// Handler for `entryctl new`
///
/// Builds an entry from `raw_value` and returns its serialized form. A value
/// that is not valid JSON is stored as a JSON string.
pub fn build_entry(raw_value: &str, ttl: Ttl, clock: &impl Clock) -> Result<String> {
    let value = serde_json::from_str(raw_value).unwrap_or_else(|_| {
        debug!("Value is not JSON, storing it as a string");
        Value::String(raw_value.to_string())
    });

    let entry = CacheEntry::new_with(value, ttl, clock)?;
    info!("Built entry expiring {}", entry.expiration());
    entry.serialize()
}

/// Handler for `entryctl inspect`
pub fn inspect_entry(text: &str, clock: &impl Clock) -> Result<InspectReport> {
    let entry: CacheEntry<Value> = CacheEntry::parse(text.trim())?;

    let report = InspectReport {
        expiration: entry.expiration().to_iso_string(),
        expired: entry.is_expired_with(clock),
        remaining_ms: entry
            .remaining_ttl_with(clock)
            .map(|remaining| remaining.num_milliseconds()),
        value: entry.into_value(),
    };
    info!(
        "Inspected entry: expired={}, remaining_ms={:?}",
        report.expired, report.remaining_ms
    );
    Ok(report)
}
