//! Integration Tests for Cache Entries
//!
//! Exercises the public API end to end: construct, check expiry, serialize,
//! and parse back.

use cache_entry::cache::{normalize_with, CacheEntry, Expiration, FixedClock, Ttl};
use cache_entry::commands::{build_entry, inspect_entry};
use cache_entry::EntryError;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

// == Helper Functions ==

fn clock_at(millis: i64) -> FixedClock {
    FixedClock::from_millis(millis).unwrap()
}

fn instant(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Session {
    user: String,
    roles: Vec<String>,
    last_seen: Option<u64>,
}

// == Normalization Scenarios ==

#[test]
fn test_normalize_offset_with_fixed_clock() {
    let expiration = normalize_with(1000, &clock_at(100_000)).unwrap();
    assert_eq!(expiration, Expiration::At(instant(101_000)));
}

#[test]
fn test_normalize_numeric_string_with_fixed_clock() {
    let expiration = normalize_with("1000", &clock_at(100_000)).unwrap();
    assert_eq!(expiration, Expiration::At(instant(101_000)));
}

#[test]
fn test_normalize_none() {
    assert_eq!(normalize_with(Ttl::None, &clock_at(100_000)).unwrap(), Expiration::Never);
}

#[test]
fn test_normalize_rejections() {
    let clock = clock_at(100_000);

    assert!(matches!(
        Ttl::try_from(f64::NAN),
        Err(EntryError::InvalidTtl(_))
    ));
    assert!(matches!(
        Ttl::from_epoch_millis(i64::MIN),
        Err(EntryError::InvalidTtl(_))
    ));
    assert!(matches!(
        normalize_with("not a valid date string", &clock),
        Err(EntryError::InvalidTtl(_))
    ));
    for value in [json!(true), json!({}), json!([]), json!("/^$/")] {
        let result = Ttl::try_from(&value).and_then(|ttl| normalize_with(ttl, &clock));
        assert!(
            matches!(result, Err(EntryError::InvalidTtl(_))),
            "expected {} to be rejected",
            value
        );
    }
}

// == Parse Scenarios ==

#[test]
fn test_parse_null_expiration() {
    let entry: CacheEntry<String> = CacheEntry::parse(r#"{"val":"x","exp":null}"#).unwrap();

    assert_eq!(entry.value(), "x");
    assert_eq!(entry.expiration(), Expiration::Never);
    assert!(!entry.is_expired());
    assert!(entry.remaining_ttl().is_none());
}

#[test]
fn test_parse_not_a_date() {
    let result = CacheEntry::<String>::parse(r#"{"val":"x","exp":"not-a-date"}"#);
    assert!(matches!(result, Err(EntryError::InvalidEntryFormat(_))));
}

#[test]
fn test_parse_utc_string_is_not_canonical() {
    let text = json!({ "val": "x", "exp": "Mon, 15 Jan 2024 14:30:00 GMT" }).to_string();
    let result = CacheEntry::<String>::parse(&text);
    assert!(matches!(result, Err(EntryError::InvalidEntryFormat(_))));
}

#[test]
fn test_parse_malformed() {
    let result = CacheEntry::<String>::parse("{\"val\":");
    assert!(matches!(result, Err(EntryError::Deserialization(_))));
}

// == Serialize Scenarios ==

#[test]
fn test_serialize_no_expiration() {
    let entry = CacheEntry::new("x", Ttl::None).unwrap();
    let text = entry.serialize().unwrap();

    assert_eq!(text, r#"{"exp":null,"val":"x"}"#);
    let decoded: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(decoded, json!({ "val": "x", "exp": null }));
}

#[test]
fn test_serialize_date_expiration() {
    let expires = instant(1_705_329_000_000);
    let entry = CacheEntry::new("value", expires).unwrap();

    assert_eq!(
        entry.serialize().unwrap(),
        r#"{"exp":"2024-01-15T14:30:00.000Z","val":"value"}"#
    );
}

// == Lifecycle ==

#[test]
fn test_typed_value_roundtrip() {
    let session = Session {
        user: "ada".to_string(),
        roles: vec!["admin".to_string(), "ops".to_string()],
        last_seen: Some(1_705_329_000),
    };
    let clock = clock_at(1_705_329_000_000);
    let entry = CacheEntry::new_with(session.clone(), 30 * 60 * 1000, &clock).unwrap();

    let parsed: CacheEntry<Session> = CacheEntry::parse(&entry.serialize().unwrap()).unwrap();
    assert_eq!(parsed, entry);
    assert_eq!(parsed.into_value(), session);
}

#[test]
fn test_entry_queried_at_later_instants() {
    let entry = CacheEntry::new_with("value", "60000", &clock_at(0)).unwrap();
    let text = entry.serialize().unwrap();
    let parsed: CacheEntry<String> = CacheEntry::parse(&text).unwrap();

    let checkpoints = [
        (0, false, 60_000),
        (59_999, false, 1),
        (60_000, false, 0),
        (60_001, true, -1),
    ];
    for (now, expired, remaining) in checkpoints {
        let clock = clock_at(now);
        assert_eq!(parsed.is_expired_with(&clock), expired, "expired at {}", now);
        assert_eq!(
            parsed.remaining_ttl_with(&clock),
            Some(TimeDelta::milliseconds(remaining))
        );
    }
}

#[test]
fn test_entries_shared_across_threads() {
    let entry = std::sync::Arc::new(CacheEntry::new("shared", 60_000).unwrap());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let entry = entry.clone();
            std::thread::spawn(move || entry.is_expired())
        })
        .collect();

    for handle in handles {
        assert!(!handle.join().unwrap());
    }
}

// == Command Handlers ==

#[test]
fn test_build_then_inspect() {
    let clock = clock_at(100_000);
    let text = build_entry(r#"{"answer":42}"#, Ttl::Raw("1000".to_string()), &clock).unwrap();

    let report = inspect_entry(&text, &clock).unwrap();
    assert_eq!(report.value, json!({ "answer": 42 }));
    assert_eq!(report.expiration.as_deref(), Some("1970-01-01T00:01:41.000Z"));
    assert!(!report.expired);
    assert_eq!(report.remaining_ms, Some(1_000));
}
