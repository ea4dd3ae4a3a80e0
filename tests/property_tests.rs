//! Property-based tests for the round-trip guarantees.
//!
//! Generated documents must decode back to themselves after encoding, with
//! default and non-default options alike, and generated Rust values must
//! survive the serde path.

use chrono::{NaiveDate, NaiveTime, TimeZone};
use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tidy_toml::{decode, encode, encode_with_options, from_str, to_string, EncodeOptions, Table, Value};

fn roundtrip<T: Serialize + for<'de> Deserialize<'de> + PartialEq + std::fmt::Debug>(
    value: &T,
) -> bool {
    match to_string(value) {
        Ok(serialized) => match from_str::<T>(&serialized) {
            Ok(deserialized) => *value == deserialized,
            Err(e) => {
                eprintln!("Deserialize failed: {}", e);
                eprintln!("Serialized was: {}", serialized);
                false
            }
        },
        Err(e) => {
            eprintln!("Serialize failed: {}", e);
            false
        }
    }
}

fn date() -> impl Strategy<Value = NaiveDate> {
    (2i32..=9998, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn time() -> impl Strategy<Value = NaiveTime> {
    (0u32..24, 0u32..60, 0u32..60, prop_oneof![Just(0u32), 0u32..1_000_000])
        .prop_map(|(h, m, s, us)| NaiveTime::from_hms_micro_opt(h, m, s, us).unwrap())
}

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
        prop::num::f64::NORMAL.prop_map(Value::from),
        "[ -~\n\t]{0,40}".prop_map(Value::from),
        date().prop_map(Value::from),
        time().prop_map(Value::from),
        (date(), time()).prop_map(|(d, t)| Value::from(d.and_time(t))),
        (date(), time(), -(23 * 60 + 59)..=(23 * 60 + 59)).prop_map(|(d, t, minutes)| {
            let offset = chrono::FixedOffset::east_opt(minutes * 60).unwrap();
            Value::from(offset.from_utc_datetime(&d.and_time(t)))
        }),
    ]
}

fn value() -> impl Strategy<Value = Value> {
    leaf().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,5}", inner, 0..4)
                .prop_map(|entries| Value::Table(entries.into_iter().collect())),
        ]
    })
}

fn document() -> impl Strategy<Value = Table> {
    prop::collection::btree_map("[a-z]{1,5}", value(), 0..6)
        .prop_map(|entries| entries.into_iter().collect())
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Inner {
    label: String,
    weight: f64,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Record {
    id: i64,
    name: String,
    flags: Vec<u16>,
    enabled: Option<bool>,
    scores: BTreeMap<String, i32>,
    inner: Inner,
    items: Vec<Inner>,
}

fn inner() -> impl Strategy<Value = Inner> {
    ("\\PC{0,20}", prop::num::f64::NORMAL).prop_map(|(label, weight)| Inner { label, weight })
}

fn record() -> impl Strategy<Value = Record> {
    (
        any::<i64>(),
        "\\PC{0,30}",
        prop::collection::vec(any::<u16>(), 0..8),
        proptest::option::of(any::<bool>()),
        prop::collection::btree_map("[a-z_ ]{0,6}", any::<i32>(), 0..4),
        inner(),
        prop::collection::vec(inner(), 0..3),
    )
        .prop_map(|(id, name, flags, enabled, scores, inner, items)| Record {
            id,
            name,
            flags,
            enabled,
            scores,
            inner,
            items,
        })
}

proptest! {
    #[test]
    fn prop_document_roundtrip(doc in document()) {
        let text = encode(&doc).unwrap();
        let decoded = decode(&text);
        prop_assert!(decoded.is_ok(), "failed to decode:\n{}", text);
        prop_assert_eq!(decoded.unwrap(), doc);
    }

    #[test]
    fn prop_document_roundtrip_with_options(
        doc in document(),
        indent in 0usize..5,
        wrap in 10usize..80,
        crlf in any::<bool>(),
    ) {
        let options = EncodeOptions::sorted()
            .with_indent(indent)
            .with_wrap(wrap)
            .with_newline(if crlf { "\r\n" } else { "\n" });
        let text = encode_with_options(&doc, &options).unwrap();
        let decoded = decode(&text);
        prop_assert!(decoded.is_ok(), "failed to decode:\n{}", text);
        prop_assert_eq!(decoded.unwrap(), doc);
    }

    #[test]
    fn prop_encoding_is_idempotent(doc in document()) {
        let once = encode(&doc).unwrap();
        let twice = encode(&decode(&once).unwrap()).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_i64_field(n in any::<i64>()) {
        let mut table = BTreeMap::new();
        table.insert("n".to_string(), n);
        prop_assert!(roundtrip(&table));
    }

    #[test]
    fn prop_u64_field(n in any::<u64>()) {
        let mut table = BTreeMap::new();
        table.insert("n".to_string(), n);
        prop_assert!(roundtrip(&table));
    }

    #[test]
    fn prop_string_field(s in "\\PC{0,40}|[ -~\n]{0,200}") {
        let mut table = BTreeMap::new();
        table.insert("s".to_string(), s);
        prop_assert!(roundtrip(&table));
    }

    #[test]
    fn prop_record(record in record()) {
        prop_assert!(roundtrip(&record));
    }
}
