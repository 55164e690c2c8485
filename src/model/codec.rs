// Copyright 2023 Remi Bernotavicius

//! Field-level JSON encoders shared by the entity and aggregate types.

use serde::{Deserialize, Deserializer};

/// RFC 3339 in UTC with a `Z` suffix. Fractional seconds are only written when present.
pub mod timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize as _, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&s)
            .map(|t| t.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

/// Largest magnitude where every integer is exactly representable as an `f64`.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Amounts are stored as `f64` but whole numbers go out as bare JSON integers.
/// NaN and the infinities have no JSON form and are refused.
pub mod amount {
    use super::MAX_EXACT_INTEGER;
    use serde::{ser, Deserialize as _, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if !value.is_finite() {
            Err(ser::Error::custom(format!("amount {value} is not finite")))
        } else if value.fract() == 0.0 && value.abs() <= MAX_EXACT_INTEGER {
            serializer.serialize_i64(*value as i64)
        } else {
            serializer.serialize_f64(*value)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        f64::deserialize(deserializer)
    }
}

/// Older producers write `null` for an empty list.
pub fn nullable_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[test]
fn amounts() {
    #[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq)]
    struct Measure {
        #[serde(with = "amount")]
        value: f64,
    }

    let whole = Measure { value: 42.0 };
    assert_eq!(serde_json::to_string(&whole).unwrap(), r#"{"value":42}"#);

    let fraction = Measure { value: 0.5 };
    assert_eq!(serde_json::to_string(&fraction).unwrap(), r#"{"value":0.5}"#);

    let negative = Measure { value: -3.0 };
    assert_eq!(serde_json::to_string(&negative).unwrap(), r#"{"value":-3}"#);

    let decoded: Measure = serde_json::from_str(r#"{"value":42}"#).unwrap();
    assert_eq!(decoded, whole);
    let decoded: Measure = serde_json::from_str(r#"{"value":1.25}"#).unwrap();
    assert_eq!(decoded.value, 1.25);
    assert!(serde_json::from_str::<Measure>(r#"{"value":"42"}"#).is_err());

    for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        let err = serde_json::to_string(&Measure { value }).unwrap_err();
        assert!(err.to_string().contains("is not finite"), "{err}");
    }
}

#[test]
fn timestamps() {
    use chrono::{DateTime, TimeZone as _, Utc};

    #[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq)]
    struct Stamped {
        #[serde(with = "timestamp")]
        at: DateTime<Utc>,
    }

    let at = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();
    let stamped = Stamped { at };
    assert_eq!(
        serde_json::to_string(&stamped).unwrap(),
        r#"{"at":"2000-01-01T00:00:00Z"}"#
    );

    let precise = Stamped {
        at: at + chrono::Duration::milliseconds(250),
    };
    let json = serde_json::to_string(&precise).unwrap();
    assert_eq!(json, r#"{"at":"2000-01-01T00:00:00.250Z"}"#);
    assert_eq!(serde_json::from_str::<Stamped>(&json).unwrap(), precise);

    let offset: Stamped = serde_json::from_str(r#"{"at":"2000-01-01T02:00:00+02:00"}"#).unwrap();
    assert_eq!(offset, stamped);
    assert!(serde_json::from_str::<Stamped>(r#"{"at":"yesterday"}"#).is_err());
}

#[test]
fn null_lists() {
    #[derive(serde::Deserialize, Debug)]
    struct Listed {
        #[serde(default, deserialize_with = "nullable_vec")]
        items: Vec<u32>,
    }

    let listed: Listed = serde_json::from_str(r#"{"items":null}"#).unwrap();
    assert!(listed.items.is_empty());
    let listed: Listed = serde_json::from_str("{}").unwrap();
    assert!(listed.items.is_empty());
    let listed: Listed = serde_json::from_str(r#"{"items":[1,2]}"#).unwrap();
    assert_eq!(listed.items, vec![1, 2]);
}
