//! Normalization of heterogeneous values read from document bodies.
//!
//! Stored documents come back as JSON, and historical writers were not
//! consistent: dates may be RFC 3339 strings, epoch-millisecond numbers, or
//! absent; amounts may be numbers, strings, or missing. Classification
//! happens here, once, at the store boundary, so the rest of the engine only
//! ever sees [`chrono::DateTime<Utc>`] and [`Pesos`].

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::{EngineError, money::Pesos};

/// A timestamp value exactly as it appears in a stored document body.
///
/// Tagged union over the concrete representations the store actually yields,
/// plus [`Instant`](RawTimestamp::Instant) for locally-constructed dates.
/// Anything outside these shapes is rejected up front by
/// [`classify`](RawTimestamp::classify) instead of being smuggled through as
/// an invalid date.
#[derive(Clone, Debug, PartialEq)]
pub enum RawTimestamp {
    /// `null` or absent field.
    Missing,
    /// Milliseconds since the Unix epoch.
    EpochMillis(i64),
    /// An RFC 3339 date-time string.
    Rfc3339(String),
    /// An already-canonical instant.
    Instant(DateTime<Utc>),
}

impl RawTimestamp {
    /// Classifies a JSON value into one of the known timestamp shapes.
    pub fn classify(value: &Value) -> Result<Self, EngineError> {
        match value {
            Value::Null => Ok(Self::Missing),
            Value::Number(n) => {
                if let Some(ms) = n.as_i64() {
                    Ok(Self::EpochMillis(ms))
                } else if let Some(ms) = n.as_f64() {
                    Ok(Self::EpochMillis(ms as i64))
                } else {
                    Err(EngineError::InvalidTimestamp(format!(
                        "numeric timestamp out of range: {n}"
                    )))
                }
            }
            Value::String(s) => Ok(Self::Rfc3339(s.clone())),
            other => Err(EngineError::InvalidTimestamp(format!(
                "unsupported timestamp shape: {other}"
            ))),
        }
    }

    /// Resolves the raw value to a canonical instant.
    ///
    /// `Missing` maps to `Ok(None)`; everything else either parses or is an
    /// explicit error. There is no permissive fallback that could produce a
    /// silently invalid date.
    pub fn canonical(&self) -> Result<Option<DateTime<Utc>>, EngineError> {
        match self {
            Self::Missing => Ok(None),
            Self::EpochMillis(ms) => Utc
                .timestamp_millis_opt(*ms)
                .single()
                .map(Some)
                .ok_or_else(|| {
                    EngineError::InvalidTimestamp(format!("epoch millis out of range: {ms}"))
                }),
            Self::Rfc3339(s) => DateTime::parse_from_rfc3339(s)
                .map(|dt| Some(dt.with_timezone(&Utc)))
                .map_err(|err| EngineError::InvalidTimestamp(format!("{s:?}: {err}"))),
            Self::Instant(dt) => Ok(Some(*dt)),
        }
    }
}

/// Maps a JSON value to a canonical instant, `None` for null/absent.
pub fn canonical_date(value: &Value) -> Result<Option<DateTime<Utc>>, EngineError> {
    RawTimestamp::classify(value)?.canonical()
}

/// Like [`canonical_date`] but the field must be present.
pub(crate) fn required_date(value: &Value, field: &str) -> Result<DateTime<Utc>, EngineError> {
    canonical_date(value)?
        .ok_or_else(|| EngineError::Document(format!("missing timestamp field: {field}")))
}

/// Encodes an instant for storage in a document body.
pub(crate) fn encode_date(value: DateTime<Utc>) -> Value {
    Value::String(value.to_rfc3339())
}

/// Currency-safe coercion of a JSON value to pesos.
///
/// Numbers and numeric strings are truncated to whole pesos; anything
/// else coerces to zero, matching how listing views treat sparse legacy
/// rows.
pub fn amount_from(value: &Value) -> Pesos {
    let raw = value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f as i64))
        .or_else(|| {
            value
                .as_str()
                .and_then(|s| s.trim().parse::<f64>().ok())
                .map(|f| f as i64)
        })
        .unwrap_or(0);
    Pesos::new(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn epoch_millis_map_to_utc_instant() {
        let dt = canonical_date(&json!(1_700_000_000_000_i64))
            .unwrap()
            .unwrap();
        assert_eq!(dt.timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn null_maps_to_none() {
        assert_eq!(canonical_date(&Value::Null).unwrap(), None);
    }

    #[test]
    fn rfc3339_string_parses() {
        let dt = canonical_date(&json!("2026-02-14T10:30:00-05:00"))
            .unwrap()
            .unwrap();
        assert_eq!(dt.to_rfc3339(), "2026-02-14T15:30:00+00:00");
    }

    #[test]
    fn garbage_is_rejected_not_silently_invalid() {
        assert!(canonical_date(&json!("next tuesday")).is_err());
        assert!(canonical_date(&json!({ "seconds": 1 })).is_err());
        assert!(canonical_date(&json!(true)).is_err());
    }

    #[test]
    fn amounts_coerce_permissively() {
        assert_eq!(amount_from(&json!(150_000)), Pesos::new(150_000));
        assert_eq!(amount_from(&json!(99.9)), Pesos::new(99));
        assert_eq!(amount_from(&json!("12500")), Pesos::new(12_500));
        assert_eq!(amount_from(&json!(" 99.9 ")), Pesos::new(99));
        assert_eq!(amount_from(&json!("not a number")), Pesos::ZERO);
        assert_eq!(amount_from(&Value::Null), Pesos::ZERO);
    }
}
