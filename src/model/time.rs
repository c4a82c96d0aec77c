//! Instant parsing for API payloads
//!
//! The backend emits naive UTC ISO-8601 strings (`datetime.utcnow().isoformat()`),
//! sometimes with a `Z` suffix. Integer epoch milliseconds are accepted too.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse an instant from RFC 3339 or naive ISO-8601 text (naive is read as UTC)
pub fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireInstant {
    Millis(i64),
    Text(String),
}

impl WireInstant {
    fn into_instant(self) -> Option<DateTime<Utc>> {
        match self {
            WireInstant::Millis(ms) => DateTime::from_timestamp_millis(ms),
            WireInstant::Text(s) => parse_instant(&s),
        }
    }
}

/// Serde helper for required instants
pub fn deserialize_instant<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let wire = WireInstant::deserialize(deserializer)?;
    wire.into_instant()
        .ok_or_else(|| serde::de::Error::custom("unrecognized timestamp format"))
}

/// Serde helper for optional instants; `null`, absent and unparseable values become `None`
pub fn deserialize_optional_instant<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let wire = Option::<WireInstant>::deserialize(deserializer)?;
    Ok(wire.and_then(WireInstant::into_instant))
}
