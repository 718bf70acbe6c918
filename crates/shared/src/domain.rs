use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};

/// Opaque event identifier.
///
/// The gateway may hand out numeric or string ids; whichever shape arrives is
/// echoed back unchanged as `event_id` in later requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventId {
    Numeric(i64),
    Text(String),
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for EventId {
    fn from(value: i64) -> Self {
        Self::Numeric(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: EventId,
    pub title: String,
    pub description: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub start_date: DateTime<Utc>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub poster: Option<String>,
}

const NAIVE_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parses a gateway timestamp. Values without an offset are taken as UTC and a
/// bare date means midnight UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Some(naive) = NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
    {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).ok_or_else(|| de::Error::custom(format!("invalid timestamp '{raw}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamps_accept_offsets_naive_values_and_bare_dates() {
        let evening = Utc.with_ymd_and_hms(2025, 3, 1, 18, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2025-03-01T18:00:00Z"), Some(evening));
        assert_eq!(parse_timestamp("2025-03-01T19:00:00+01:00"), Some(evening));
        assert_eq!(parse_timestamp("2025-03-01T18:00:00"), Some(evening));
        assert_eq!(parse_timestamp("2025-03-01 18:00:00.000"), Some(evening));
        assert_eq!(
            parse_timestamp("2025-03-01"),
            Some(Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn garbage_timestamps_are_rejected() {
        assert_eq!(parse_timestamp("next friday"), None);
        assert_eq!(parse_timestamp("2025-13-01"), None);
    }
}
