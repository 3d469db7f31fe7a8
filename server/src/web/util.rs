use chrono::{DateTime, Utc};
use serde::de::{Error, Unexpected};
use serde::{Deserialize, Deserializer};

/// Helper function for deserializing an optional ISO 8601 timestamp from a query string to an
/// `Option<DateTime<Utc>>` within a struct by deriving `serde::Deserialize` with
/// `#[serde(default, deserialize_with=...)]`.
///
/// Timestamps without UTC offset are interpreted as UTC, like in request bodies.
pub fn deserialize_optional_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    table_booking_api_types::parse_timestamp(&value)
        .map(Some)
        .map_err(|_| D::Error::invalid_value(Unexpected::Str(&value), &"an ISO 8601 timestamp"))
}
