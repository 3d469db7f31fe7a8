use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub id: i32,
    pub name: String,
    pub seats: i32,
    pub location: String,
}

/// Request body for creating a table. The id is assigned by the server.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewTable {
    pub name: String,
    pub seats: i32,
    pub location: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: i32,
    pub customer_name: String,
    pub table_id: i32,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub reservation_time: DateTime<Utc>,
    pub duration_minutes: i32,
}

/// Request body for creating a reservation. The id is assigned by the server.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewReservation {
    pub customer_name: String,
    pub table_id: i32,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub reservation_time: DateTime<Utc>,
    pub duration_minutes: i32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeletionConfirmation {
    pub message: String,
}

/// Result of checking whether a table is free during `[start, end)`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Availability {
    pub table_id: i32,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub available: bool,
}

/// Deserialize an ISO 8601 timestamp to a UTC timestamp.
///
/// Timestamps with an explicit offset (RFC 3339) are converted to UTC. Timestamps without offset
/// (e.g. "2025-04-10T12:00:00") are interpreted as UTC.
pub fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    parse_timestamp(&value).map_err(|_| {
        serde::de::Error::invalid_value(
            serde::de::Unexpected::Str(&value),
            &"an ISO 8601 timestamp",
        )
    })
}

/// Parse an ISO 8601 timestamp with or without UTC offset. See [deserialize_timestamp].
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    match DateTime::parse_from_rfc3339(value) {
        Ok(timestamp) => Ok(timestamp.with_timezone(&Utc)),
        Err(e) => value
            .parse::<chrono::NaiveDateTime>()
            .map(|naive| naive.and_utc())
            .map_err(|_| e),
    }
}
