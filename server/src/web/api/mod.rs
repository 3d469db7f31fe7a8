use std::fmt::Display;

mod endpoints_reservation;
mod endpoints_table;

use crate::data_store::models::OccupancyInterval;
use crate::data_store::StoreError;
use actix_web::error::JsonPayloadError;
use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    web, HttpResponse,
};
use chrono::{DateTime, Datelike, Utc};
use serde_json::json;

pub fn configure_app(cfg: &mut web::ServiceConfig) {
    let json_config =
        web::JsonConfig::default().error_handler(|err, _req| APIError::InvalidJson(err).into());
    let query_config = web::QueryConfig::default()
        .error_handler(|err, _req| APIError::InvalidData(err.to_string()).into());
    cfg.app_data(json_config)
        .app_data(query_config)
        .service(endpoints_table::list_tables)
        .service(endpoints_table::create_table)
        .service(endpoints_table::get_table)
        .service(endpoints_table::delete_table)
        .service(endpoints_table::get_table_availability)
        .service(endpoints_reservation::list_reservations)
        .service(endpoints_reservation::create_reservation)
        .service(endpoints_reservation::get_reservation)
        .service(endpoints_reservation::delete_reservation);
}

#[derive(Debug)]
pub enum APIError {
    /// The requested or referenced entity does not exist. The message names the missing id.
    NotExisting(String),
    /// The table is already reserved for an overlapping time slot. `raced` is true if the
    /// reservation passed the conflict check but was rejected by the database constraint.
    ReservationConflict { raced: bool },
    TableInUse(i32),
    /// Writing a table failed in the data store
    WriteRejected(String),
    InvalidJson(actix_web::error::JsonPayloadError),
    InvalidData(String),
    TransactionConflict,
    InternalError(String),
}

impl APIError {
    /// Replace the generic message of [APIError::NotExisting] with one naming the requested entity
    fn naming_missing(self, entity: &str, id: i32) -> Self {
        match self {
            Self::NotExisting(_) => Self::NotExisting(format!("{} {} not found", entity, id)),
            e => e,
        }
    }

    /// Report data store failures of table writes as rejected write instead of internal error
    fn rejecting_write(self) -> Self {
        match self {
            Self::InternalError(e) => Self::WriteRejected(e),
            e => e,
        }
    }
}

/// Earliest year of the PostgreSQL `TIMESTAMP` range (4713 BC, in proleptic ISO year numbering).
/// The latest storable year is beyond chrono's range.
const EARLIEST_STORABLE_YEAR: i32 = -4712;

/// Check that a timestamp given in a request can be stored in and compared by the database
fn validate_timestamp(field_name: &str, timestamp: &DateTime<Utc>) -> Result<(), APIError> {
    if timestamp.year() < EARLIEST_STORABLE_YEAR {
        return Err(APIError::InvalidData(format!(
            "{} is before the earliest supported date (4713 BC)",
            field_name
        )));
    }
    Ok(())
}

/// Check a requested time slot and calculate the occupancy interval
fn validate_time_slot(
    field_name: &str,
    start: DateTime<Utc>,
    duration_minutes: i32,
) -> Result<OccupancyInterval, APIError> {
    if duration_minutes <= 0 {
        return Err(APIError::InvalidData(
            "duration_minutes must be greater than 0".to_owned(),
        ));
    }
    validate_timestamp(field_name, &start)?;
    OccupancyInterval::from_start_and_duration(start, duration_minutes).ok_or_else(|| {
        APIError::InvalidData(format!(
            "{} plus duration_minutes is after the latest supported date",
            field_name
        ))
    })
}

impl Display for APIError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotExisting(s) => f.write_str(s)?,
            Self::ReservationConflict { .. } => {
                f.write_str("Slot taken: the table is already reserved for an overlapping time slot.")?
            }
            Self::TableInUse(table_id) => {
                write!(f, "Table {} still has reservations and cannot be deleted.", table_id)?
            }
            Self::WriteRejected(s) => {
                f.write_str("Could not store table: ")?;
                f.write_str(s)?;
            }
            Self::InternalError(s) => {
                f.write_str("Internal error: ")?;
                f.write_str(s)?;
            }
            Self::InvalidJson(e) => {
                write!(f, "Invalid JSON request data: {}", e)?;
            }
            Self::InvalidData(e) => {
                write!(f, "Invalid request data: {}", e)?;
            }
            Self::TransactionConflict => {
                f.write_str("Concurrent database transaction conflict. Please retry request.")?;
            }
        };
        Ok(())
    }
}

impl ResponseError for APIError {
    fn error_response(&self) -> HttpResponse {
        let message = format!("{}", self);

        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(json!({
                "httpCode": self.status_code().as_u16(),
                "message": message
            }))
    }
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotExisting(_) => StatusCode::NOT_FOUND,
            Self::ReservationConflict { .. } => StatusCode::BAD_REQUEST,
            Self::TableInUse(_) => StatusCode::BAD_REQUEST,
            Self::WriteRejected(_) => StatusCode::BAD_REQUEST,
            Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InvalidJson(e) => match e {
                JsonPayloadError::ContentType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                JsonPayloadError::Deserialize(json_error) if json_error.is_data() => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                _ => StatusCode::BAD_REQUEST,
            },
            Self::InvalidData(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::TransactionConflict => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl From<StoreError> for APIError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::ConnectionError(error) => {
                Self::InternalError(format!("Could not connect to database: {}", error))
            }
            StoreError::QueryError(diesel_error) => Self::InternalError(format!(
                "Error while executing database query: {}",
                diesel_error
            )),
            StoreError::TransactionConflict => Self::TransactionConflict,
            StoreError::NotExisting => Self::NotExisting("Element does not exist".to_owned()),
            StoreError::ReferencedTableMissing(table_id) => {
                Self::NotExisting(format!("Table {} not found", table_id))
            }
            StoreError::SlotTaken => Self::ReservationConflict { raced: false },
            StoreError::OverlapConstraintViolated => Self::ReservationConflict { raced: true },
            StoreError::TableInUse(table_id) => Self::TableInUse(table_id),
            StoreError::InvalidInputData(e) => Self::InvalidData(e),
            StoreError::InvalidDataInDatabase(e) => Self::InternalError(format!(
                "Data queried from database could not be deserialized: {}",
                e
            )),
        }
    }
}

impl From<actix_web::error::BlockingError> for APIError {
    fn from(_e: actix_web::error::BlockingError) -> Self {
        APIError::InternalError(
            "Could not get thread from thread pool for synchronous database operation.".to_owned(),
        )
    }
}
