//! The database interface of the table booking service
//!
//! The primary entry point to this module is the function [get_store_from_env], which returns an
//! object implementing the [TableBookingStore] trait. This object can be shared between threads in
//! a global application state and be used to create [TableBookingStoreFacade] instances for
//! interaction with the database. These provide a CRUD-like interface, using the data models from
//! the [models] module.
//!
//! The primary implementation of [TableBookingStore] ([postgres::PgDataStore]) wraps a PostgreSQL
//! connection pool and its corresponding [TableBookingStoreFacade] objects
//! ([postgres::PgDataStoreFacade]) hold one pooled connection each, using the Diesel query DSL for
//! implementing the database interaction. A facade is meant to be used for a single request and
//! dropped afterwards, which returns its connection to the pool.
//!
//! Reservations of one table must never overlap. This is checked by
//! [TableBookingStoreFacade::has_conflict] before each insert and enforced by an exclusion
//! constraint of the database, which also covers concurrent inserts.
//!
//! There is also a mock implementation for unittests.

use crate::cli_error::CliError;
use crate::setup;

pub mod models;
mod postgres;
mod schema;
#[cfg(test)]
pub mod store_mock;
mod util;

/// Get a [TableBookingStore] instance, according the "DATABASE_URL" environment variable.
///
/// The DATABASE_URL must be a PosgreSQL connection url, following the schema
/// "postgres://{user}:{password}@{host}/{database}".
pub fn get_store_from_env() -> Result<impl TableBookingStore, CliError> {
    Ok(postgres::PgDataStore::new(
        &setup::get_database_url_from_env()?,
        setup::get_database_pool_size_from_env()?,
    )?)
}

pub type TableId = i32;
pub type ReservationId = i32;

pub trait TableBookingStoreFacade {
    /// Get all tables, ordered by id
    fn get_tables(&mut self) -> Result<Vec<models::Table>, StoreError>;
    fn get_table(&mut self, table_id: TableId) -> Result<models::Table, StoreError>;
    fn create_table(&mut self, table: models::NewTable) -> Result<models::Table, StoreError>;
    /// Delete the table with the given id.
    ///
    /// Tables which are still referenced by reservations are not deleted. In this case,
    /// `Err(StoreError::TableInUse)` is returned.
    fn delete_table(&mut self, table_id: TableId) -> Result<(), StoreError>;

    /// Get a filtered list of reservations
    ///
    /// Reservations are returned in chronological order, i.e. sorted by (reservation_time, id)
    fn get_reservations(
        &mut self,
        filter: ReservationFilter,
    ) -> Result<Vec<models::Reservation>, StoreError>;
    fn get_reservation(
        &mut self,
        reservation_id: ReservationId,
    ) -> Result<models::Reservation, StoreError>;

    /// Check if any existing reservation of the given table overlaps with the given occupancy
    /// interval.
    ///
    /// This is a read-only check. It does not guarantee that a subsequent insert succeeds, since
    /// a concurrent transaction may book the same slot in the meantime.
    fn has_conflict(
        &mut self,
        table_id: TableId,
        occupancy: &models::OccupancyInterval,
    ) -> Result<bool, StoreError>;

    /// Create a new reservation, if the table exists and the requested time slot is free.
    ///
    /// # return value
    /// - `Ok(reservation)` with the newly assigned id, if the reservation has been created
    /// - `Err(StoreError::ReferencedTableMissing)` if the table does not exist
    /// - `Err(StoreError::SlotTaken)` if an overlapping reservation exists already
    /// - `Err(StoreError::OverlapConstraintViolated)` if an overlapping reservation has been
    ///   created concurrently
    /// - `Err(_)` if something different went wrong, as usual
    fn create_reservation(
        &mut self,
        reservation: models::NewReservation,
    ) -> Result<models::Reservation, StoreError>;
    fn delete_reservation(&mut self, reservation_id: ReservationId) -> Result<(), StoreError>;
}

/// Filter options for retrieving reservations from the store via
/// [TableBookingStoreFacade::get_reservations]
#[derive(Default, Debug, Clone)]
pub struct ReservationFilter {
    /// Filter for reservations of the given table
    pub table_id: Option<TableId>,
    /// Filter for reservations that end after the given point in time (this includes
    /// reservations that span over this point in time)
    pub after: Option<chrono::DateTime<chrono::Utc>>,
    /// Filter for reservations that begin before the given point in time (this includes
    /// reservations that span over this point in time)
    pub before: Option<chrono::DateTime<chrono::Utc>>,
}

impl ReservationFilter {
    /// Checks if a given reservation matches the filter, for filtering in the mock store
    #[cfg(test)]
    pub fn matches(&self, reservation: &models::Reservation) -> bool {
        if let Some(table_id) = self.table_id {
            if table_id != reservation.table_id {
                return false;
            }
        }
        let Some(occupancy) = reservation.occupancy() else {
            return false;
        };
        if let Some(after) = self.after {
            if after >= occupancy.end {
                return false;
            }
        }
        if let Some(before) = self.before {
            if before <= occupancy.begin {
                return false;
            }
        }
        true
    }
}

pub trait TableBookingStore: Send + Sync {
    fn get_facade<'a>(&'a self) -> Result<Box<dyn TableBookingStoreFacade + 'a>, StoreError>;
}

/// Name of the database exclusion constraint, which prevents overlapping reservations of the
/// same table.
pub const NO_OVERLAP_CONSTRAINT: &str = "no_overlapping_reservations";
/// Error description for reservations whose end is beyond the representable time range
pub const OCCUPANCY_OUT_OF_RANGE: &str = "Reservation's end is out of the supported time range.";
/// Name of the foreign key constraint from reservations to their table
pub const RESERVATION_TABLE_CONSTRAINT: &str = "reservations_table_id_fkey";

#[derive(Debug)]
pub enum StoreError {
    /// Connection the database failed. See string description for details.
    ConnectionError(String),
    /// The query could not be executed because of some error not covered by the other members (see
    /// string description)
    QueryError(diesel::result::Error),
    /// Database transaction could not be commited due to a conflicting concurrent transaction
    TransactionConflict,
    /// The requested entity does not exist
    NotExisting,
    /// The reservation could not be created, because the referenced table does not exist
    ReferencedTableMissing(TableId),
    /// The reservation could not be created, because the table is already reserved for an
    /// overlapping time slot.
    SlotTaken,
    /// The reservation has been rejected by the database's exclusion constraint, i.e. an
    /// overlapping reservation has been created by a concurrent transaction after our conflict
    /// check.
    OverlapConstraintViolated,
    /// The table cannot be deleted, because it is still referenced by reservations
    TableInUse(TableId),
    /// The provided data is invalid, i.e. it does not match the expected ranges or violates a
    /// SQL constraint. See string description for details.
    InvalidInputData(String),
    /// Some data queried from the database could not be deserialized. See string description for
    /// details.
    InvalidDataInDatabase(String),
}

impl From<diesel::result::Error> for StoreError {
    fn from(error: diesel::result::Error) -> Self {
        use diesel::result::DatabaseErrorKind;
        match error {
            diesel::result::Error::NotFound => Self::NotExisting,
            diesel::result::Error::DatabaseError(_, ref info)
                if info.constraint_name() == Some(NO_OVERLAP_CONSTRAINT) =>
            {
                Self::OverlapConstraintViolated
            }
            diesel::result::Error::DatabaseError(
                DatabaseErrorKind::SerializationFailure,
                _,
            ) => Self::TransactionConflict,
            diesel::result::Error::DatabaseError(
                e @ DatabaseErrorKind::ForeignKeyViolation
                | e @ DatabaseErrorKind::CheckViolation
                | e @ DatabaseErrorKind::NotNullViolation,
                info,
            ) => Self::InvalidInputData(
                info.constraint_name()
                    .and_then(postgres::description_for_postgres_constraint)
                    .map(|d| d.to_owned())
                    .unwrap_or_else(|| format!("{:?}", e)),
            ),
            diesel::result::Error::SerializationError(e) => Self::InvalidInputData(e.to_string()),
            diesel::result::Error::DeserializationError(e) => {
                Self::InvalidDataInDatabase(e.to_string())
            }
            _ => Self::QueryError(error),
        }
    }
}

impl From<r2d2::Error> for StoreError {
    fn from(error: r2d2::Error) -> Self {
        Self::ConnectionError(error.to_string())
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConnectionError(e) => write!(f, "Error connecting to database: {}", e),
            Self::QueryError(e) => write!(f, "Error while executing database query: {}", e),
            Self::TransactionConflict => f.write_str("Database transaction could not be commited due to a conflicting concurrent transaction"),
            Self::NotExisting => f.write_str("Database record does not exist."),
            Self::ReferencedTableMissing(table_id) => {
                write!(f, "Referenced table {} does not exist.", table_id)
            }
            Self::SlotTaken => f.write_str("The table is already reserved for an overlapping time slot."),
            Self::OverlapConstraintViolated => f.write_str("Reservation rejected by database constraint: the table has been reserved concurrently for an overlapping time slot."),
            Self::TableInUse(table_id) => {
                write!(f, "Table {} is still referenced by reservations.", table_id)
            }
            Self::InvalidInputData(e) => {
                write!(f, "Data to be stored in database is not valid: {}", e)
            }
            Self::InvalidDataInDatabase(e) => {
                write!(f, "Data queried from database could not be deserialized: {}", e)
            }
        }
    }
}

impl std::error::Error for StoreError {}
