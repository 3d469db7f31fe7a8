use crate::data_store::{ReservationId, TableId};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

#[derive(Clone, Debug, PartialEq, Queryable, Selectable)]
#[diesel(table_name=super::schema::tables)]
pub struct Table {
    pub id: TableId,
    pub name: String,
    pub seats: i32,
    pub location: String,
}

impl From<Table> for table_booking_api_types::Table {
    fn from(value: Table) -> Self {
        Self {
            id: value.id,
            name: value.name,
            seats: value.seats,
            location: value.location,
        }
    }
}

#[derive(Clone, Debug, Insertable)]
#[diesel(table_name=super::schema::tables)]
pub struct NewTable {
    pub name: String,
    pub seats: i32,
    pub location: String,
}

impl From<table_booking_api_types::NewTable> for NewTable {
    fn from(value: table_booking_api_types::NewTable) -> Self {
        Self {
            name: value.name,
            seats: value.seats,
            location: value.location,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Queryable, Selectable)]
#[diesel(table_name=super::schema::reservations)]
pub struct Reservation {
    pub id: ReservationId,
    pub customer_name: String,
    pub table_id: TableId,
    #[diesel(deserialize_as=super::util::UtcTimestampWrapper)]
    pub reservation_time: DateTime<Utc>,
    pub duration_minutes: i32,
}

impl Reservation {
    /// The reservation's occupancy interval. None, if its end is beyond the representable range.
    pub fn occupancy(&self) -> Option<OccupancyInterval> {
        OccupancyInterval::from_start_and_duration(self.reservation_time, self.duration_minutes)
    }
}

impl From<Reservation> for table_booking_api_types::Reservation {
    fn from(value: Reservation) -> Self {
        Self {
            id: value.id,
            customer_name: value.customer_name,
            table_id: value.table_id,
            reservation_time: value.reservation_time,
            duration_minutes: value.duration_minutes,
        }
    }
}

// Only the owned struct implements `Insertable`, due to the `serialize_as` attribute. So, it must
// be passed by value to `insert_into().values()`.
#[derive(Clone, Debug, Insertable)]
#[diesel(table_name=super::schema::reservations)]
pub struct NewReservation {
    pub customer_name: String,
    pub table_id: TableId,
    #[diesel(serialize_as=super::util::UtcTimestampWrapper)]
    pub reservation_time: DateTime<Utc>,
    pub duration_minutes: i32,
}

impl NewReservation {
    pub fn occupancy(&self) -> Option<OccupancyInterval> {
        OccupancyInterval::from_start_and_duration(self.reservation_time, self.duration_minutes)
    }
}

impl From<table_booking_api_types::NewReservation> for NewReservation {
    fn from(value: table_booking_api_types::NewReservation) -> Self {
        Self {
            customer_name: value.customer_name,
            table_id: value.table_id,
            reservation_time: value.reservation_time,
            duration_minutes: value.duration_minutes,
        }
    }
}

/// The half-open time range `[begin, end)` during which a reservation holds its table.
///
/// Two reservations of the same table conflict, iff their occupancy intervals overlap. Intervals
/// which only touch (one ends exactly when the other begins) do not overlap. The database's
/// exclusion constraint uses the same semantics (`tsrange(..., '[)')`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OccupancyInterval {
    pub begin: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl OccupancyInterval {
    /// Returns None, if the end of the interval is not representable as `DateTime<Utc>`.
    pub fn from_start_and_duration(start: DateTime<Utc>, duration_minutes: i32) -> Option<Self> {
        Some(Self {
            begin: start,
            end: start.checked_add_signed(chrono::Duration::minutes(duration_minutes.into()))?,
        })
    }

    pub fn overlaps(&self, other: &OccupancyInterval) -> bool {
        self.begin < other.end && other.begin < self.end
    }
}
