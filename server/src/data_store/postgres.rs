use super::{
    models, schema, ReservationFilter, ReservationId, StoreError, TableBookingStore,
    TableBookingStoreFacade, TableId, NO_OVERLAP_CONSTRAINT, OCCUPANCY_OUT_OF_RANGE,
    RESERVATION_TABLE_CONSTRAINT,
};
use diesel::dsl::exists;
use diesel::pg::PgConnection;
use diesel::prelude::*;

#[derive(Clone)]
pub struct PgDataStore {
    pool: diesel::r2d2::Pool<diesel::r2d2::ConnectionManager<PgConnection>>,
}

impl PgDataStore {
    pub fn new(database_url: &str, max_pool_size: u32) -> Result<Self, StoreError> {
        let connection_manager = diesel::r2d2::ConnectionManager::<PgConnection>::new(database_url);
        Ok(Self {
            pool: diesel::r2d2::Pool::builder()
                .test_on_check_out(true)
                .max_size(max_pool_size.max(1))
                .min_idle(Some(max_pool_size.clamp(1, 2)))
                .build(connection_manager)?,
        })
    }
}

impl TableBookingStore for PgDataStore {
    fn get_facade<'a>(&'a self) -> Result<Box<dyn TableBookingStoreFacade + 'a>, StoreError> {
        Ok(Box::new(PgDataStoreFacade::with_pooled_connection(
            self.pool.get()?,
        )))
    }
}

pub struct PgDataStoreFacade {
    connection: diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<PgConnection>>,
}

impl PgDataStoreFacade {
    pub fn with_pooled_connection(
        connection: diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<PgConnection>>,
    ) -> Self {
        Self { connection }
    }
}

/// Create an Sql expression for the (exclusive) end of a reservation's occupancy interval.
///
/// This must match the upper bound of the `tsrange` in the `no_overlapping_reservations` exclusion
/// constraint.
fn sql_reservation_end() -> diesel::expression::SqlLiteral<diesel::sql_types::Timestamp> {
    diesel::dsl::sql("(reservations.reservation_time + reservations.duration_minutes * INTERVAL '1 minute')")
}

impl TableBookingStoreFacade for PgDataStoreFacade {
    fn get_tables(&mut self) -> Result<Vec<models::Table>, StoreError> {
        use schema::tables::dsl::*;

        Ok(tables
            .select(models::Table::as_select())
            .order_by(id)
            .load::<models::Table>(&mut self.connection)?)
    }

    fn get_table(&mut self, table_id: TableId) -> Result<models::Table, StoreError> {
        use schema::tables::dsl::*;

        tables
            .filter(id.eq(table_id))
            .select(models::Table::as_select())
            .first::<models::Table>(&mut self.connection)
            .map_err(|e| e.into())
    }

    fn create_table(&mut self, table: models::NewTable) -> Result<models::Table, StoreError> {
        use schema::tables::dsl::*;

        Ok(diesel::insert_into(tables)
            .values(&table)
            .returning(models::Table::as_returning())
            .get_result::<models::Table>(&mut self.connection)?)
    }

    fn delete_table(&mut self, table_id: TableId) -> Result<(), StoreError> {
        use schema::tables::dsl::*;

        self.connection.transaction(|connection| {
            // Lock the table row, so that no reservation can be added concurrently between our
            // check and the DELETE statement.
            tables
                .filter(id.eq(table_id))
                .select(id)
                .for_update()
                .first::<TableId>(connection)?;

            let is_referenced = diesel::select(exists(
                schema::reservations::table.filter(schema::reservations::table_id.eq(table_id)),
            ))
            .get_result::<bool>(connection)?;
            if is_referenced {
                return Err(StoreError::TableInUse(table_id));
            }

            diesel::delete(tables.filter(id.eq(table_id)))
                .execute(connection)
                .map_err(|e| match e {
                    diesel::result::Error::DatabaseError(
                        diesel::result::DatabaseErrorKind::ForeignKeyViolation,
                        ref info,
                    ) if info.constraint_name() == Some(RESERVATION_TABLE_CONSTRAINT) => {
                        StoreError::TableInUse(table_id)
                    }
                    e => e.into(),
                })?;
            Ok(())
        })
    }

    fn get_reservations(
        &mut self,
        filter: ReservationFilter,
    ) -> Result<Vec<models::Reservation>, StoreError> {
        use schema::reservations::dsl::*;

        let mut query = reservations
            .select(models::Reservation::as_select())
            .into_boxed();
        if let Some(the_table_id) = filter.table_id {
            query = query.filter(table_id.eq(the_table_id));
        }
        if let Some(after) = filter.after {
            query = query.filter(sql_reservation_end().gt(after.naive_utc()));
        }
        if let Some(before) = filter.before {
            query = query.filter(reservation_time.lt(before.naive_utc()));
        }
        Ok(query
            .order_by((reservation_time.asc(), id.asc()))
            .load::<models::Reservation>(&mut self.connection)?)
    }

    fn get_reservation(
        &mut self,
        reservation_id: ReservationId,
    ) -> Result<models::Reservation, StoreError> {
        use schema::reservations::dsl::*;

        reservations
            .filter(id.eq(reservation_id))
            .select(models::Reservation::as_select())
            .first::<models::Reservation>(&mut self.connection)
            .map_err(|e| e.into())
    }

    fn has_conflict(
        &mut self,
        table_id: TableId,
        occupancy: &models::OccupancyInterval,
    ) -> Result<bool, StoreError> {
        Ok(reservation_conflict_exists(
            table_id,
            occupancy,
            &mut self.connection,
        )?)
    }

    fn create_reservation(
        &mut self,
        reservation: models::NewReservation,
    ) -> Result<models::Reservation, StoreError> {
        use schema::reservations::dsl::*;

        let occupancy = reservation
            .occupancy()
            .ok_or_else(|| StoreError::InvalidInputData(OCCUPANCY_OUT_OF_RANGE.to_owned()))?;
        self.connection.transaction(|connection| {
            let table_exists = diesel::select(exists(
                schema::tables::table.filter(schema::tables::id.eq(reservation.table_id)),
            ))
            .get_result::<bool>(connection)?;
            if !table_exists {
                return Err(StoreError::ReferencedTableMissing(reservation.table_id));
            }

            if reservation_conflict_exists(reservation.table_id, &occupancy, connection)? {
                return Err(StoreError::SlotTaken);
            }

            // A concurrent transaction may have inserted an overlapping reservation after our
            // check. In this case, the exclusion constraint rejects the INSERT, which is
            // converted to StoreError::OverlapConstraintViolated.
            Ok(diesel::insert_into(reservations)
                .values(reservation)
                .returning(models::Reservation::as_returning())
                .get_result::<models::Reservation>(connection)?)
        })
    }

    fn delete_reservation(&mut self, reservation_id: ReservationId) -> Result<(), StoreError> {
        use schema::reservations::dsl::*;

        self.connection.transaction(|connection| {
            let count = diesel::delete(reservations.filter(id.eq(reservation_id)))
                .execute(connection)?;
            if count == 0 {
                return Err(StoreError::NotExisting);
            }
            Ok(())
        })
    }
}

/// Check if any reservation of the given table overlaps with the half-open interval
/// `[occupancy.begin, occupancy.end)`.
///
/// An existing reservation `[r_begin, r_end)` overlaps, iff `r_begin < end AND r_end > begin`.
fn reservation_conflict_exists(
    the_table_id: TableId,
    occupancy: &models::OccupancyInterval,
    connection: &mut PgConnection,
) -> Result<bool, diesel::result::Error> {
    use schema::reservations::dsl::*;

    diesel::select(exists(
        reservations
            .filter(table_id.eq(the_table_id))
            .filter(reservation_time.lt(occupancy.end.naive_utc()))
            .filter(sql_reservation_end().gt(occupancy.begin.naive_utc())),
    ))
    .get_result::<bool>(connection)
}

/// Get a human-readable description of the consistency expectation that is checked by a specific
/// constraint in our Postgres database schema by the constraint's name.
///
/// These are visible to the user when creating entities inconsistently via the REST API.
///
/// Returns None, when no human-readable description is present of the given constraint name. This
/// may be the case when we don't expect this constraint to be violated by a user interaction.
pub fn description_for_postgres_constraint(constraint_name: &str) -> Option<&'static str> {
    match constraint_name {
        "tables_seats_positive" => Some("Table's seats must be greater than 0."),
        "reservations_duration_positive" => {
            Some("Reservation's duration_minutes must be greater than 0.")
        }
        RESERVATION_TABLE_CONSTRAINT => Some("Reservation's table_id must reference an existing table."),
        NO_OVERLAP_CONSTRAINT => Some("Reservations of the same table must not overlap."),
        _ => None,
    }
}
