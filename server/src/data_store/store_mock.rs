use crate::data_store::models::{
    NewReservation, NewTable, OccupancyInterval, Reservation, Table,
};
use crate::data_store::{
    ReservationFilter, ReservationId, StoreError, TableBookingStore, TableBookingStoreFacade,
    TableId, OCCUPANCY_OUT_OF_RANGE,
};
use std::sync::Mutex;

/**
 * A mock [TableBookingStore] implementation for testing.
 *
 * The simulated database consists of the [StoreMockData] structure with vectors of entities. These
 * can be directly modified by the tests.
 *
 * The mock has no native exclusion constraint. Instead, all operations are serialized by the
 * mutex, and [TableBookingStoreFacade::create_reservation] re-checks for overlapping reservations
 * right before inserting. The [StoreMockData.skip_conflict_check] attribute can be set to simulate
 * a concurrent writer that passed the application-level conflict check, while the
 * [StoreMockData.next_error] attribute can be set to simulate a database error.
 */
#[derive(Default)]
pub struct StoreMock {
    pub data: Mutex<StoreMockData>,
}

impl TableBookingStore for StoreMock {
    fn get_facade<'a>(&'a self) -> Result<Box<dyn TableBookingStoreFacade + 'a>, StoreError> {
        Ok(Box::new(StoreMockFacade { store: self }))
    }
}

#[derive(Default)]
pub struct StoreMockData {
    pub tables: Vec<Table>,
    pub reservations: Vec<Reservation>,
    /// If not none, the next call to a store facade method will return this error.
    pub next_error: Option<StoreError>,
    /// If true, the conflict check in `create_reservation()` is skipped, such that only the
    /// simulated exclusion constraint can reject an overlapping reservation.
    pub skip_conflict_check: bool,
}

impl StoreMockData {
    fn next_table_id(&self) -> TableId {
        self.tables.iter().map(|t| t.id).max().unwrap_or(0) + 1
    }

    fn next_reservation_id(&self) -> ReservationId {
        self.reservations.iter().map(|r| r.id).max().unwrap_or(0) + 1
    }

    fn overlapping_reservation_exists(
        &self,
        table_id: TableId,
        occupancy: &OccupancyInterval,
    ) -> bool {
        self.reservations
            .iter()
            .filter(|r| r.table_id == table_id)
            .any(|r| r.occupancy().is_some_and(|o| o.overlaps(occupancy)))
    }
}

struct StoreMockFacade<'a> {
    store: &'a StoreMock,
}

impl StoreMockFacade<'_> {
    fn lock_data(&self) -> Result<std::sync::MutexGuard<'_, StoreMockData>, StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        Ok(data)
    }
}

impl TableBookingStoreFacade for StoreMockFacade<'_> {
    fn get_tables(&mut self) -> Result<Vec<Table>, StoreError> {
        let data = self.lock_data()?;
        let mut result = data.tables.clone();
        result.sort_by_key(|t| t.id);
        Ok(result)
    }

    fn get_table(&mut self, table_id: TableId) -> Result<Table, StoreError> {
        let data = self.lock_data()?;
        data.tables
            .iter()
            .find(|t| t.id == table_id)
            .cloned()
            .ok_or(StoreError::NotExisting)
    }

    fn create_table(&mut self, table: NewTable) -> Result<Table, StoreError> {
        let mut data = self.lock_data()?;
        if table.seats <= 0 {
            return Err(StoreError::InvalidInputData(
                "Table's seats must be greater than 0.".to_owned(),
            ));
        }
        let table = Table {
            id: data.next_table_id(),
            name: table.name,
            seats: table.seats,
            location: table.location,
        };
        data.tables.push(table.clone());
        Ok(table)
    }

    fn delete_table(&mut self, table_id: TableId) -> Result<(), StoreError> {
        let mut data = self.lock_data()?;
        if !data.tables.iter().any(|t| t.id == table_id) {
            return Err(StoreError::NotExisting);
        }
        if data.reservations.iter().any(|r| r.table_id == table_id) {
            return Err(StoreError::TableInUse(table_id));
        }
        data.tables.retain(|t| t.id != table_id);
        Ok(())
    }

    fn get_reservations(
        &mut self,
        filter: ReservationFilter,
    ) -> Result<Vec<Reservation>, StoreError> {
        let data = self.lock_data()?;
        let mut result: Vec<Reservation> = data
            .reservations
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        result.sort_by_key(|r| (r.reservation_time, r.id));
        Ok(result)
    }

    fn get_reservation(&mut self, reservation_id: ReservationId) -> Result<Reservation, StoreError> {
        let data = self.lock_data()?;
        data.reservations
            .iter()
            .find(|r| r.id == reservation_id)
            .cloned()
            .ok_or(StoreError::NotExisting)
    }

    fn has_conflict(
        &mut self,
        table_id: TableId,
        occupancy: &OccupancyInterval,
    ) -> Result<bool, StoreError> {
        let data = self.lock_data()?;
        Ok(data.overlapping_reservation_exists(table_id, occupancy))
    }

    fn create_reservation(
        &mut self,
        reservation: NewReservation,
    ) -> Result<Reservation, StoreError> {
        let mut data = self.lock_data()?;
        if !data.tables.iter().any(|t| t.id == reservation.table_id) {
            return Err(StoreError::ReferencedTableMissing(reservation.table_id));
        }
        let occupancy = reservation
            .occupancy()
            .ok_or_else(|| StoreError::InvalidInputData(OCCUPANCY_OUT_OF_RANGE.to_owned()))?;
        if !data.skip_conflict_check
            && data.overlapping_reservation_exists(reservation.table_id, &occupancy)
        {
            return Err(StoreError::SlotTaken);
        }
        if reservation.duration_minutes <= 0 {
            return Err(StoreError::InvalidInputData(
                "Reservation's duration_minutes must be greater than 0.".to_owned(),
            ));
        }
        // Simulated exclusion constraint
        if data.overlapping_reservation_exists(reservation.table_id, &occupancy) {
            return Err(StoreError::OverlapConstraintViolated);
        }
        let reservation = Reservation {
            id: data.next_reservation_id(),
            customer_name: reservation.customer_name,
            table_id: reservation.table_id,
            reservation_time: reservation.reservation_time,
            duration_minutes: reservation.duration_minutes,
        };
        data.reservations.push(reservation.clone());
        Ok(reservation)
    }

    fn delete_reservation(&mut self, reservation_id: ReservationId) -> Result<(), StoreError> {
        let mut data = self.lock_data()?;
        let count_before = data.reservations.len();
        data.reservations.retain(|r| r.id != reservation_id);
        if data.reservations.len() == count_before {
            return Err(StoreError::NotExisting);
        }
        Ok(())
    }
}
