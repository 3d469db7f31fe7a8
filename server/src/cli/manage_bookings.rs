use crate::cli_error::CliError;
use crate::data_store::{get_store_from_env, ReservationFilter, TableBookingStore, TableId};

pub fn print_table_list() -> Result<(), CliError> {
    let data_store_pool = get_store_from_env()?;
    let mut data_store = data_store_pool.get_facade()?;

    let tables = data_store.get_tables()?;

    let mut table = comfy_table::Table::new();
    table
        .load_preset(comfy_table::presets::ASCII_BORDERS_ONLY_CONDENSED)
        .set_header(vec!["id", "name", "seats", "location"])
        .add_rows(tables.into_iter().map(|t| {
            [t.id.to_string(), t.name, t.seats.to_string(), t.location]
        }));

    println!("{table}");
    Ok(())
}

pub fn print_reservation_list(table_id: Option<TableId>) -> Result<(), CliError> {
    let data_store_pool = get_store_from_env()?;
    let mut data_store = data_store_pool.get_facade()?;

    if let Some(table_id) = table_id {
        let table = data_store.get_table(table_id)?;
        println!("Reservations of table {} ({}):", table.name, table.location);
    }
    let reservations = data_store.get_reservations(ReservationFilter {
        table_id,
        ..Default::default()
    })?;

    let mut table = comfy_table::Table::new();
    table
        .load_preset(comfy_table::presets::ASCII_BORDERS_ONLY_CONDENSED)
        .set_header(vec!["id", "table", "customer", "begin (UTC)", "end (UTC)"])
        .set_content_arrangement(comfy_table::ContentArrangement::Dynamic)
        .add_rows(reservations.into_iter().map(|reservation| {
            let end = reservation
                .occupancy()
                .map(|o| o.end.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "?".to_owned());
            [
                reservation.id.to_string(),
                reservation.table_id.to_string(),
                reservation.customer_name,
                reservation
                    .reservation_time
                    .format("%Y-%m-%d %H:%M")
                    .to_string(),
                end,
            ]
        }));

    println!("{table}");
    Ok(())
}
