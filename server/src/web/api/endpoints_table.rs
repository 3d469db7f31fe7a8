use crate::data_store::models::NewTable;
use crate::web::api::{validate_time_slot, APIError};
use crate::web::AppState;
use actix_web::{delete, get, post, web, HttpResponse, Responder};
use log::info;
use serde::Deserialize;

#[get("/tables")]
async fn list_tables(state: web::Data<AppState>) -> Result<impl Responder, APIError> {
    let tables: Vec<table_booking_api_types::Table> = web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        Ok(store.get_tables()?)
    })
    .await??
    .into_iter()
    .map(|t| t.into())
    .collect();

    Ok(web::Json(tables))
}

#[get("/tables/{table_id}")]
async fn get_table(
    path: web::Path<i32>,
    state: web::Data<AppState>,
) -> Result<impl Responder, APIError> {
    let table_id = path.into_inner();
    let table: table_booking_api_types::Table = web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        store
            .get_table(table_id)
            .map_err(|e| APIError::from(e).naming_missing("Table", table_id))
    })
    .await??
    .into();

    Ok(web::Json(table))
}

#[post("/tables")]
async fn create_table(
    data: web::Json<table_booking_api_types::NewTable>,
    state: web::Data<AppState>,
) -> Result<impl Responder, APIError> {
    let table = data.into_inner();
    if table.seats <= 0 {
        return Err(APIError::InvalidData(
            "seats must be greater than 0".to_owned(),
        ));
    }
    let created = web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        store
            .create_table(NewTable::from(table))
            .map_err(|e| APIError::from(e).rejecting_write())
    })
    .await??;
    info!(
        "Created table {} ({}, {} seats, {})",
        created.id, created.name, created.seats, created.location
    );

    Ok(HttpResponse::Created().json(table_booking_api_types::Table::from(created)))
}

#[delete("/tables/{table_id}")]
async fn delete_table(
    path: web::Path<i32>,
    state: web::Data<AppState>,
) -> Result<impl Responder, APIError> {
    let table_id = path.into_inner();
    web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        store.delete_table(table_id).map_err(|e| {
            APIError::from(e)
                .naming_missing("Table", table_id)
                .rejecting_write()
        })
    })
    .await??;
    info!("Deleted table {}", table_id);

    Ok(web::Json(table_booking_api_types::DeletionConfirmation {
        message: "Table deleted successfully".to_owned(),
    }))
}

#[derive(Deserialize)]
struct AvailabilityQuery {
    #[serde(deserialize_with = "table_booking_api_types::deserialize_timestamp")]
    start: chrono::DateTime<chrono::Utc>,
    duration_minutes: i32,
}

#[get("/tables/{table_id}/availability")]
async fn get_table_availability(
    path: web::Path<i32>,
    query: web::Query<AvailabilityQuery>,
    state: web::Data<AppState>,
) -> Result<impl Responder, APIError> {
    let table_id = path.into_inner();
    let query = query.into_inner();
    let occupancy = validate_time_slot("start", query.start, query.duration_minutes)?;
    let has_conflict = web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        store
            .get_table(table_id)
            .map_err(|e| APIError::from(e).naming_missing("Table", table_id))?;
        Ok(store.has_conflict(table_id, &occupancy)?)
    })
    .await??;

    Ok(web::Json(table_booking_api_types::Availability {
        table_id,
        start: occupancy.begin,
        end: occupancy.end,
        available: !has_conflict,
    }))
}
