use crate::data_store::models::NewReservation;
use crate::data_store::ReservationFilter;
use crate::web::api::{validate_time_slot, validate_timestamp, APIError};
use crate::web::util::deserialize_optional_timestamp;
use crate::web::AppState;
use actix_web::{delete, get, post, web, HttpResponse, Responder};
use log::info;
use serde::Deserialize;

#[derive(Deserialize, Default)]
struct ReservationFilterAsQuery {
    #[serde(default)]
    table_id: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    after: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    before: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<ReservationFilterAsQuery> for ReservationFilter {
    fn from(value: ReservationFilterAsQuery) -> Self {
        Self {
            table_id: value.table_id,
            after: value.after,
            before: value.before,
        }
    }
}

#[get("/reservations")]
async fn list_reservations(
    query: web::Query<ReservationFilterAsQuery>,
    state: web::Data<AppState>,
) -> Result<impl Responder, APIError> {
    let query = query.into_inner();
    for (field_name, timestamp) in [("after", &query.after), ("before", &query.before)] {
        if let Some(timestamp) = timestamp {
            validate_timestamp(field_name, timestamp)?;
        }
    }
    let filter: ReservationFilter = query.into();
    let reservations: Vec<table_booking_api_types::Reservation> =
        web::block(move || -> Result<_, APIError> {
            let mut store = state.store.get_facade()?;
            Ok(store.get_reservations(filter)?)
        })
        .await??
        .into_iter()
        .map(|r| r.into())
        .collect();

    Ok(web::Json(reservations))
}

#[get("/reservations/{reservation_id}")]
async fn get_reservation(
    path: web::Path<i32>,
    state: web::Data<AppState>,
) -> Result<impl Responder, APIError> {
    let reservation_id = path.into_inner();
    let reservation: table_booking_api_types::Reservation =
        web::block(move || -> Result<_, APIError> {
            let mut store = state.store.get_facade()?;
            store
                .get_reservation(reservation_id)
                .map_err(|e| APIError::from(e).naming_missing("Reservation", reservation_id))
        })
        .await??
        .into();

    Ok(web::Json(reservation))
}

#[post("/reservations")]
async fn create_reservation(
    data: web::Json<table_booking_api_types::NewReservation>,
    state: web::Data<AppState>,
) -> Result<impl Responder, APIError> {
    let reservation = data.into_inner();
    validate_time_slot(
        "reservation_time",
        reservation.reservation_time,
        reservation.duration_minutes,
    )?;
    let created = web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        Ok(store.create_reservation(NewReservation::from(reservation))?)
    })
    .await??;
    info!(
        "Created reservation {} of table {} for {} at {} ({} minutes)",
        created.id,
        created.table_id,
        created.customer_name,
        created.reservation_time,
        created.duration_minutes
    );

    Ok(HttpResponse::Created().json(table_booking_api_types::Reservation::from(created)))
}

#[delete("/reservations/{reservation_id}")]
async fn delete_reservation(
    path: web::Path<i32>,
    state: web::Data<AppState>,
) -> Result<impl Responder, APIError> {
    let reservation_id = path.into_inner();
    web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        store
            .delete_reservation(reservation_id)
            .map_err(|e| APIError::from(e).naming_missing("Reservation", reservation_id))
    })
    .await??;
    info!("Deleted reservation {}", reservation_id);

    Ok(web::Json(table_booking_api_types::DeletionConfirmation {
        message: "Reservation deleted successfully".to_owned(),
    }))
}
