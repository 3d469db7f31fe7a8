use crate::cli::database_migration::check_migration_state;
use crate::cli_error::CliError;
use crate::data_store::get_store_from_env;
use crate::setup::{get_listen_address_from_env, get_listen_port_from_env};
use actix_web::http::header::ContentType;
use actix_web::{get, middleware, web, App, HttpResponse, HttpServer, Responder};
use log::info;
use std::sync::Arc;

mod api;
mod http_error_logging;
mod util;

pub fn serve() -> Result<(), CliError> {
    check_migration_state()?;
    let state = AppState::new()?;
    let listen_address = get_listen_address_from_env()?;
    let listen_port = get_listen_port_from_env()?;
    info!(
        "Starting table booking service {} on {}:{}",
        crate::get_version(),
        listen_address,
        listen_port
    );
    actix_web::rt::System::new()
        .block_on(
            HttpServer::new(move || {
                App::new()
                    .service(welcome_page)
                    .configure(api::configure_app)
                    .app_data(web::Data::new(state.clone()))
                    .wrap(middleware::from_fn(
                        http_error_logging::error_logging_middleware,
                    ))
                    .wrap(middleware::Logger::default())
                    .wrap(middleware::NormalizePath::trim())
            })
            .bind((listen_address, listen_port))
            .map_err(CliError::BindError)?
            .run(),
        )
        .map_err(CliError::ServerError)
}

#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn crate::data_store::TableBookingStore>,
}

impl AppState {
    pub fn new() -> Result<Self, CliError> {
        Ok(Self {
            store: Arc::new(get_store_from_env()?),
        })
    }
}

const WELCOME_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>Table Booking</title></head>
<body>
<h1>Table Booking</h1>
<p>Restaurant table reservation service, version {version}.</p>
<ul>
<li><a href="/tables">/tables</a></li>
<li><a href="/reservations">/reservations</a></li>
</ul>
</body>
</html>
"#;

#[get("/")]
async fn welcome_page() -> impl Responder {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(WELCOME_PAGE.replace("{version}", crate::get_version()))
}
