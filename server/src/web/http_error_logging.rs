use crate::web::api::APIError;
use log::{error, warn};

pub async fn error_logging_middleware<B: actix_web::body::MessageBody>(
    req: actix_web::dev::ServiceRequest,
    next: actix_web::middleware::Next<B>,
) -> Result<actix_web::dev::ServiceResponse<B>, actix_web::Error> {
    let response = next.call(req).await?;

    if let Some(error) = response.response().error() {
        if let Some(api_error) = error.as_error::<APIError>() {
            match api_error {
                APIError::ReservationConflict { raced } => {
                    warn!(
                        "HTTP {} reservation conflict at <{}>. Client: <{}>{}",
                        response.response().status(),
                        response.request().uri(),
                        response
                            .request()
                            .connection_info()
                            .realip_remote_addr()
                            .unwrap_or("unknown"),
                        if *raced {
                            ". Rejected by database constraint after concurrent insert."
                        } else {
                            ""
                        }
                    );
                }
                APIError::TableInUse(table_id) => {
                    warn!(
                        "HTTP {} refused to delete table {}, which still has reservations",
                        response.response().status(),
                        table_id
                    );
                }
                APIError::WriteRejected(e) => {
                    warn!(
                        "HTTP {} write rejected at <{}>: {}",
                        response.response().status(),
                        response.request().uri(),
                        e
                    );
                }
                APIError::TransactionConflict => {
                    warn!(
                        "HTTP {} transaction conflict at <{}>",
                        response.response().status(),
                        response.request().uri()
                    );
                }
                APIError::NotExisting(_)
                | APIError::InvalidJson(_)
                | APIError::InvalidData(_) => {}
                APIError::InternalError(e) => {
                    error!(
                        "HTTP {} internal server error at <{}>: {}",
                        response.response().status(),
                        response.request().uri(),
                        e
                    );
                }
            }
        } else {
            error!(
                "HTTP {} unexpected error at <{}>: {:?}",
                response.response().status(),
                response.request().uri(),
                error
            );
        }
    }
    Ok(response)
}
