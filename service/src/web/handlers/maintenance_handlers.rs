// service/src/web/handlers/maintenance_handlers.rs

//! Test-support endpoints. Only routed when `ENABLE_TEST_ROUTES=true`.

use actix_web::{web, HttpResponse};
use tracing::{instrument, warn};

use crate::errors::AppError;
use crate::state::AppState;

#[instrument(name = "handler::clear_table", skip(app_state))]
pub async fn clear_table_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let deleted = app_state.manager.clear_all().await?;
  warn!("Cleared product table via test route ({} rows).", deleted);
  Ok(HttpResponse::NoContent().finish())
}
