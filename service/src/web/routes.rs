// service/src/web/routes.rs

use actix_web::{error::JsonPayloadError, web, HttpRequest, HttpResponse};
use serde::Serialize;

use crate::errors::AppError;
use crate::web::handlers::{maintenance_handlers, product_handlers};

#[derive(Serialize)]
struct HealthStatus {
  status: &'static str,
}

// Liveness only; it does not touch the store.
async fn health_check_handler() -> HttpResponse {
  HttpResponse::Ok().json(HealthStatus { status: "healthy" })
}

/// Maps body decoding failures (bad JSON, missing `name`/`price`, wrong types) to a 422.
pub fn json_config() -> web::JsonConfig {
  web::JsonConfig::default().error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
    AppError::Payload(err.to_string()).into()
  })
}

/// Registers every route on the Actix app. Paths are written without trailing
/// slashes; the app is expected to run behind `NormalizePath::trim()` so that
/// `/products/` and `/products` both match.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig, enable_test_routes: bool) {
  cfg
    .app_data(json_config())
    // Health Check Route
    .route("/health", web::get().to(health_check_handler))
    // Product Routes
    .service(
      web::scope("/products")
        .route("", web::post().to(product_handlers::create_product_handler))
        .route("", web::get().to(product_handlers::list_products_handler))
        .route("/{product_id}", web::get().to(product_handlers::get_product_handler))
        .route("/{product_id}", web::patch().to(product_handlers::update_product_handler))
        .route("/{product_id}", web::delete().to(product_handlers::delete_product_handler)),
    );

  if enable_test_routes {
    tracing::warn!("Test routes enabled: DELETE /test/clear-table is reachable.");
    cfg.route("/test/clear-table", web::delete().to(maintenance_handlers::clear_table_handler));
  }
}
