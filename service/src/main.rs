// service/src/main.rs

use actix_web::middleware::NormalizePath;
use actix_web::{web as actix_data, App, HttpServer}; // Renamed web to actix_data
use anyhow::Context;

use product_service::telemetry::{init_tracing, log_format_from_env};
use product_service::web::configure_app_routes;
use product_service::{AppConfig, AppState};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  dotenvy::dotenv().ok();
  init_tracing(log_format_from_env());

  tracing::info!("Starting product service...");

  let app_config = AppConfig::from_env().context("failed to load application configuration")?;
  let enable_test_routes = app_config.enable_test_routes;
  let server_address = app_config.bind_address();

  let app_state = AppState::from_config(app_config)
    .await
    .context("failed to initialize the product store")?;
  tracing::info!(
    backend = ?app_state.config.store_backend,
    table = %app_state.config.dynamo.table_name,
    "Product store ready."
  );

  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone())) // Share AppState with handlers
      .wrap(NormalizePath::trim())
      .wrap(tracing_actix_web::TracingLogger::default()) // Actix middleware for tracing requests
      .configure(|cfg| configure_app_routes(cfg, enable_test_routes))
  })
  .bind(&server_address)
  .with_context(|| format!("failed to bind {}", server_address))?
  .run()
  .await
  .context("HTTP server terminated with an error")?;

  tracing::info!("Product service stopped.");
  Ok(())
}
