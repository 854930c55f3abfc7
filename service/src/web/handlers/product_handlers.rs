// service/src/web/handlers/product_handlers.rs

use actix_web::{web, HttpResponse};
use product_catalog::{NewProduct, ProductPatch};
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::state::AppState;

#[instrument(
    name = "handler::create_product",
    skip(app_state, req_payload),
    fields(product_id = ?req_payload.product_id)
)]
pub async fn create_product_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<NewProduct>,
) -> Result<HttpResponse, AppError> {
  let product = app_state.manager.create(req_payload.into_inner()).await?;
  info!("Product {} created.", product.product_id);
  Ok(HttpResponse::Ok().json(product))
}

#[instrument(name = "handler::list_products", skip(app_state))]
pub async fn list_products_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let products = app_state.manager.list().await?;
  info!("Successfully fetched {} products.", products.len());
  Ok(HttpResponse::Ok().json(products))
}

#[instrument(name = "handler::get_product", skip(app_state, path), fields(product_id = %path.as_str()))]
pub async fn get_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  let product = app_state.manager.get(&product_id).await?;
  Ok(HttpResponse::Ok().json(product))
}

#[instrument(name = "handler::update_product", skip(app_state, path, req_payload), fields(product_id = %path.as_str()))]
pub async fn update_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
  req_payload: web::Json<ProductPatch>,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  let product = app_state
    .manager
    .update(&product_id, req_payload.into_inner())
    .await?;
  info!("Product {} updated.", product_id);
  Ok(HttpResponse::Ok().json(product))
}

#[instrument(name = "handler::delete_product", skip(app_state, path), fields(product_id = %path.as_str()))]
pub async fn delete_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  app_state.manager.delete(&product_id).await?;
  info!("Product {} deleted.", product_id);
  Ok(HttpResponse::NoContent().finish())
}
