// service/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use product_catalog::CatalogError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Conflict: {0}")]
  Conflict(String),

  #[error("Invalid Argument: {0}")]
  InvalidArgument(String),

  /// The request body could not be decoded into the expected payload.
  #[error("Unprocessable Payload: {0}")]
  Payload(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Store Error: {source}")]
  Store {
    #[source]
    source: product_catalog::StoreError,
  },

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl From<CatalogError> for AppError {
  fn from(err: CatalogError) -> Self {
    match err {
      CatalogError::NotFound { .. } => AppError::NotFound("Product not found".to_string()),
      CatalogError::Conflict { .. } => AppError::Conflict("Product already exists".to_string()),
      CatalogError::InvalidArgument(m) => AppError::InvalidArgument(m),
      CatalogError::Store(source) => AppError::Store { source },
    }
  }
}

impl AppError {
  /// The client-facing `detail` string. Store and configuration internals stay in the logs.
  fn detail(&self) -> String {
    match self {
      AppError::NotFound(m) | AppError::Conflict(m) | AppError::InvalidArgument(m) | AppError::Payload(m) => {
        m.clone()
      }
      AppError::Config(_) => "Configuration issue".to_string(),
      AppError::Store { .. } => "Store operation failed".to_string(),
      AppError::Internal(_) => "An internal error occurred".to_string(),
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Conflict(_) => StatusCode::CONFLICT,
      AppError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
      AppError::Payload(_) => StatusCode::UNPROCESSABLE_ENTITY,
      AppError::Config(_) | AppError::Store { .. } | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    // Log the full error when it's turned into a response
    if status.is_server_error() {
      tracing::error!(application_error = %self, "Responding with error");
    } else {
      tracing::warn!(application_error = %self, "Responding with error");
    }
    HttpResponse::build(status).json(json!({ "detail": self.detail() }))
  }
}

// Define a Result type alias for the application
pub type Result<T, E = AppError> = std::result::Result<T, E>;
