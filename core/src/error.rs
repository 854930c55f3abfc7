// product_catalog/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

/// Failures raised by a `ProductStore` backend.
///
/// Nothing here is retried. The resource manager wraps these in
/// `CatalogError::Store` and the HTTP layer turns them into a 500.
#[derive(Debug, Error)]
pub enum StoreError {
  #[error("Store operation '{operation}' failed. Source: {source}")]
  Backend {
    operation: &'static str,
    #[source]
    source: AnyhowError,
  },

  #[error("Stored item for product '{product_id}' is malformed: {message}")]
  Corrupt { product_id: String, message: String },
}

impl StoreError {
  pub fn backend(operation: &'static str, source: impl Into<AnyhowError>) -> Self {
    StoreError::Backend {
      operation,
      source: source.into(),
    }
  }

  pub fn corrupt(product_id: impl Into<String>, message: impl Into<String>) -> Self {
    StoreError::Corrupt {
      product_id: product_id.into(),
      message: message.into(),
    }
  }
}

/// Domain-level outcome of a failed `ProductManager` operation.
#[derive(Debug, Error)]
pub enum CatalogError {
  #[error("Product not found: {product_id}")]
  NotFound { product_id: String },

  #[error("Product already exists: {product_id}")]
  Conflict { product_id: String },

  #[error("Invalid argument: {0}")]
  InvalidArgument(String),

  #[error("Store error: {0}")]
  Store(#[from] StoreError),
}

impl CatalogError {
  pub fn not_found(product_id: impl Into<String>) -> Self {
    CatalogError::NotFound {
      product_id: product_id.into(),
    }
  }

  pub fn conflict(product_id: impl Into<String>) -> Self {
    CatalogError::Conflict {
      product_id: product_id.into(),
    }
  }
}

pub type StoreResult<T, E = StoreError> = std::result::Result<T, E>;

pub type CatalogResult<T, E = CatalogError> = std::result::Result<T, E>;
