// service/src/state.rs
use crate::config::{AppConfig, StoreBackend};
use crate::errors::{AppError, Result};
use product_catalog::{DynamoProductStore, InMemoryProductStore, ProductManager, ProductStore};
use std::sync::Arc;

/// Everything a handler needs, built once at startup and shared via `web::Data`.
#[derive(Clone)]
pub struct AppState {
  pub manager: Arc<ProductManager>,
  pub config: Arc<AppConfig>, // Share loaded config
}

impl AppState {
  pub fn new(manager: ProductManager, config: AppConfig) -> Self {
    Self {
      manager: Arc::new(manager),
      config: Arc::new(config),
    }
  }

  /// Connects the configured store backend and wraps it in a `ProductManager`.
  pub async fn from_config(config: AppConfig) -> Result<Self> {
    let store: Arc<dyn ProductStore> = match config.store_backend {
      StoreBackend::DynamoDb => {
        let store = DynamoProductStore::connect(&config.dynamo)
          .await
          .map_err(|e| AppError::Config(format!("DynamoDB client setup failed: {}", e)))?;
        if config.create_table {
          store.ensure_table().await.map_err(|e| AppError::Store { source: e })?;
        }
        Arc::new(store)
      }
      StoreBackend::Memory => {
        tracing::warn!("Using the in-memory product store; data is lost on restart.");
        Arc::new(InMemoryProductStore::new())
      }
    };

    let manager = ProductManager::new(store).with_consistent_reads(config.consistent_reads);
    Ok(Self::new(manager, config))
  }
}
