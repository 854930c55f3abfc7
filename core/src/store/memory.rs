// product_catalog/src/store/memory.rs
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{event, Level};

use crate::error::StoreResult;
use crate::model::{FieldUpdate, Product};
use crate::store::{ProductStore, WriteOutcome};

/// Process-local store backed by a `parking_lot::RwLock<HashMap>`.
///
/// Every operation is atomic with respect to the others, so the conditional
/// semantics match the DynamoDB backend. Lock guards are never held across an
/// `.await`. Cloning shares the same table.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProductStore {
  rows: Arc<RwLock<HashMap<String, Product>>>,
}

impl InMemoryProductStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.rows.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.rows.read().is_empty()
  }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
  async fn get(&self, product_id: &str, _consistent: bool) -> StoreResult<Option<Product>> {
    Ok(self.rows.read().get(product_id).cloned())
  }

  async fn insert(&self, product: &Product) -> StoreResult<WriteOutcome> {
    let mut rows = self.rows.write();
    if rows.contains_key(&product.product_id) {
      event!(Level::DEBUG, product_id = %product.product_id, "In-memory insert rejected: key exists.");
      return Ok(WriteOutcome::ConditionFailed);
    }
    rows.insert(product.product_id.clone(), product.clone());
    Ok(WriteOutcome::Applied)
  }

  async fn scan(&self, _consistent: bool) -> StoreResult<Vec<Product>> {
    Ok(self.rows.read().values().cloned().collect())
  }

  async fn update(&self, product_id: &str, updates: &[FieldUpdate]) -> StoreResult<WriteOutcome> {
    let mut rows = self.rows.write();
    let Some(product) = rows.get_mut(product_id) else {
      return Ok(WriteOutcome::ConditionFailed);
    };
    for update in updates {
      update.apply(product);
    }
    Ok(WriteOutcome::Applied)
  }

  async fn delete(&self, product_id: &str) -> StoreResult<WriteOutcome> {
    match self.rows.write().remove(product_id) {
      Some(_) => Ok(WriteOutcome::Applied),
      None => Ok(WriteOutcome::ConditionFailed),
    }
  }
}
