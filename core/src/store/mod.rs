// product_catalog/src/store/mod.rs

//! The key-value store seam. A store is addressed by the single partition key
//! `product_id` and knows nothing about domain errors: "the key was (not) there" is
//! reported as a `WriteOutcome`, everything else as a `StoreError`.

pub mod dynamo;
pub mod memory;

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::model::{FieldUpdate, Product};

/// Result of a conditional write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
  Applied,
  /// The existence condition did not hold (key present on insert, absent on update/delete).
  ConditionFailed,
}

impl WriteOutcome {
  pub fn is_applied(self) -> bool {
    matches!(self, WriteOutcome::Applied)
  }
}

#[async_trait]
pub trait ProductStore: Send + Sync {
  /// Point read. `consistent` requests a strongly-consistent read where the backend
  /// distinguishes one.
  async fn get(&self, product_id: &str, consistent: bool) -> StoreResult<Option<Product>>;

  /// Writes the full record only if no row with the same `product_id` exists.
  async fn insert(&self, product: &Product) -> StoreResult<WriteOutcome>;

  /// Full-table scan, in backend order.
  async fn scan(&self, consistent: bool) -> StoreResult<Vec<Product>>;

  /// Applies every update in one write, only if the row exists.
  async fn update(&self, product_id: &str, updates: &[FieldUpdate]) -> StoreResult<WriteOutcome>;

  /// Removes the row, only if it exists.
  async fn delete(&self, product_id: &str) -> StoreResult<WriteOutcome>;
}
