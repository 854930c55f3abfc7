// tests/common/mod.rs
#![allow(dead_code)] // Not every test binary uses every helper

use async_trait::async_trait;
use once_cell::sync::Lazy;
use product_catalog::{
  FieldUpdate, InMemoryProductStore, NewProduct, Product, ProductManager, ProductStore, StoreError, StoreResult,
  WriteOutcome,
};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};
use tracing::Level;

// --- Helper for Tracing Setup (call once per test run if needed) ---
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

pub fn dec(s: &str) -> Decimal {
  Decimal::from_str(s).expect("valid decimal literal")
}

// --- Fixtures ---
pub fn product_1() -> NewProduct {
  NewProduct::new("Prod1", dec("10")).with_id("p1").with_description("Desc1")
}

pub fn product_2() -> NewProduct {
  NewProduct::new("Prod2", dec("20")).with_id("p2").with_description("Desc2")
}

pub fn memory_manager() -> (ProductManager, InMemoryProductStore) {
  let store = InMemoryProductStore::new();
  let manager = ProductManager::new(Arc::new(store.clone()));
  (manager, store)
}

// --- Store wrappers for fault and race injection ---

/// Fails every call with a backend error.
#[derive(Debug, Default)]
pub struct UnavailableStore;

fn unavailable(operation: &'static str) -> StoreError {
  StoreError::backend(operation, anyhow::anyhow!("connection refused"))
}

#[async_trait]
impl ProductStore for UnavailableStore {
  async fn get(&self, _product_id: &str, _consistent: bool) -> StoreResult<Option<Product>> {
    Err(unavailable("get_item"))
  }
  async fn insert(&self, _product: &Product) -> StoreResult<WriteOutcome> {
    Err(unavailable("put_item"))
  }
  async fn scan(&self, _consistent: bool) -> StoreResult<Vec<Product>> {
    Err(unavailable("scan"))
  }
  async fn update(&self, _product_id: &str, _updates: &[FieldUpdate]) -> StoreResult<WriteOutcome> {
    Err(unavailable("update_item"))
  }
  async fn delete(&self, _product_id: &str) -> StoreResult<WriteOutcome> {
    Err(unavailable("delete_item"))
  }
}

/// Wraps an in-memory store and deletes the target row right after the first
/// existence check, simulating a concurrent delete.
#[derive(Debug, Default)]
pub struct VanishingStore {
  pub inner: InMemoryProductStore,
  pub gets: AtomicUsize,
}

#[async_trait]
impl ProductStore for VanishingStore {
  async fn get(&self, product_id: &str, consistent: bool) -> StoreResult<Option<Product>> {
    let found = self.inner.get(product_id, consistent).await?;
    if self.gets.fetch_add(1, Ordering::SeqCst) == 0 {
      self.inner.delete(product_id).await?;
    }
    Ok(found)
  }
  async fn insert(&self, product: &Product) -> StoreResult<WriteOutcome> {
    self.inner.insert(product).await
  }
  async fn scan(&self, consistent: bool) -> StoreResult<Vec<Product>> {
    self.inner.scan(consistent).await
  }
  async fn update(&self, product_id: &str, updates: &[FieldUpdate]) -> StoreResult<WriteOutcome> {
    self.inner.update(product_id, updates).await
  }
  async fn delete(&self, product_id: &str) -> StoreResult<WriteOutcome> {
    self.inner.delete(product_id).await
  }
}
