// src/lib.rs

//! Product catalog: a resource manager for a single `Product` entity stored in a
//! single-table key-value store.
//!
//! The crate offers:
//!  - The `Product` model with exact decimal prices and write-once `created_at`.
//!  - Presence-aware partial updates (`ProductPatch` / `Patch<T>`), so "field omitted"
//!    and "field sent as null" stay distinguishable.
//!  - The `ProductStore` seam with a DynamoDB backend and an in-memory backend.
//!  - `ProductManager`, which enforces create-uniqueness through conditional writes and
//!    maps store outcomes to `CatalogError` kinds.

pub mod error;
pub mod manager;
pub mod model;
pub mod store;

// --- Re-exports for the Public API ---

pub use crate::error::{CatalogError, CatalogResult, StoreError, StoreResult};
pub use crate::manager::{ProductManager, MAX_PRODUCT_ID_BYTES};
pub use crate::model::{FieldUpdate, NewProduct, Patch, Product, ProductPatch};
pub use crate::store::dynamo::{DynamoConfig, DynamoProductStore};
pub use crate::store::memory::InMemoryProductStore;
pub use crate::store::{ProductStore, WriteOutcome};

/*
    Typical wiring:
    1. Build a store: `DynamoProductStore::connect(&config).await?` or `InMemoryProductStore::new()`.
    2. Wrap it: `ProductManager::new(Arc::new(store))`.
    3. Share the manager (it is stateless) across request handlers behind an `Arc`.
*/
