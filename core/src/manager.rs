// product_catalog/src/manager.rs

//! `ProductManager`: the domain operations over products.
//!
//! The manager keeps no state of its own beyond the injected store handle, so one
//! instance can be shared by every request. Each operation maps store outcomes to a
//! `CatalogError` kind; transient store failures are passed through untouched.

use chrono::Utc;
use futures_util::{stream, StreamExt, TryStreamExt};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn, Span};
use uuid::Uuid;

use crate::error::{CatalogError, CatalogResult};
use crate::model::{NewProduct, Product, ProductPatch};
use crate::store::{ProductStore, WriteOutcome};

/// Upper bound on in-flight deletes during `clear_all`.
const CLEAR_CONCURRENCY: usize = 16;

/// Longest `product_id` a row can have. DynamoDB rejects larger partition keys
/// outright, so no such row can exist on any backend.
pub const MAX_PRODUCT_ID_BYTES: usize = 2048;

fn is_storable_id(product_id: &str) -> bool {
  product_id.len() <= MAX_PRODUCT_ID_BYTES
}

#[derive(Clone)]
pub struct ProductManager {
  store: Arc<dyn ProductStore>,
  consistent_reads: bool,
}

impl std::fmt::Debug for ProductManager {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ProductManager")
      .field("consistent_reads", &self.consistent_reads)
      .finish_non_exhaustive()
  }
}

impl ProductManager {
  pub fn new(store: Arc<dyn ProductStore>) -> Self {
    Self {
      store,
      consistent_reads: true,
    }
  }

  /// Selects strongly-consistent reads for `get` and `list`. Existence checks inside
  /// `update`/`delete` and the re-read after `update` are always consistent.
  pub fn with_consistent_reads(mut self, consistent_reads: bool) -> Self {
    self.consistent_reads = consistent_reads;
    self
  }

  pub fn store(&self) -> &Arc<dyn ProductStore> {
    &self.store
  }

  /// Creates a product, generating `product_id` and `created_at` when absent.
  ///
  /// Uniqueness is enforced by the store's conditional insert, so two concurrent
  /// creates of the same id cannot both succeed.
  #[instrument(name = "catalog::create", skip(self, input), fields(product_id = tracing::field::Empty), err(Display))]
  pub async fn create(&self, input: NewProduct) -> CatalogResult<Product> {
    let product_id = match input.product_id {
      Some(id) if id.is_empty() => {
        return Err(CatalogError::InvalidArgument("product_id cannot be empty".to_string()));
      }
      Some(id) if !is_storable_id(&id) => {
        return Err(CatalogError::InvalidArgument(format!(
          "product_id cannot exceed {MAX_PRODUCT_ID_BYTES} bytes"
        )));
      }
      Some(id) => id,
      None => Uuid::new_v4().to_string(),
    };
    Span::current().record("product_id", product_id.as_str());

    let product = Product {
      product_id,
      name: input.name,
      description: input.description,
      price: input.price,
      created_at: input.created_at.unwrap_or_else(Utc::now),
    };

    match self.store.insert(&product).await? {
      WriteOutcome::Applied => {
        info!("Product created.");
        Ok(product)
      }
      WriteOutcome::ConditionFailed => {
        warn!("Product already exists, create rejected.");
        Err(CatalogError::conflict(product.product_id))
      }
    }
  }

  /// Every product in the table, in whatever order the backend scans them.
  #[instrument(name = "catalog::list", skip(self), err(Display))]
  pub async fn list(&self) -> CatalogResult<Vec<Product>> {
    let products = self.store.scan(self.consistent_reads).await?;
    debug!(count = products.len(), "Listed products.");
    Ok(products)
  }

  #[instrument(name = "catalog::get", skip(self), err(Display))]
  pub async fn get(&self, product_id: &str) -> CatalogResult<Product> {
    if !is_storable_id(product_id) {
      return Err(CatalogError::not_found(product_id));
    }
    self
      .store
      .get(product_id, self.consistent_reads)
      .await?
      .ok_or_else(|| CatalogError::not_found(product_id))
  }

  /// Applies only the fields present in `patch` and returns the freshly re-read row.
  #[instrument(name = "catalog::update", skip(self, patch), err(Display))]
  pub async fn update(&self, product_id: &str, patch: ProductPatch) -> CatalogResult<Product> {
    if !is_storable_id(product_id) || self.store.get(product_id, true).await?.is_none() {
      return Err(CatalogError::not_found(product_id));
    }

    let updates = patch.into_updates()?;
    if updates.is_empty() {
      return Err(CatalogError::InvalidArgument("No fields to update".to_string()));
    }
    debug!(
      fields = ?updates.iter().map(|u| u.field_name()).collect::<Vec<_>>(),
      "Applying partial update."
    );

    if let WriteOutcome::ConditionFailed = self.store.update(product_id, &updates).await? {
      // Deleted between the existence check and the write.
      warn!("Product vanished before the update was applied.");
      return Err(CatalogError::not_found(product_id));
    }

    let updated = self
      .store
      .get(product_id, true)
      .await?
      .ok_or_else(|| CatalogError::not_found(product_id))?;
    info!("Product updated.");
    Ok(updated)
  }

  #[instrument(name = "catalog::delete", skip(self), err(Display))]
  pub async fn delete(&self, product_id: &str) -> CatalogResult<()> {
    if !is_storable_id(product_id) || self.store.get(product_id, true).await?.is_none() {
      return Err(CatalogError::not_found(product_id));
    }

    match self.store.delete(product_id).await? {
      WriteOutcome::Applied => {
        info!("Product deleted.");
        Ok(())
      }
      WriteOutcome::ConditionFailed => Err(CatalogError::not_found(product_id)),
    }
  }

  /// Deletes every row. Maintenance only; returns how many rows this call removed.
  #[instrument(name = "catalog::clear_all", skip(self), err(Display))]
  pub async fn clear_all(&self) -> CatalogResult<usize> {
    let products = self.store.scan(true).await?;
    let store = &self.store;

    let deleted = stream::iter(products.iter().map(|p| store.delete(&p.product_id)))
      .buffer_unordered(CLEAR_CONCURRENCY)
      .try_fold(0usize, |count, outcome| async move { Ok(count + usize::from(outcome.is_applied())) })
      .await?;

    warn!(scanned = products.len(), deleted, "Product table cleared.");
    Ok(deleted)
  }
}
