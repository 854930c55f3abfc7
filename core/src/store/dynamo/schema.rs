//! DynamoDB table layout for products.
//!
//! ```text
//! Table: products (configurable)
//!
//! Primary Key:
//!   - product_id (String, Partition Key)
//!
//! Attributes:
//!   - name: String
//!   - description: String (omitted when the product has no description)
//!   - price: Number (decimal text, never a float)
//!   - created_at: String (RFC 3339, UTC)
//! ```

/// Partition key.
pub const ATTR_PRODUCT_ID: &str = "product_id";

pub const ATTR_NAME: &str = "name";

/// Legacy rows may carry `NULL` here instead of omitting it; both read back as `None`.
pub const ATTR_DESCRIPTION: &str = "description";

pub const ATTR_PRICE: &str = "price";

/// Write-once creation timestamp.
pub const ATTR_CREATED_AT: &str = "created_at";

/// Placeholder for the partition key in condition expressions.
pub const PK_PLACEHOLDER: &str = "#pk";

pub const DEFAULT_TABLE_NAME: &str = "products";

/// Region used against a custom endpoint when neither the environment nor the config
/// names one (DynamoDB Local accepts any region).
pub const FALLBACK_REGION: &str = "us-east-1";
