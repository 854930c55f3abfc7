//! DynamoDB product store
//!
//! Provides `DynamoProductStore`, which implements `ProductStore` on a single
//! DynamoDB table keyed by `product_id`. Existence conditions are enforced by the
//! service through condition expressions, never by read-then-write.

pub mod schema;

use anyhow::anyhow;
use async_trait::async_trait;
use aws_sdk_dynamodb::client::Waiters;
use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::types::{
  AttributeDefinition, AttributeValue, BillingMode, KeySchemaElement, KeyType, ScalarAttributeType,
};
use aws_sdk_dynamodb::Client;
use aws_smithy_types::error::display::DisplayErrorContext;
use aws_smithy_types::timeout::TimeoutConfig;
use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use schema::*;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::error::{StoreError, StoreResult};
use crate::model::{parse_exact_decimal, FieldUpdate, Product};
use crate::store::{ProductStore, WriteOutcome};

/// How long `ensure_table` waits for a freshly created table to become active.
const TABLE_ACTIVE_TIMEOUT: Duration = Duration::from_secs(60);

/// DynamoDB store configuration
#[derive(Debug, Clone)]
pub struct DynamoConfig {
  /// DynamoDB table name
  pub table_name: String,
  /// AWS region (optional, uses SDK default if not specified)
  pub region: Option<String>,
  /// Optional endpoint override (e.g. DynamoDB Local)
  pub endpoint: Option<String>,
  /// Timeout in milliseconds
  pub timeout_ms: Option<u64>,
}

impl Default for DynamoConfig {
  fn default() -> Self {
    Self {
      table_name: DEFAULT_TABLE_NAME.to_string(),
      region: None,
      endpoint: None,
      timeout_ms: None,
    }
  }
}

/// DynamoDB-backed product store
#[derive(Clone)]
pub struct DynamoProductStore {
  client: Client,
  table_name: String,
}

impl std::fmt::Debug for DynamoProductStore {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("DynamoProductStore")
      .field("table_name", &self.table_name)
      .finish()
  }
}

impl DynamoProductStore {
  /// Loads the shared AWS configuration from the environment and builds a store.
  pub async fn connect(config: &DynamoConfig) -> StoreResult<Self> {
    let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest()).load().await;
    Ok(Self::from_sdk_config(&sdk_config, config))
  }

  /// Builds a store by inheriting from `SdkConfig` (HTTP client, credentials, retry
  /// config) and applying the overrides in `config`.
  pub fn from_sdk_config(sdk_config: &aws_config::SdkConfig, config: &DynamoConfig) -> Self {
    let mut builder = aws_sdk_dynamodb::config::Builder::from(sdk_config);

    if let Some(region) = &config.region {
      builder = builder.region(aws_sdk_dynamodb::config::Region::new(region.clone()));
    } else if config.endpoint.is_some() && sdk_config.region().is_none() {
      builder = builder.region(aws_sdk_dynamodb::config::Region::new(FALLBACK_REGION));
    }

    if let Some(endpoint) = &config.endpoint {
      builder = builder.endpoint_url(endpoint.clone());
    }

    if let Some(timeout_ms) = config.timeout_ms {
      let timeout_config = TimeoutConfig::builder()
        .operation_timeout(Duration::from_millis(timeout_ms))
        .build();
      builder = builder.timeout_config(timeout_config);
    }

    info!(
      table = %config.table_name,
      endpoint = config.endpoint.as_deref().unwrap_or("<sdk default>"),
      "DynamoDB product store configured"
    );

    Self::from_client(Client::from_conf(builder.build()), config.table_name.clone())
  }

  pub fn from_client(client: Client, table_name: impl Into<String>) -> Self {
    Self {
      client,
      table_name: table_name.into(),
    }
  }

  pub fn table_name(&self) -> &str {
    &self.table_name
  }

  /// Creates the table (hash key `product_id`, on-demand billing) if it does not
  /// exist, then waits for it to become active.
  #[instrument(skip(self), fields(table = %self.table_name))]
  pub async fn ensure_table(&self) -> StoreResult<()> {
    match self.client.describe_table().table_name(&self.table_name).send().await {
      Ok(_) => {
        debug!("Table already exists.");
        return Ok(());
      }
      Err(e) if is_resource_not_found(&e) => {}
      Err(e) => return Err(sdk_failure("describe_table", e)),
    }

    info!("Table missing, creating it.");
    let key_schema = KeySchemaElement::builder()
      .attribute_name(ATTR_PRODUCT_ID)
      .key_type(KeyType::Hash)
      .build()
      .map_err(|e| StoreError::backend("create_table", e))?;
    let key_definition = AttributeDefinition::builder()
      .attribute_name(ATTR_PRODUCT_ID)
      .attribute_type(ScalarAttributeType::S)
      .build()
      .map_err(|e| StoreError::backend("create_table", e))?;

    let result = self
      .client
      .create_table()
      .table_name(&self.table_name)
      .key_schema(key_schema)
      .attribute_definitions(key_definition)
      .billing_mode(BillingMode::PayPerRequest)
      .send()
      .await;

    match result {
      Ok(_) => {}
      Err(e) if is_resource_in_use(&e) => {
        // Someone else created it between our describe and create.
        debug!("Table creation raced with another creator.");
      }
      Err(e) => return Err(sdk_failure("create_table", e)),
    }

    self
      .client
      .wait_until_table_exists()
      .table_name(&self.table_name)
      .wait(TABLE_ACTIVE_TIMEOUT)
      .await
      .map_err(|e| StoreError::backend("wait_until_table_exists", anyhow!("{}", DisplayErrorContext(&e))))?;

    info!("Table is active.");
    Ok(())
  }
}

#[async_trait]
impl ProductStore for DynamoProductStore {
  #[instrument(level = "debug", skip(self), fields(table = %self.table_name))]
  async fn get(&self, product_id: &str, consistent: bool) -> StoreResult<Option<Product>> {
    let response = self
      .client
      .get_item()
      .table_name(&self.table_name)
      .key(ATTR_PRODUCT_ID, AttributeValue::S(product_id.to_string()))
      .consistent_read(consistent)
      .send()
      .await
      .map_err(|e| sdk_failure("get_item", e))?;

    response.item().map(item_to_product).transpose()
  }

  #[instrument(level = "debug", skip(self, product), fields(table = %self.table_name, product_id = %product.product_id))]
  async fn insert(&self, product: &Product) -> StoreResult<WriteOutcome> {
    // PutItem with condition_expression atomically checks-and-creates.
    let result = self
      .client
      .put_item()
      .table_name(&self.table_name)
      .set_item(Some(product_to_item(product)))
      .condition_expression(format!("attribute_not_exists({PK_PLACEHOLDER})"))
      .expression_attribute_names(PK_PLACEHOLDER, ATTR_PRODUCT_ID)
      .send()
      .await;

    match result {
      Ok(_) => Ok(WriteOutcome::Applied),
      Err(e) if is_conditional_check_failed(&e) => Ok(WriteOutcome::ConditionFailed),
      Err(e) => Err(sdk_failure("put_item", e)),
    }
  }

  #[instrument(level = "debug", skip(self), fields(table = %self.table_name))]
  async fn scan(&self, consistent: bool) -> StoreResult<Vec<Product>> {
    let mut products = Vec::new();
    let mut last_evaluated_key = None;
    let mut pages = 0usize;

    loop {
      let mut request = self
        .client
        .scan()
        .table_name(&self.table_name)
        .consistent_read(consistent);

      if let Some(key) = last_evaluated_key.take() {
        request = request.set_exclusive_start_key(Some(key));
      }

      let response = request.send().await.map_err(|e| sdk_failure("scan", e))?;
      pages += 1;

      for item in response.items() {
        products.push(item_to_product(item)?);
      }

      match response.last_evaluated_key() {
        Some(key) if !key.is_empty() => {
          last_evaluated_key = Some(key.clone());
        }
        _ => break,
      }
    }

    debug!(pages, items = products.len(), "Scan finished.");
    Ok(products)
  }

  #[instrument(level = "debug", skip(self, updates), fields(table = %self.table_name, fields = updates.len()))]
  async fn update(&self, product_id: &str, updates: &[FieldUpdate]) -> StoreResult<WriteOutcome> {
    if updates.is_empty() {
      return Err(StoreError::backend("update_item", anyhow!("no attributes to update")));
    }

    let update = build_update_expression(updates);
    let values = if update.values.is_empty() {
      None
    } else {
      Some(update.values)
    };

    let result = self
      .client
      .update_item()
      .table_name(&self.table_name)
      .key(ATTR_PRODUCT_ID, AttributeValue::S(product_id.to_string()))
      .update_expression(update.expression)
      .condition_expression(format!("attribute_exists({PK_PLACEHOLDER})"))
      .set_expression_attribute_names(Some(update.names))
      .set_expression_attribute_values(values)
      .send()
      .await;

    match result {
      Ok(_) => Ok(WriteOutcome::Applied),
      Err(e) if is_conditional_check_failed(&e) => Ok(WriteOutcome::ConditionFailed),
      Err(e) => Err(sdk_failure("update_item", e)),
    }
  }

  #[instrument(level = "debug", skip(self), fields(table = %self.table_name))]
  async fn delete(&self, product_id: &str) -> StoreResult<WriteOutcome> {
    let result = self
      .client
      .delete_item()
      .table_name(&self.table_name)
      .key(ATTR_PRODUCT_ID, AttributeValue::S(product_id.to_string()))
      .condition_expression(format!("attribute_exists({PK_PLACEHOLDER})"))
      .expression_attribute_names(PK_PLACEHOLDER, ATTR_PRODUCT_ID)
      .send()
      .await;

    match result {
      Ok(_) => Ok(WriteOutcome::Applied),
      Err(e) if is_conditional_check_failed(&e) => Ok(WriteOutcome::ConditionFailed),
      Err(e) => Err(sdk_failure("delete_item", e)),
    }
  }
}

// ---------------------------------------------------------------------------
// Item codec
// ---------------------------------------------------------------------------

pub(crate) fn product_to_item(product: &Product) -> HashMap<String, AttributeValue> {
  let mut item = HashMap::with_capacity(5);
  item.insert(ATTR_PRODUCT_ID.to_string(), AttributeValue::S(product.product_id.clone()));
  item.insert(ATTR_NAME.to_string(), AttributeValue::S(product.name.clone()));
  if let Some(description) = &product.description {
    item.insert(ATTR_DESCRIPTION.to_string(), AttributeValue::S(description.clone()));
  }
  item.insert(ATTR_PRICE.to_string(), price_attribute(&product.price));
  item.insert(
    ATTR_CREATED_AT.to_string(),
    AttributeValue::S(format_timestamp(&product.created_at)),
  );
  item
}

pub(crate) fn item_to_product(item: &HashMap<String, AttributeValue>) -> StoreResult<Product> {
  let product_id = item
    .get(ATTR_PRODUCT_ID)
    .and_then(|v| v.as_s().ok())
    .cloned()
    .ok_or_else(|| StoreError::corrupt("<unknown>", "missing string attribute 'product_id'"))?;

  let string_attr = |name: &str| -> StoreResult<String> {
    item
      .get(name)
      .and_then(|v| v.as_s().ok())
      .cloned()
      .ok_or_else(|| StoreError::corrupt(&product_id, format!("missing string attribute '{name}'")))
  };

  let name = string_attr(ATTR_NAME)?;

  let description = match item.get(ATTR_DESCRIPTION) {
    None | Some(AttributeValue::Null(_)) => None,
    Some(AttributeValue::S(s)) => Some(s.clone()),
    Some(other) => {
      return Err(StoreError::corrupt(
        &product_id,
        format!("unexpected description attribute {other:?}"),
      ))
    }
  };

  // Rows written before prices moved to S attributes still carry N.
  let price_text = match item.get(ATTR_PRICE) {
    Some(AttributeValue::S(text)) | Some(AttributeValue::N(text)) => text,
    _ => return Err(StoreError::corrupt(&product_id, "missing attribute 'price'")),
  };
  let price = parse_exact_decimal(price_text).map_err(|e| StoreError::corrupt(&product_id, e))?;

  let created_at_text = string_attr(ATTR_CREATED_AT)?;
  let created_at = DateTime::parse_from_rfc3339(&created_at_text)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| StoreError::corrupt(&product_id, format!("bad created_at '{created_at_text}': {e}")))?;

  Ok(Product {
    product_id,
    name,
    description,
    price,
    created_at,
  })
}

/// Prices are kept as S text: DynamoDB normalizes N values and would drop the
/// trailing zeros of "10.50".
fn price_attribute(price: &Decimal) -> AttributeValue {
  AttributeValue::S(price.to_string())
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
  ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

// ---------------------------------------------------------------------------
// Update expressions
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub(crate) struct UpdateExpression {
  pub expression: String,
  pub names: HashMap<String, String>,
  pub values: HashMap<String, AttributeValue>,
}

/// `SET` for every provided value, `REMOVE` for a cleared description. Always
/// includes the `#pk` name used by the existence condition.
pub(crate) fn build_update_expression(updates: &[FieldUpdate]) -> UpdateExpression {
  let mut set_parts = Vec::new();
  let mut remove_parts = Vec::new();
  let mut names = HashMap::new();
  let mut values = HashMap::new();

  names.insert(PK_PLACEHOLDER.to_string(), ATTR_PRODUCT_ID.to_string());

  for update in updates {
    let (attribute, value) = match update {
      FieldUpdate::Name(name) => (ATTR_NAME, Some(AttributeValue::S(name.clone()))),
      FieldUpdate::Description(Some(description)) => {
        (ATTR_DESCRIPTION, Some(AttributeValue::S(description.clone())))
      }
      FieldUpdate::Description(None) => (ATTR_DESCRIPTION, None),
      FieldUpdate::Price(price) => (ATTR_PRICE, Some(price_attribute(price))),
    };

    // "name" is a DynamoDB reserved word, so every attribute goes through a placeholder.
    let name_placeholder = format!("#{attribute}");
    names.insert(name_placeholder.clone(), attribute.to_string());

    match value {
      Some(value) => {
        let value_placeholder = format!(":{attribute}");
        set_parts.push(format!("{name_placeholder} = {value_placeholder}"));
        values.insert(value_placeholder, value);
      }
      None => remove_parts.push(name_placeholder),
    }
  }

  let mut expression = String::new();
  if !set_parts.is_empty() {
    expression.push_str("SET ");
    expression.push_str(&set_parts.join(", "));
  }
  if !remove_parts.is_empty() {
    if !expression.is_empty() {
      expression.push(' ');
    }
    expression.push_str("REMOVE ");
    expression.push_str(&remove_parts.join(", "));
  }

  UpdateExpression {
    expression,
    names,
    values,
  }
}

// ---------------------------------------------------------------------------
// SDK error helpers
// ---------------------------------------------------------------------------

fn sdk_failure<E, R>(operation: &'static str, err: SdkError<E, R>) -> StoreError
where
  E: std::error::Error + 'static,
  R: std::fmt::Debug,
{
  warn!(operation, error = %DisplayErrorContext(&err), "DynamoDB call failed");
  StoreError::backend(operation, anyhow!("{}", DisplayErrorContext(&err)))
}

/// Check if an SDK error is a conditional check failure on any of the
/// conditional operations this store issues.
fn is_conditional_check_failed<E, R>(err: &SdkError<E, R>) -> bool
where
  E: aws_sdk_dynamodb::error::ProvideErrorMetadata,
{
  match err {
    SdkError::ServiceError(service_err) => {
      service_err.err().code() == Some("ConditionalCheckFailedException")
    }
    _ => false,
  }
}

fn is_resource_not_found(
  err: &SdkError<aws_sdk_dynamodb::operation::describe_table::DescribeTableError, impl std::fmt::Debug>,
) -> bool {
  use aws_sdk_dynamodb::operation::describe_table::DescribeTableError;

  match err {
    SdkError::ServiceError(service_err) => {
      matches!(service_err.err(), DescribeTableError::ResourceNotFoundException(_))
    }
    _ => false,
  }
}

fn is_resource_in_use(
  err: &SdkError<aws_sdk_dynamodb::operation::create_table::CreateTableError, impl std::fmt::Debug>,
) -> bool {
  use aws_sdk_dynamodb::operation::create_table::CreateTableError;

  match err {
    SdkError::ServiceError(service_err) => {
      matches!(service_err.err(), CreateTableError::ResourceInUseException(_))
    }
    _ => false,
  }
}
