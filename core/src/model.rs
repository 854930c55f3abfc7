// product_catalog/src/model.rs

//! The `Product` entity and the payloads that create and patch it.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::str::FromStr;

use crate::error::{CatalogError, CatalogResult};

/// A stored product. `product_id` and `created_at` never change after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
  pub product_id: String,
  pub name: String,
  pub description: Option<String>,
  /// Always emitted as a JSON string so no client parses it through a float.
  #[serde(serialize_with = "serialize_price")]
  pub price: Decimal,
  pub created_at: DateTime<Utc>,
}

fn serialize_price<S: Serializer>(price: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
  serializer.collect_str(price)
}

/// Parses decimal text without rounding. Plain and exponent notation are accepted;
/// anything that does not fit a `Decimal` exactly is an error.
pub(crate) fn parse_exact_decimal(text: &str) -> Result<Decimal, String> {
  let text = text.trim();
  let invalid = |reason: &dyn std::fmt::Display| format!("invalid price '{text}': {reason}");

  let Some(split) = text.find(|c: char| c == 'e' || c == 'E') else {
    return Decimal::from_str_exact(text).map_err(|e| invalid(&e));
  };

  let mantissa = Decimal::from_str_exact(&text[..split]).map_err(|e| invalid(&e))?;
  let exponent = i64::from_str(&text[split + 1..]).map_err(|e| invalid(&e))?;

  // Shift the exponent into the scale; a negative scale widens the integer digits.
  let scale = i64::from(mantissa.scale()) - exponent;
  let (digits, scale) = if scale >= 0 {
    (Some(mantissa.mantissa()), scale)
  } else {
    let factor = u32::try_from(-scale).ok().and_then(|power| 10i128.checked_pow(power));
    (factor.and_then(|factor| mantissa.mantissa().checked_mul(factor)), 0)
  };
  let digits = digits.ok_or_else(|| invalid(&"too large"))?;
  let scale = u32::try_from(scale).map_err(|_| invalid(&"too many fractional digits"))?;
  Decimal::try_from_i128_with_scale(digits, scale).map_err(|e| invalid(&e))
}

/// Reads the price from its JSON text so no digit is dropped on the way in.
fn price_from_json<E: serde::de::Error>(value: Value) -> Result<Decimal, E> {
  let text = match value {
    Value::Number(number) => number.to_string(),
    Value::String(text) => text,
    other => return Err(E::custom(format!("price must be a decimal number or string, got {other}"))),
  };
  parse_exact_decimal(&text).map_err(E::custom)
}

fn deserialize_price<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
  price_from_json(Value::deserialize(deserializer)?)
}

fn deserialize_price_patch<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Patch<Decimal>, D::Error> {
  match Value::deserialize(deserializer)? {
    Value::Null => Ok(Patch::Null),
    value => price_from_json(value).map(Patch::Value),
  }
}

/// Create payload. `product_id` and `created_at` are filled in by the manager when absent.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewProduct {
  #[serde(default)]
  pub product_id: Option<String>,
  pub name: String,
  #[serde(default)]
  pub description: Option<String>,
  #[serde(deserialize_with = "deserialize_price")]
  pub price: Decimal,
  #[serde(default)]
  pub created_at: Option<DateTime<Utc>>,
}

impl NewProduct {
  pub fn new(name: impl Into<String>, price: Decimal) -> Self {
    Self {
      product_id: None,
      name: name.into(),
      description: None,
      price,
      created_at: None,
    }
  }

  pub fn with_id(mut self, product_id: impl Into<String>) -> Self {
    self.product_id = Some(product_id.into());
    self
  }

  pub fn with_description(mut self, description: impl Into<String>) -> Self {
    self.description = Some(description.into());
    self
  }
}

/// A single field of a partial update, as it arrived on the wire.
///
/// Use with `#[serde(default)]`: an omitted key stays `Missing`, an explicit `null`
/// becomes `Null`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
  Missing,
  Null,
  Value(T),
}

impl<T> Patch<T> {
  pub fn is_missing(&self) -> bool {
    matches!(self, Patch::Missing)
  }
}

impl<T> Default for Patch<T> {
  fn default() -> Self {
    Patch::Missing
  }
}

impl<T> From<Option<T>> for Patch<T> {
  fn from(value: Option<T>) -> Self {
    match value {
      Some(v) => Patch::Value(v),
      None => Patch::Null,
    }
  }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
  T: Deserialize<'de>,
{
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    // Only reached when the key is present in the input.
    Option::<T>::deserialize(deserializer).map(Patch::from)
  }
}

/// Update payload. Keys other than these three are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProductPatch {
  #[serde(default)]
  pub name: Patch<String>,
  #[serde(default)]
  pub description: Patch<String>,
  #[serde(default, deserialize_with = "deserialize_price_patch")]
  pub price: Patch<Decimal>,
}

impl ProductPatch {
  pub fn name(mut self, name: impl Into<String>) -> Self {
    self.name = Patch::Value(name.into());
    self
  }

  pub fn description(mut self, description: Option<String>) -> Self {
    self.description = Patch::from(description);
    self
  }

  pub fn price(mut self, price: Decimal) -> Self {
    self.price = Patch::Value(price);
    self
  }

  /// Turns the provided fields into one `FieldUpdate` each, in a fixed order.
  ///
  /// Returns an empty vector when nothing was provided. `name` and `price` cannot be
  /// nulled; `description` can.
  pub fn into_updates(self) -> CatalogResult<Vec<FieldUpdate>> {
    let mut updates = Vec::with_capacity(3);

    match self.name {
      Patch::Missing => {}
      Patch::Null => return Err(CatalogError::InvalidArgument("name cannot be null".to_string())),
      Patch::Value(name) => updates.push(FieldUpdate::Name(name)),
    }
    match self.description {
      Patch::Missing => {}
      Patch::Null => updates.push(FieldUpdate::Description(None)),
      Patch::Value(description) => updates.push(FieldUpdate::Description(Some(description))),
    }
    match self.price {
      Patch::Missing => {}
      Patch::Null => return Err(CatalogError::InvalidArgument("price cannot be null".to_string())),
      Patch::Value(price) => updates.push(FieldUpdate::Price(price)),
    }

    Ok(updates)
  }
}

/// One "set" operation on a stored product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
  Name(String),
  /// `None` clears the description.
  Description(Option<String>),
  Price(Decimal),
}

impl FieldUpdate {
  pub fn field_name(&self) -> &'static str {
    match self {
      FieldUpdate::Name(_) => "name",
      FieldUpdate::Description(_) => "description",
      FieldUpdate::Price(_) => "price",
    }
  }

  pub fn apply(&self, product: &mut Product) {
    match self {
      FieldUpdate::Name(name) => product.name = name.clone(),
      FieldUpdate::Description(description) => product.description = description.clone(),
      FieldUpdate::Price(price) => product.price = *price,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
  }

  #[test]
  fn patch_distinguishes_missing_null_and_value() {
    let patch: ProductPatch = serde_json::from_str(r#"{"description": null, "price": "12.50"}"#).unwrap();
    assert_eq!(patch.name, Patch::Missing);
    assert_eq!(patch.description, Patch::Null);
    assert_eq!(patch.price, Patch::Value(dec("12.50")));
  }

  #[test]
  fn patch_ignores_unknown_fields() {
    let patch: ProductPatch = serde_json::from_str(r#"{"product_id": "x", "created_at": "whenever"}"#).unwrap();
    assert_eq!(patch, ProductPatch::default());
    assert!(patch.into_updates().unwrap().is_empty());
  }

  #[test]
  fn into_updates_keeps_only_provided_fields() {
    let updates = ProductPatch::default().name("Renamed").into_updates().unwrap();
    assert_eq!(updates, vec![FieldUpdate::Name("Renamed".to_string())]);

    let updates = ProductPatch::default()
      .description(None)
      .price(dec("3"))
      .into_updates()
      .unwrap();
    assert_eq!(updates, vec![FieldUpdate::Description(None), FieldUpdate::Price(dec("3"))]);
  }

  #[test]
  fn into_updates_rejects_null_required_fields() {
    let patch: ProductPatch = serde_json::from_str(r#"{"name": null}"#).unwrap();
    assert!(matches!(patch.into_updates(), Err(CatalogError::InvalidArgument(_))));

    let patch: ProductPatch = serde_json::from_str(r#"{"price": null, "name": "ok"}"#).unwrap();
    assert!(matches!(patch.into_updates(), Err(CatalogError::InvalidArgument(_))));
  }

  #[test]
  fn price_keeps_its_decimal_text() {
    let input: NewProduct =
      serde_json::from_str(r#"{"name": "n", "price": 0.1, "description": "d"}"#).unwrap();
    assert_eq!(input.price.to_string(), "0.1");

    let input: NewProduct = serde_json::from_str(r#"{"name": "n", "price": 10.50}"#).unwrap();
    assert_eq!(input.price.to_string(), "10.50");

    let input: NewProduct = serde_json::from_str(r#"{"name": "n", "price": "1234567890.123456789"}"#).unwrap();
    assert_eq!(input.price, dec("1234567890.123456789"));
    assert_eq!(input.product_id, None);
    assert_eq!(input.description, None);
  }

  #[test]
  fn price_beyond_decimal_precision_is_rejected_not_rounded() {
    let result = serde_json::from_str::<NewProduct>(r#"{"name": "n", "price": 0.123456789012345678901234567890123}"#);
    assert!(result.is_err(), "rounded to {:?}", result.map(|p| p.price.to_string()));

    let result = serde_json::from_str::<NewProduct>(r#"{"name": "n", "price": "0.123456789012345678901234567890123"}"#);
    assert!(result.is_err());

    let result = serde_json::from_str::<ProductPatch>(r#"{"price": 0.123456789012345678901234567890123}"#);
    assert!(result.is_err());

    // 28 fractional digits still fit exactly.
    let input: NewProduct =
      serde_json::from_str(r#"{"name": "n", "price": 0.1234567890123456789012345678}"#).unwrap();
    assert_eq!(input.price.to_string(), "0.1234567890123456789012345678");
  }

  #[test]
  fn price_rejects_non_numeric_json() {
    assert!(serde_json::from_str::<NewProduct>(r#"{"name": "n", "price": true}"#).is_err());
    assert!(serde_json::from_str::<NewProduct>(r#"{"name": "n", "price": null}"#).is_err());
    assert!(serde_json::from_str::<NewProduct>(r#"{"name": "n", "price": "ten"}"#).is_err());
  }

  #[test]
  fn exponent_prices_are_exact() {
    assert_eq!(parse_exact_decimal("1E+2"), Ok(Decimal::from(100)));
    assert_eq!(parse_exact_decimal("1.5e-3").map(|d| d.to_string()), Ok("0.0015".to_string()));
    assert_eq!(parse_exact_decimal("12.340"), Ok(dec("12.340")));
    assert!(parse_exact_decimal("1e-40").is_err());
    assert!(parse_exact_decimal("1e40").is_err());
  }

  #[test]
  fn product_serializes_price_as_string() {
    let product = Product {
      product_id: "p1".to_string(),
      name: "Prod1".to_string(),
      description: None,
      price: dec("10"),
      created_at: DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z").unwrap().with_timezone(&Utc),
    };
    let json = serde_json::to_value(&product).unwrap();
    assert_eq!(json["price"], serde_json::json!("10"));
    assert_eq!(json["description"], serde_json::Value::Null);
    assert_eq!(json["created_at"], serde_json::json!("2024-05-01T12:00:00Z"));
  }

  #[test]
  fn field_update_applies_to_product() {
    let mut product = Product {
      product_id: "p1".to_string(),
      name: "Prod1".to_string(),
      description: Some("Desc1".to_string()),
      price: dec("10"),
      created_at: Utc::now(),
    };
    FieldUpdate::Description(None).apply(&mut product);
    FieldUpdate::Price(dec("99.99")).apply(&mut product);
    assert_eq!(product.description, None);
    assert_eq!(product.price, dec("99.99"));
    assert_eq!(product.name, "Prod1");
  }
}
