// service/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use product_catalog::DynamoConfig;
use std::env;
use std::str::FromStr;

const DEFAULT_ENDPOINT_URL: &str = "http://dynamodb-local:8000";
const DEFAULT_TABLE_NAME: &str = "products";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
  DynamoDb,
  Memory,
}

impl FromStr for StoreBackend {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self> {
    match s.to_ascii_lowercase().as_str() {
      "dynamodb" | "dynamo" => Ok(StoreBackend::DynamoDb),
      "memory" | "in-memory" => Ok(StoreBackend::Memory),
      other => Err(AppError::Config(format!(
        "Invalid STORE_BACKEND '{}': expected 'dynamodb' or 'memory'",
        other
      ))),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
  Text,
  Json,
}

impl FromStr for LogFormat {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self> {
    match s.to_ascii_lowercase().as_str() {
      "text" | "pretty" => Ok(LogFormat::Text),
      "json" => Ok(LogFormat::Json),
      other => Err(AppError::Config(format!("Invalid LOG_FORMAT '{}': expected 'text' or 'json'", other))),
    }
  }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,

  pub store_backend: StoreBackend,
  pub dynamo: DynamoConfig,
  /// Create the table at startup when it is missing (local and test endpoints).
  pub create_table: bool,

  /// Strongly-consistent reads for GET endpoints.
  pub consistent_reads: bool,

  /// Mounts `DELETE /test/clear-table`. Never enable in production.
  pub enable_test_routes: bool,

  pub log_format: LogFormat,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      server_host: "127.0.0.1".to_string(),
      server_port: 8080,
      store_backend: StoreBackend::DynamoDb,
      dynamo: DynamoConfig {
        table_name: DEFAULT_TABLE_NAME.to_string(),
        endpoint: Some(DEFAULT_ENDPOINT_URL.to_string()),
        ..DynamoConfig::default()
      },
      create_table: false,
      consistent_reads: true,
      enable_test_routes: false,
      log_format: LogFormat::Text,
    }
  }
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present
    Self::from_lookup(|name| env::var(name).ok())
  }

  /// Builds the config from any variable source; `from_env` passes the process environment.
  pub fn from_lookup<F>(lookup: F) -> Result<Self>
  where
    F: Fn(&str) -> Option<String>,
  {
    let defaults = Self::default();

    let server_host = lookup("SERVER_HOST").unwrap_or(defaults.server_host);
    let server_port = parse_var(&lookup, "SERVER_PORT")?.unwrap_or(defaults.server_port);
    let store_backend = parse_var(&lookup, "STORE_BACKEND")?.unwrap_or(defaults.store_backend);

    let table_name = lookup("DYNAMODB_PRODUCT_TABLE_NAME").unwrap_or(defaults.dynamo.table_name);
    if table_name.is_empty() {
      return Err(AppError::Config("DYNAMODB_PRODUCT_TABLE_NAME cannot be empty".to_string()));
    }
    // An explicitly empty endpoint means "use the SDK's regional endpoint".
    let endpoint = match lookup("DYNAMODB_ENDPOINT_URL") {
      Some(url) if url.is_empty() => None,
      Some(url) => Some(url),
      None => defaults.dynamo.endpoint,
    };
    let region = lookup("DYNAMODB_REGION").filter(|r| !r.is_empty());
    let timeout_ms = parse_var(&lookup, "DYNAMODB_TIMEOUT_MS")?;

    let create_table = parse_var(&lookup, "DYNAMODB_CREATE_TABLE")?.unwrap_or(defaults.create_table);
    let consistent_reads = parse_var(&lookup, "CONSISTENT_READS")?.unwrap_or(defaults.consistent_reads);
    let enable_test_routes = parse_var(&lookup, "ENABLE_TEST_ROUTES")?.unwrap_or(defaults.enable_test_routes);
    let log_format = parse_var(&lookup, "LOG_FORMAT")?.unwrap_or(defaults.log_format);

    tracing::info!("Application configuration loaded successfully.");

    Ok(Self {
      server_host,
      server_port,
      store_backend,
      dynamo: DynamoConfig {
        table_name,
        region,
        endpoint,
        timeout_ms,
      },
      create_table,
      consistent_reads,
      enable_test_routes,
      log_format,
    })
  }

  pub fn bind_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }
}

fn parse_var<T, F>(lookup: &F, name: &str) -> Result<Option<T>>
where
  T: FromStr,
  T::Err: std::fmt::Display,
  F: Fn(&str) -> Option<String>,
{
  lookup(name)
    .map(|raw| {
      raw
        .trim()
        .parse::<T>()
        .map_err(|e| AppError::Config(format!("Invalid {} value '{}': {}", name, raw, e)))
    })
    .transpose()
}
