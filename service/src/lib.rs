// service/src/lib.rs

//! HTTP adapter for the product catalog: configuration, shared state, error mapping
//! and Actix routes. The binary in `main.rs` wires these together.

pub mod config;
pub mod errors;
pub mod state;
pub mod telemetry;
pub mod web;

pub use crate::config::AppConfig;
pub use crate::errors::{AppError, Result};
pub use crate::state::AppState;
