// service/src/web/handlers/mod.rs

pub mod maintenance_handlers;
pub mod product_handlers;
