//! Shop API: REST CRUD service for customers and products backed by PostgreSQL.

pub mod config;
pub mod error;
pub mod handlers;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;

pub use config::{ResourceDef, Settings, CUSTOMERS, PRODUCTS, RESOURCES};
pub use error::{AppError, ConfigError, StoreError};
pub use routes::{app, common_routes, common_routes_with_ready, resource_routes};
pub use service::{Reply, ResourceService};
pub use state::AppState;
pub use store::{ensure_database_exists, MemoryStore, PgStore, RecordStore};
