//! Resource API: a small SQLite-backed REST CRUD service, plus the sum-to-n exercises.

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod model;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;
pub mod sum;

pub use config::ServerConfig;
pub use error::{AppError, ConfigError};
pub use model::{CreateResource, Resource, ResourceFilter, UpdateResource};
pub use routes::{app, common_routes, resource_routes, RESOURCES_PATH};
pub use service::{RequestValidator, ResourceService};
pub use state::AppState;
pub use store::{ensure_database_exists, ensure_schema, ResourceStore, SqliteStore};
pub use sum::{sum_to_n_a, sum_to_n_b, sum_to_n_c};
