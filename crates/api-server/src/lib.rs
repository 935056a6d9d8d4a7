//! HTTP server exposing the task and profile endpoints over one database.

pub mod config;
pub mod factory;
pub mod request_log;
pub mod router;
pub mod server;

pub use factory::{ApiService, ApiServiceConfig, create_api_service};
