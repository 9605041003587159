//! Rateway Server
//!
//! HTTP service converting amounts between currencies. Rates are read
//! through a cache in front of an upstream rate source, and every
//! conversion is recorded in the conversion log before it is returned.

pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod routes;
pub mod server;
pub mod service;

pub use config::ServerConfig;
pub use error::ConvertError;
pub use routes::{create_router, AppState};
pub use service::ConversionService;
