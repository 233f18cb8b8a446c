//! API access layer: configuration resolution, HTTP wrapper, session
//! response cache, and the console service that combines them.

pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod service;

pub use cache::{CacheKey, ResponseCache};
pub use config::{ApiConfig, ConfigError, ConfigProblem};
pub use error::ClientError;
pub use http::ApiClient;
pub use service::ConsoleApi;
