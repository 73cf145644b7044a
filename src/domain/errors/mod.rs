//! Domain error types.

mod config_error;
mod query_error;

pub use config_error::ConfigError;
pub use query_error::QueryError;
