//! Application configuration.

mod app_config;
mod args;

pub use app_config::{AppConfig, LogLevel, PrefetchSettings, RetrySettings};
pub use args::CliArgs;
