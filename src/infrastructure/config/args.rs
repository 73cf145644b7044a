use super::app_config::LogLevel;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(
    name = "homefeed",
    version,
    about = "Prefetches listing images and reports backend connection health",
    long_about = None
)]
pub struct CliArgs {
    /// Configuration file path.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Backend base URL.
    #[arg(long, value_name = "URL")]
    pub backend_url: Option<String>,

    /// Backend API key.
    #[arg(long, env = "HOMEFEED_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Number of listings to prefetch images for.
    #[arg(long)]
    pub limit: Option<u32>,

    /// Reset connection state before running.
    #[arg(long)]
    pub reset_connection: bool,
}
