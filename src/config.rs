use clap::{Args, Parser, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Log output style: readable text for development, JSON lines in production.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum RunMode {
    #[default]
    Dev,
    Prod,
}

/// Settings shared by every binary that touches the store or the network.
#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
    /// SQLite database file
    #[arg(long, env = "PRICE_SERVICE_DB", default_value = "price_service.db")]
    pub db: PathBuf,

    /// Timeout for a single feed download, in seconds
    #[arg(long, env = "PRICE_SERVICE_FETCH_TIMEOUT_SECS", default_value_t = 30)]
    pub fetch_timeout_secs: u64,

    /// Run mode: dev or prod
    #[arg(long, env = "PRICE_SERVICE_MODE", value_enum, default_value_t = RunMode::Dev)]
    pub mode: RunMode,
}

impl StoreArgs {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

/// Price server configuration.
#[derive(Parser, Debug, Clone)]
#[command(version, about = "Price feed import and listing service")]
pub struct ServerConfig {
    /// Listen on host:port
    #[arg(long, env = "PRICE_SERVICE_ADDR", default_value = "127.0.0.1:50051")]
    pub addr: SocketAddr,

    /// Directory served under /static (feed files, for instance)
    #[arg(long, env = "PRICE_SERVICE_STATIC_DIR")]
    pub static_dir: Option<PathBuf>,

    #[command(flatten)]
    pub store: StoreArgs,
}
