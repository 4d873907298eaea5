// Price Service - Core Library
// Feed parsing, price storage and the request surface used by both binaries

pub mod config;
pub mod db;
pub mod error;
pub mod fetcher;
pub mod generator;
pub mod logging;
pub mod memory;
pub mod models;
pub mod parser;
pub mod service;
pub mod store;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use config::{RunMode, ServerConfig, StoreArgs};
pub use db::{setup_database, SqliteCollection};
pub use error::{Error, Result};
pub use fetcher::{validate_url, ByteStreamSource, FeedFetcher, HttpSource};
pub use generator::generate_feed;
pub use logging::init_tracing;
pub use memory::MemoryCollection;
pub use models::{
    ListQuery, PriceEntry, PriceRecord, PriceReply, SortDirection, SortField, Timestamp,
    DEFAULT_LIMIT, MAX_LIMIT,
};
pub use parser::FeedParser;
pub use service::{FetchReply, ListReply, PriceService};
pub use store::{PriceStore, RecordCollection, UpsertInstruction};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Production wiring: HTTP feeds into a SQLite file.
pub type DefaultPriceService = PriceService<HttpSource, SqliteCollection>;

/// Open the database and build the service from configuration.
pub fn build_service(store: &StoreArgs) -> Result<DefaultPriceService> {
    let collection = SqliteCollection::open(&store.db)?;
    let fetcher = FeedFetcher::new(HttpSource::new(store.fetch_timeout()));
    Ok(PriceService::new(fetcher, PriceStore::new(collection)))
}
