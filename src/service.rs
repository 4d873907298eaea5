use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::fetcher::{ByteStreamSource, FeedFetcher};
use crate::models::PriceReply;
use crate::store::{PriceStore, RecordCollection};

pub const STATUS_OK: &str = "ok";
pub const STATUS_ERROR: &str = "error";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchReply {
    pub status: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
}

impl FetchReply {
    fn ok() -> Self {
        Self {
            status: STATUS_OK.to_string(),
            message: String::new(),
        }
    }

    fn error(message: String) -> Self {
        Self {
            status: STATUS_ERROR.to_string(),
            message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListReply {
    pub status: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    pub prices: Vec<PriceReply>,
}

/// Request-facing glue: fetch + import, and list.
///
/// Errors are rendered into the reply rather than returned, the way the RPC
/// surface reports them.
pub struct PriceService<S, C> {
    fetcher: FeedFetcher<S>,
    store: PriceStore<C>,
}

impl<S: ByteStreamSource, C: RecordCollection> PriceService<S, C> {
    pub fn new(fetcher: FeedFetcher<S>, store: PriceStore<C>) -> Self {
        PriceService { fetcher, store }
    }

    pub fn store(&self) -> &PriceStore<C> {
        &self.store
    }

    pub fn fetch_and_import(&self, url: &str) -> FetchReply {
        tracing::info!(url, "fetch requested");

        let entries = match self.fetcher.fetch(url) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!(url, error = %err, "fetch failed");
                return FetchReply::error(err.to_string());
            }
        };

        // One timestamp for the whole import
        let now = Utc::now();
        match self.store.import(now, &entries) {
            Ok(()) => FetchReply::ok(),
            Err(err) => {
                tracing::error!(url, error = %err, "import failed");
                FetchReply::error(err.to_string())
            }
        }
    }

    pub fn list_prices(
        &self,
        skip: i64,
        limit: i64,
        order_by: &str,
        order_direction: &str,
    ) -> ListReply {
        match self.store.list(skip, limit, order_by, order_direction) {
            Ok(records) => ListReply {
                status: STATUS_OK.to_string(),
                message: String::new(),
                prices: records.into_iter().map(PriceReply::from).collect(),
            },
            Err(err) => {
                tracing::error!(error = %err, "list failed");
                ListReply {
                    status: STATUS_ERROR.to_string(),
                    message: err.to_string(),
                    prices: Vec::new(),
                }
            }
        }
    }
}
