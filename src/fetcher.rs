// Feed fetcher: URL → byte stream → PriceEntry list

use std::io::Read;
use std::time::Duration;
use url::Url;

use crate::error::{Error, Result};
use crate::models::PriceEntry;
use crate::parser::FeedParser;

/// Anything that can turn a validated URL into a readable byte stream.
///
/// The stream is closed when the returned reader is dropped.
pub trait ByteStreamSource: Send + Sync {
    fn open(&self, url: &Url) -> Result<Box<dyn Read + Send>>;
}

/// Blocking HTTP source backed by reqwest.
#[derive(Debug, Clone)]
pub struct HttpSource {
    timeout: Duration,
}

impl HttpSource {
    pub fn new(timeout: Duration) -> Self {
        HttpSource { timeout }
    }
}

impl Default for HttpSource {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

impl ByteStreamSource for HttpSource {
    fn open(&self, url: &Url) -> Result<Box<dyn Read + Send>> {
        // The blocking client owns a runtime of its own, so it lives only as
        // long as the call on the caller's thread.
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(Error::transport)?;

        let response = client
            .get(url.clone())
            .send()
            .map_err(Error::transport)?
            .error_for_status()
            .map_err(Error::transport)?;

        tracing::debug!(%url, status = %response.status(), "feed response received");

        Ok(Box::new(response))
    }
}

/// Validates a feed URL, retrieves it and hands the body to the parser.
pub struct FeedFetcher<S> {
    source: S,
    parser: FeedParser,
}

impl<S: ByteStreamSource> FeedFetcher<S> {
    pub fn new(source: S) -> Self {
        FeedFetcher {
            source,
            parser: FeedParser::new(),
        }
    }

    pub fn fetch(&self, raw_url: &str) -> Result<Vec<PriceEntry>> {
        let url = validate_url(raw_url)?;

        let body = self.source.open(&url)?;
        let entries = self.parser.parse(body);

        tracing::info!(%url, entries = entries.len(), "feed fetched");

        Ok(entries)
    }
}

/// Accept only absolute URIs; the empty string is rejected too.
pub fn validate_url(raw_url: &str) -> Result<Url> {
    Url::parse(raw_url).map_err(|source| Error::InvalidUrl {
        url: raw_url.to_string(),
        source,
    })
}
