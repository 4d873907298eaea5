// Feed parser: `name;price` rows → PriceEntry
//
// Feeds are external and often dirty. A row that is not exactly two fields, or
// whose price does not parse, is dropped and the next row is read.

use csv::{ErrorKind, ReaderBuilder, StringRecord};
use std::io::Read;

use crate::models::PriceEntry;

/// Field delimiter of the price feed.
pub const DEFAULT_DELIMITER: u8 = b';';

const FIELDS_PER_ROW: usize = 2;

#[derive(Debug, Clone)]
pub struct FeedParser {
    delimiter: u8,
}

impl Default for FeedParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedParser {
    pub fn new() -> Self {
        FeedParser {
            delimiter: DEFAULT_DELIMITER,
        }
    }

    /// Builder pattern: parse feeds that use another single-byte delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Parse a feed into entries, preserving row order.
    ///
    /// Never fails. Empty or fully malformed input yields an empty vec.
    pub fn parse<R: Read>(&self, reader: R) -> Vec<PriceEntry> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(false)
            .delimiter(self.delimiter)
            .flexible(true)
            .from_reader(reader);

        let mut entries = Vec::new();
        let mut skipped = 0usize;

        for (index, result) in rdr.records().enumerate() {
            let record = match result {
                Ok(record) => record,
                Err(err) => {
                    if let ErrorKind::Io(io_err) = err.kind() {
                        // A broken stream yields nothing more
                        tracing::warn!(error = %io_err, "feed stream failed, stopping read");
                        break;
                    }
                    tracing::debug!(row = index + 1, error = %err, "skipping unreadable feed row");
                    skipped += 1;
                    continue;
                }
            };

            match parse_row(&record) {
                Some(entry) => entries.push(entry),
                None => {
                    tracing::debug!(row = index + 1, "skipping malformed feed row");
                    skipped += 1;
                }
            }
        }

        tracing::debug!(parsed = entries.len(), skipped, "feed parsed");

        entries
    }
}

fn parse_row(record: &StringRecord) -> Option<PriceEntry> {
    if record.len() != FIELDS_PER_ROW {
        return None;
    }

    let name = record.get(0)?.trim();
    let price: f64 = record.get(1)?.parse().ok()?;

    // NaN and infinities can be neither stored nor ordered
    if !price.is_finite() {
        return None;
    }

    Some(PriceEntry::new(name, price))
}
