use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{ListQuery, PriceEntry, PriceRecord};

/// One keyed upsert: find the record by `name`, bump `changes` by
/// `changes_increment`, overwrite `price` and `updated_at`, create if absent.
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertInstruction {
    pub name: String,
    pub price: f64,
    pub updated_at: DateTime<Utc>,
    pub changes_increment: i64,
}

impl UpsertInstruction {
    pub fn for_entry(updated_at: DateTime<Utc>, entry: &PriceEntry) -> Self {
        Self {
            name: entry.name.clone(),
            price: entry.price,
            updated_at,
            changes_increment: 1,
        }
    }
}

/// Persistent collection of price records.
///
/// Implementations must apply each instruction atomically and may be called
/// from many threads at once.
pub trait RecordCollection: Send + Sync {
    /// Apply all instructions as one batch, in order.
    fn bulk_upsert(&self, instructions: &[UpsertInstruction]) -> Result<()>;

    /// Sort everything by the query's field and direction, then skip and limit.
    /// Ties keep insertion order.
    fn find_sorted(&self, query: &ListQuery) -> Result<Vec<PriceRecord>>;

    fn count(&self) -> Result<i64>;
}

/// Price repository: idempotent imports and bounded, ordered listing.
pub struct PriceStore<C> {
    collection: C,
}

impl<C: RecordCollection> PriceStore<C> {
    pub fn new(collection: C) -> Self {
        PriceStore { collection }
    }

    /// Upsert every entry keyed by name, all stamped with `updated_at`.
    ///
    /// Entries with a non-finite price are skipped, the same way the parser
    /// drops them, so every backend sees only storable values.
    pub fn import(&self, updated_at: DateTime<Utc>, entries: &[PriceEntry]) -> Result<()> {
        let instructions: Vec<UpsertInstruction> = entries
            .iter()
            .filter(|entry| {
                let finite = entry.price.is_finite();
                if !finite {
                    tracing::warn!(name = %entry.name, price = entry.price, "skipping non-finite price");
                }
                finite
            })
            .map(|entry| UpsertInstruction::for_entry(updated_at, entry))
            .collect();

        if instructions.is_empty() {
            tracing::debug!("nothing to import");
            return Ok(());
        }

        self.collection.bulk_upsert(&instructions)?;

        tracing::info!(entries = instructions.len(), %updated_at, "prices imported");

        Ok(())
    }

    /// List a page of records. Parameters are normalized, never rejected.
    pub fn list(
        &self,
        skip: i64,
        limit: i64,
        order_by: &str,
        order_direction: &str,
    ) -> Result<Vec<PriceRecord>> {
        let query = ListQuery::new(skip, limit, order_by, order_direction);
        let records = self.collection.find_sorted(&query)?;

        tracing::debug!(
            skip = query.skip(),
            limit = query.limit(),
            order_by = query.order_by().column(),
            direction = query.direction().sql(),
            returned = records.len(),
            "prices listed"
        );

        Ok(records)
    }

    pub fn count(&self) -> Result<i64> {
        self.collection.count()
    }
}
