// In-process RecordCollection, used as a test double and for dry runs

use std::cmp::Ordering;
use std::sync::Mutex;

use crate::error::{Error, Result};
use crate::models::{ListQuery, PriceRecord, SortDirection, SortField};
use crate::store::{RecordCollection, UpsertInstruction};

/// Records kept in insertion order behind a mutex.
#[derive(Debug, Default)]
pub struct MemoryCollection {
    records: Mutex<Vec<PriceRecord>>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<PriceRecord>>> {
        self.records
            .lock()
            .map_err(|_| Error::storage("memory collection lock poisoned"))
    }
}

fn compare(field: SortField, a: &PriceRecord, b: &PriceRecord) -> Ordering {
    match field {
        SortField::Name => a.name.cmp(&b.name),
        SortField::Price => a.price.total_cmp(&b.price),
        SortField::Changes => a.changes.cmp(&b.changes),
        SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
    }
}

impl RecordCollection for MemoryCollection {
    fn bulk_upsert(&self, instructions: &[UpsertInstruction]) -> Result<()> {
        let mut records = self.lock()?;

        for ins in instructions {
            match records.iter_mut().find(|r| r.name == ins.name) {
                Some(record) => {
                    record.price = ins.price;
                    record.changes += ins.changes_increment;
                    record.updated_at = ins.updated_at;
                }
                None => records.push(PriceRecord {
                    id: uuid::Uuid::new_v4().to_string(),
                    name: ins.name.clone(),
                    price: ins.price,
                    changes: ins.changes_increment,
                    updated_at: ins.updated_at,
                }),
            }
        }

        Ok(())
    }

    fn find_sorted(&self, query: &ListQuery) -> Result<Vec<PriceRecord>> {
        let mut sorted = self.lock()?.clone();

        // sort_by is stable: ties stay in insertion order in both directions
        sorted.sort_by(|a, b| {
            let ord = compare(query.order_by(), a, b);
            match query.direction() {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            }
        });

        Ok(sorted
            .into_iter()
            .skip(query.skip() as usize)
            .take(query.limit() as usize)
            .collect())
    }

    fn count(&self) -> Result<i64> {
        Ok(self.lock()?.len() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn upsert(name: &str, price: f64) -> UpsertInstruction {
        UpsertInstruction {
            name: name.to_string(),
            price,
            updated_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            changes_increment: 1,
        }
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let collection = MemoryCollection::new();
        collection
            .bulk_upsert(&[upsert("C", 5.0), upsert("A", 5.0), upsert("B", 1.0)])
            .unwrap();

        let asc = collection
            .find_sorted(&ListQuery::new(0, 10, "price", "ascending"))
            .unwrap();
        let desc = collection
            .find_sorted(&ListQuery::new(0, 10, "price", "descending"))
            .unwrap();

        let asc: Vec<&str> = asc.iter().map(|r| r.name.as_str()).collect();
        let desc: Vec<&str> = desc.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(asc, vec!["B", "C", "A"]);
        assert_eq!(desc, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_count() {
        let collection = MemoryCollection::new();
        assert_eq!(collection.count().unwrap(), 0);

        collection
            .bulk_upsert(&[upsert("A", 1.0), upsert("A", 2.0), upsert("B", 1.0)])
            .unwrap();
        assert_eq!(collection.count().unwrap(), 2);
    }
}
