use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::models::{ListQuery, PriceRecord};
use crate::store::{RecordCollection, UpsertInstruction};

const UPSERT_SQL: &str = "INSERT INTO prices (id, name, price, changes, updated_at)
     VALUES (?1, ?2, ?3, ?4, ?5)
     ON CONFLICT(name) DO UPDATE SET
         price = excluded.price,
         changes = prices.changes + excluded.changes,
         updated_at = excluded.updated_at";

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    // (in-memory databases answer "memory" and stay that way)
    let _mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;

    // name is the natural key; rowid doubles as insertion order for tie-breaks
    conn.execute(
        "CREATE TABLE IF NOT EXISTS prices (
            id TEXT UNIQUE NOT NULL,
            name TEXT UNIQUE NOT NULL,
            price REAL NOT NULL,
            changes INTEGER NOT NULL DEFAULT 0,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_prices_price ON prices(price)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_prices_changes ON prices(changes)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_prices_updated_at ON prices(updated_at)",
        [],
    )?;

    Ok(())
}

/// Fixed-width RFC 3339 so that text order is time order.
fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(idx: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<PriceRecord> {
    let updated_at: String = row.get(4)?;

    Ok(PriceRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        price: row.get(2)?,
        changes: row.get(3)?,
        updated_at: parse_timestamp(4, &updated_at)?,
    })
}

/// SQLite-backed price collection.
///
/// One connection behind a mutex: every bulk write runs as a single SQL
/// transaction and never interleaves with another call.
pub struct SqliteCollection {
    conn: Mutex<Connection>,
}

impl SqliteCollection {
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        tracing::info!(path = %db_path.display(), "price database opened");
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn from_connection(conn: Connection) -> Result<Self> {
        setup_database(&conn)?;
        Ok(SqliteCollection {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::storage("database connection lock poisoned"))
    }
}

impl RecordCollection for SqliteCollection {
    fn bulk_upsert(&self, instructions: &[UpsertInstruction]) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        {
            let mut stmt = tx.prepare_cached(UPSERT_SQL)?;
            for ins in instructions {
                stmt.execute(params![
                    uuid::Uuid::new_v4().to_string(),
                    ins.name,
                    ins.price,
                    ins.changes_increment,
                    format_timestamp(&ins.updated_at),
                ])?;
            }
        }

        tx.commit()?;

        tracing::debug!(instructions = instructions.len(), "bulk upsert committed");

        Ok(())
    }

    fn find_sorted(&self, query: &ListQuery) -> Result<Vec<PriceRecord>> {
        let conn = self.lock()?;

        // Column and direction come from closed enums, never from input text
        let sql = format!(
            "SELECT id, name, price, changes, updated_at
             FROM prices
             ORDER BY {} {}, rowid ASC
             LIMIT ?1 OFFSET ?2",
            query.order_by().column(),
            query.direction().sql(),
        );

        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(params![query.limit(), query.skip()], record_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(records)
    }

    fn count(&self) -> Result<i64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM prices", [], |row| row.get(0))?;
        Ok(count)
    }
}
