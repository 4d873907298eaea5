use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Page size used when the caller asks for nothing sensible.
pub const DEFAULT_LIMIT: i64 = 100;

/// Largest page a single list call may return.
pub const MAX_LIMIT: i64 = 1000;

/// One parsed `(name, price)` row of a feed, before persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceEntry {
    pub name: String,
    pub price: f64,
}

impl PriceEntry {
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            price,
        }
    }
}

/// Persisted price with its change counter.
///
/// `name` is the natural key; `id` is assigned once on first insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub changes: i64,
    pub updated_at: DateTime<Utc>,
}

/// Column a price listing may be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[default]
    Name,
    Price,
    Changes,
    UpdatedAt,
}

impl SortField {
    /// Unknown field names fall back to `Name`.
    pub fn parse(value: &str) -> Self {
        match value {
            "name" => SortField::Name,
            "price" => SortField::Price,
            "changes" => SortField::Changes,
            "updatedAt" | "updated_at" => SortField::UpdatedAt,
            _ => SortField::Name,
        }
    }

    /// Storage column backing this field. Only these literals ever reach SQL.
    pub fn column(&self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::Price => "price",
            SortField::Changes => "changes",
            SortField::UpdatedAt => "updated_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    /// Anything other than "descending" sorts ascending.
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("descending") {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        }
    }

    pub fn sql(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

/// Normalized pagination request. Out-of-range input is coerced, never rejected.
///
/// Fields are private so every query that reaches a collection went through
/// `ListQuery::new`: `skip >= 0` and `1 <= limit <= MAX_LIMIT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListQuery {
    skip: i64,
    limit: i64,
    order_by: SortField,
    direction: SortDirection,
}

impl ListQuery {
    pub fn new(skip: i64, limit: i64, order_by: &str, direction: &str) -> Self {
        Self {
            skip: skip.max(0),
            limit: if limit <= 0 || limit > MAX_LIMIT {
                DEFAULT_LIMIT
            } else {
                limit
            },
            order_by: SortField::parse(order_by),
            direction: SortDirection::parse(direction),
        }
    }

    pub fn skip(&self) -> i64 {
        self.skip
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    pub fn order_by(&self) -> SortField {
        self.order_by
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }
}

/// Seconds and nanoseconds since the Unix epoch, UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamp {
    pub seconds: i64,
    pub nanos: i32,
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self {
            seconds: dt.timestamp(),
            nanos: dt.timestamp_subsec_nanos() as i32,
        }
    }
}

/// A record as it goes out in a list reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceReply {
    pub name: String,
    pub price: f64,
    pub changes: i64,
    pub updated_at: Timestamp,
}

impl From<PriceRecord> for PriceReply {
    fn from(record: PriceRecord) -> Self {
        Self {
            name: record.name,
            price: record.price,
            changes: record.changes,
            updated_at: record.updated_at.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_list_query_normalizes_skip() {
        assert_eq!(ListQuery::new(-1, 10, "name", "").skip, 0);
        assert_eq!(ListQuery::new(0, 10, "name", "").skip, 0);
        assert_eq!(ListQuery::new(7, 10, "name", "").skip, 7);
    }

    #[test]
    fn test_list_query_normalizes_limit() {
        assert_eq!(ListQuery::new(0, 0, "name", "").limit, DEFAULT_LIMIT);
        assert_eq!(ListQuery::new(0, -5, "name", "").limit, DEFAULT_LIMIT);
        assert_eq!(ListQuery::new(0, 1500, "name", "").limit, DEFAULT_LIMIT);
        assert_eq!(ListQuery::new(0, 1000, "name", "").limit, 1000);
        assert_eq!(ListQuery::new(0, 1, "name", "").limit, 1);
    }

    #[test]
    fn test_list_query_accessors() {
        let query = ListQuery::new(-5, 1500, "price", "descending");

        assert_eq!(query.skip(), 0);
        assert_eq!(query.limit(), DEFAULT_LIMIT);
        assert_eq!(query.order_by(), SortField::Price);
        assert_eq!(query.direction(), SortDirection::Descending);
    }

    #[test]
    fn test_sort_field_fallback() {
        assert_eq!(SortField::parse("price"), SortField::Price);
        assert_eq!(SortField::parse("changes"), SortField::Changes);
        assert_eq!(SortField::parse("updatedAt"), SortField::UpdatedAt);
        assert_eq!(SortField::parse("updated_at"), SortField::UpdatedAt);
        assert_eq!(SortField::parse("bogus"), SortField::Name);
        assert_eq!(SortField::parse(""), SortField::Name);
        assert_eq!(SortField::parse("id; DROP TABLE prices"), SortField::Name);
    }

    #[test]
    fn test_sort_direction_fallback() {
        assert_eq!(SortDirection::parse("descending"), SortDirection::Descending);
        assert_eq!(SortDirection::parse("DESCENDING"), SortDirection::Descending);
        assert_eq!(SortDirection::parse("ascending"), SortDirection::Ascending);
        assert_eq!(SortDirection::parse("desc"), SortDirection::Ascending);
        assert_eq!(SortDirection::parse(""), SortDirection::Ascending);
    }

    #[test]
    fn test_price_reply_from_record() {
        let updated_at = Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap();
        let record = PriceRecord {
            id: "id-1".to_string(),
            name: "Product".to_string(),
            price: 100.99,
            changes: 11,
            updated_at,
        };

        let reply = PriceReply::from(record);

        assert_eq!(reply.name, "Product");
        assert_eq!(reply.price, 100.99);
        assert_eq!(reply.changes, 11);
        assert_eq!(
            reply.updated_at,
            Timestamp {
                seconds: 1_700_000_000,
                nanos: 123_456_789
            }
        );
    }
}
