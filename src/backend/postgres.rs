//! PostgreSQL backend
//!
//! Opens one connection per round-trip, so a held gate permit maps to
//! exactly one physical connection. Statements go through the simple query
//! protocol; values come back as text and are returned as JSON strings, or
//! null for SQL NULL.

use serde_json::Value;
use tokio_postgres::{Client, NoTls, SimpleQueryMessage};

use super::{AnalyticsBackend, BackendError, BackendFuture, BackendResult, Row};
use crate::config::EngineKind;
use crate::engine::COUNT_COLUMN;
use crate::observability::{Event, Logger};
use crate::planner::{PageWindow, MAX_OFFSET};

/// Backend for PostgreSQL-compatible warehouses
#[derive(Debug, Clone)]
pub struct PostgresBackend {
    url: String,
}

impl PostgresBackend {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    async fn connect(&self) -> BackendResult<Client> {
        let (client, connection) = tokio_postgres::connect(&self.url, NoTls)
            .await
            .map_err(|e| BackendError::Connect(e.to_string()))?;

        // The connection task ends when `client` is dropped.
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                Logger::error(Event::ConnectionFailed, &[("error", &e.to_string())]);
            }
        });

        Ok(client)
    }

    async fn fetch(&self, sql: &str) -> BackendResult<Vec<Row>> {
        let client = self.connect().await?;
        let messages = client
            .simple_query(sql)
            .await
            .map_err(|e| BackendError::Query(e.to_string()))?;

        Ok(messages.iter().filter_map(decode_row).collect())
    }

    async fn count(&self, count_sql: &str) -> BackendResult<u64> {
        let rows = self.fetch(count_sql).await?;
        let row = rows
            .first()
            .ok_or_else(|| BackendError::Decode("count returned no rows".into()))?;
        parse_count(row)
    }
}

/// Reads the count column of a decoded count row
fn parse_count(row: &Row) -> BackendResult<u64> {
    let value = row
        .get(COUNT_COLUMN)
        .ok_or_else(|| BackendError::Decode(format!("missing column '{}'", COUNT_COLUMN)))?;

    match value {
        Value::String(text) => text
            .parse::<u64>()
            .map_err(|e| BackendError::Decode(format!("count '{}': {}", text, e))),
        other => Err(BackendError::Decode(format!("count is not numeric: {}", other))),
    }
}

/// Appends a row limit to a distinct-value lookup
fn limit_query(sql: &str, limit: u64) -> String {
    format!("{} \nlimit {}", sql, limit.min(MAX_OFFSET))
}

fn decode_row(message: &SimpleQueryMessage) -> Option<Row> {
    let SimpleQueryMessage::Row(row) = message else {
        return None;
    };

    let mut out = Row::new();
    for (idx, column) in row.columns().iter().enumerate() {
        let value = match row.get(idx) {
            Some(text) => Value::String(text.to_string()),
            None => Value::Null,
        };
        out.insert(column.name().to_string(), value);
    }
    Some(out)
}

impl AnalyticsBackend for PostgresBackend {
    fn engine(&self) -> EngineKind {
        EngineKind::Postgres
    }

    fn count_rows<'a>(&'a self, count_sql: &'a str) -> BackendFuture<'a, u64> {
        Box::pin(self.count(count_sql))
    }

    fn select_page<'a>(&'a self, sql: &'a str, window: PageWindow) -> BackendFuture<'a, Vec<Row>> {
        Box::pin(async move { self.fetch(&window.apply(sql)).await })
    }

    fn select_dimension<'a>(&'a self, sql: &'a str, limit: u64) -> BackendFuture<'a, Vec<Row>> {
        Box::pin(async move { self.fetch(&limit_query(sql, limit)).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn count_row(value: Value) -> Row {
        let mut row = Row::new();
        row.insert(COUNT_COLUMN.into(), value);
        row
    }

    #[test]
    fn test_parse_count_reads_text_value() {
        assert_eq!(parse_count(&count_row(json!("1000001"))).unwrap(), 1_000_001);
        assert_eq!(parse_count(&count_row(json!("0"))).unwrap(), 0);
    }

    #[test]
    fn test_parse_count_missing_column() {
        let mut row = Row::new();
        row.insert("count".into(), json!("12"));
        assert_eq!(
            parse_count(&row).unwrap_err(),
            BackendError::Decode("missing column 'count_rows'".into())
        );
    }

    #[test]
    fn test_parse_count_non_numeric_text() {
        let err = parse_count(&count_row(json!("twelve"))).unwrap_err();
        assert!(matches!(err, BackendError::Decode(msg) if msg.starts_with("count 'twelve'")));

        let err = parse_count(&count_row(json!("-3"))).unwrap_err();
        assert!(matches!(err, BackendError::Decode(_)));
    }

    #[test]
    fn test_limit_query_appends_limit() {
        assert_eq!(
            limit_query("select distinct region from sales", 1_001),
            "select distinct region from sales \nlimit 1001"
        );
        assert_eq!(
            limit_query("select 1", u64::MAX),
            format!("select 1 \nlimit {}", i64::MAX)
        );
    }

    #[test]
    fn test_parse_count_null() {
        assert_eq!(
            parse_count(&count_row(Value::Null)).unwrap_err(),
            BackendError::Decode("count is not numeric: null".into())
        );
    }

    #[tokio::test]
    async fn test_unreachable_server_is_connect_error() {
        // Port 1 on localhost is never a postgres server.
        let backend = PostgresBackend::new("postgresql://user:pw@127.0.0.1:1/olap");
        let err = backend.select_dimension("select 1", 10).await.unwrap_err();
        assert!(matches!(err, BackendError::Connect(_)));
    }

    #[tokio::test]
    async fn test_malformed_url_is_connect_error() {
        let backend = PostgresBackend::new("not a connection string ===");
        let err = backend.count_rows("select 1").await.unwrap_err();
        assert!(matches!(err, BackendError::Connect(_)));
    }
}
