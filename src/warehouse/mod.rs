//! Warehouse connection abstraction
//!
//! The pipeline talks to the warehouse only through the [`Warehouse`] trait:
//! - `execute` for DDL/DML/`COPY`, returning the affected row count
//! - `query` for checks, returning rows as JSON values
//!
//! [`postgres::PostgresWarehouse`] speaks the Postgres wire protocol, which is
//! what the columnar warehouse exposes. Tests substitute an in-memory recorder.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod postgres;
pub mod schema;

pub use postgres::PostgresWarehouse;
pub use schema::WarehouseSchema;

/// Error type for warehouse operations
#[derive(Debug, thiserror::Error)]
pub enum WarehouseError {
    /// Failed to connect to the warehouse
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// A labelled statement was rejected by the engine
    #[error("Statement '{label}' failed: {message}")]
    StatementFailed { label: String, message: String },

    /// `BEGIN`/`COMMIT`/`ROLLBACK` failed
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// The engine answered, but not in the expected shape
    #[error("Unexpected result: {0}")]
    UnexpectedResult(String),

    /// Operation not available for the configured dialect
    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

impl WarehouseError {
    /// Attach a human label to a statement failure
    ///
    /// Backends only see SQL text; callers that know what the statement is
    /// for (e.g. `insert users_dim`) relabel the error before logging it.
    pub fn with_label(self, label: &str) -> Self {
        match self {
            WarehouseError::StatementFailed { message, .. } => WarehouseError::StatementFailed {
                label: label.to_string(),
                message,
            },
            other => other,
        }
    }
}

/// Short single-line excerpt of a statement, used as a fallback label
pub fn sql_excerpt(sql: &str) -> String {
    const MAX_CHARS: usize = 60;

    let flat = sql.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= MAX_CHARS {
        flat
    } else {
        let cut: String = flat.chars().take(MAX_CHARS).collect();
        format!("{}...", cut)
    }
}

/// Result type for warehouse operations
pub type WarehouseResult<T> = Result<T, WarehouseError>;

/// Query result row as a JSON value
pub type QueryRow = serde_json::Value;

/// Query result set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    /// Column names
    pub columns: Vec<String>,
    /// Rows of data
    pub rows: Vec<QueryRow>,
    /// Execution time in milliseconds
    pub execution_time_ms: u64,
}

impl QueryResult {
    pub fn new(columns: Vec<String>, rows: Vec<QueryRow>) -> Self {
        Self {
            columns,
            rows,
            execution_time_ms: 0,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    /// Single-row, single-column result, e.g. `SELECT COUNT(*) ...`
    pub fn scalar(column: &str, value: serde_json::Value) -> Self {
        let mut row = serde_json::Map::new();
        row.insert(column.to_string(), value);
        Self::new(vec![column.to_string()], vec![serde_json::Value::Object(row)])
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Value of the first column in the first row, if any
    pub fn first_value(&self) -> Option<&serde_json::Value> {
        let column = self.columns.first()?;
        self.rows.first()?.get(column)
    }

    /// First value interpreted as an integer count
    ///
    /// Engines may hand back `COUNT(*)` as a number or as text depending on
    /// the column type, so both are accepted. An empty result counts as zero.
    pub fn scalar_i64(&self) -> WarehouseResult<i64> {
        match self.first_value() {
            None | Some(serde_json::Value::Null) => Ok(0),
            Some(serde_json::Value::Number(n)) => n.as_i64().ok_or_else(|| {
                WarehouseError::UnexpectedResult(format!("'{}' is not an integer", n))
            }),
            Some(serde_json::Value::String(s)) => s.trim().parse::<i64>().map_err(|e| {
                WarehouseError::UnexpectedResult(format!("'{}' is not an integer: {}", s, e))
            }),
            Some(other) => Err(WarehouseError::UnexpectedResult(format!(
                "'{}' is not an integer",
                other
            ))),
        }
    }
}

/// Warehouse connection used by every pipeline component
///
/// A single connection with one statement in flight at a time. Each call to
/// [`Warehouse::execute`] runs in autocommit unless the caller has opened a
/// transaction with `BEGIN`.
#[async_trait(?Send)]
pub trait Warehouse: Send + Sync {
    /// Execute a statement that returns no rows
    ///
    /// # Returns
    /// Number of rows affected as reported by the engine (0 for DDL)
    async fn execute(&self, sql: &str) -> WarehouseResult<u64>;

    /// Execute a query and return its rows
    async fn query(&self, sql: &str) -> WarehouseResult<QueryResult>;

    /// Backend type name, for logs
    fn backend_type(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_result_empty() {
        let result = QueryResult::empty();
        assert!(result.is_empty());
        assert_eq!(result.row_count(), 0);
        assert_eq!(result.scalar_i64().unwrap(), 0);
    }

    #[test]
    fn test_scalar_i64_number_and_text() {
        assert_eq!(QueryResult::scalar("count", json!(3)).scalar_i64().unwrap(), 3);
        assert_eq!(
            QueryResult::scalar("count", json!("42")).scalar_i64().unwrap(),
            42
        );
        assert_eq!(
            QueryResult::scalar("count", serde_json::Value::Null)
                .scalar_i64()
                .unwrap(),
            0
        );
    }

    #[test]
    fn test_scalar_i64_rejects_non_integer() {
        let err = QueryResult::scalar("count", json!("many"))
            .scalar_i64()
            .unwrap_err();
        assert!(matches!(err, WarehouseError::UnexpectedResult(_)));

        let err = QueryResult::scalar("count", json!(1.5))
            .scalar_i64()
            .unwrap_err();
        assert!(matches!(err, WarehouseError::UnexpectedResult(_)));
    }

    #[test]
    fn test_first_value_uses_first_column() {
        let result = QueryResult::new(
            vec!["song_id".to_string(), "count".to_string()],
            vec![json!({"song_id": "SONG1", "count": 2})],
        );
        assert_eq!(result.first_value(), Some(&json!("SONG1")));
    }

    #[test]
    fn test_with_label_only_touches_statement_errors() {
        let err = WarehouseError::StatementFailed {
            label: "INSERT INTO users_dim".to_string(),
            message: "boom".to_string(),
        }
        .with_label("insert users_dim");
        assert!(
            matches!(err, WarehouseError::StatementFailed { ref label, .. } if label == "insert users_dim")
        );

        let err = WarehouseError::ConnectionFailed("down".to_string()).with_label("x");
        assert!(matches!(err, WarehouseError::ConnectionFailed(_)));
    }

    #[test]
    fn test_sql_excerpt() {
        assert_eq!(
            sql_excerpt("DROP TABLE\n    IF EXISTS time_dim;"),
            "DROP TABLE IF EXISTS time_dim;"
        );
        let long = format!("SELECT {} FROM t", "x, ".repeat(40));
        let excerpt = sql_excerpt(&long);
        assert!(excerpt.ends_with("..."));
        assert_eq!(excerpt.chars().count(), 63);
    }

    #[test]
    fn test_statement_error_display() {
        let err = WarehouseError::StatementFailed {
            label: "insert users_dim".to_string(),
            message: "relation does not exist".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Statement 'insert users_dim' failed: relation does not exist"
        );
    }
}
