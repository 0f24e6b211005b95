//! Shared fixtures for integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Mutex;

use songplay_warehouse::config::{CommitMode, UserDedup, WarehouseConfig, sample_config};
use songplay_warehouse::models::Dialect;
use songplay_warehouse::warehouse::{
    QueryResult, Warehouse, WarehouseError, WarehouseResult, sql_excerpt,
};

/// Canned answer for queries whose SQL contains a pattern
#[derive(Debug, Clone)]
pub enum Scripted {
    Rows(QueryResult),
    Error(String),
}

/// In-memory warehouse that records every statement it receives
///
/// Queries are answered from a script by substring match, falling back to an
/// empty result, which every check reads as "no issues". Statements
/// containing the failure pattern are rejected.
pub struct RecordingWarehouse {
    executed: Mutex<Vec<String>>,
    queried: Mutex<Vec<String>>,
    script: Vec<(String, Scripted)>,
    fail_pattern: Option<String>,
    rows_affected: u64,
}

impl RecordingWarehouse {
    pub fn new() -> Self {
        Self {
            executed: Mutex::new(Vec::new()),
            queried: Mutex::new(Vec::new()),
            script: Vec::new(),
            fail_pattern: None,
            rows_affected: 0,
        }
    }

    /// Answer queries containing `pattern` with a single count
    pub fn with_count(self, pattern: &str, count: i64) -> Self {
        self.with_rows(pattern, QueryResult::scalar("count", serde_json::json!(count)))
    }

    pub fn with_rows(mut self, pattern: &str, result: QueryResult) -> Self {
        self.script
            .push((pattern.to_string(), Scripted::Rows(result)));
        self
    }

    pub fn with_query_error(mut self, pattern: &str, message: &str) -> Self {
        self.script
            .push((pattern.to_string(), Scripted::Error(message.to_string())));
        self
    }

    /// Reject any executed statement containing `pattern`
    pub fn failing_on(mut self, pattern: &str) -> Self {
        self.fail_pattern = Some(pattern.to_string());
        self
    }

    /// Row count reported for every executed statement
    pub fn with_rows_affected(mut self, rows: u64) -> Self {
        self.rows_affected = rows;
        self
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }

    pub fn queried(&self) -> Vec<String> {
        self.queried.lock().unwrap().clone()
    }

    /// Executed statements containing `needle`, in order
    pub fn executed_matching(&self, needle: &str) -> Vec<String> {
        self.executed()
            .into_iter()
            .filter(|sql| sql.contains(needle))
            .collect()
    }
}

#[async_trait(?Send)]
impl Warehouse for RecordingWarehouse {
    async fn execute(&self, sql: &str) -> WarehouseResult<u64> {
        self.executed.lock().unwrap().push(sql.to_string());

        if let Some(pattern) = &self.fail_pattern
            && sql.contains(pattern.as_str())
        {
            return Err(WarehouseError::StatementFailed {
                label: sql_excerpt(sql),
                message: format!("simulated failure on '{}'", pattern),
            });
        }

        match sql {
            "BEGIN" | "COMMIT" | "ROLLBACK" => Ok(0),
            _ => Ok(self.rows_affected),
        }
    }

    async fn query(&self, sql: &str) -> WarehouseResult<QueryResult> {
        self.queried.lock().unwrap().push(sql.to_string());

        let scripted = self
            .script
            .iter()
            .find(|(pattern, _)| sql.contains(pattern.as_str()))
            .map(|(_, answer)| answer.clone());

        match scripted {
            Some(Scripted::Rows(result)) => Ok(result),
            Some(Scripted::Error(message)) => Err(WarehouseError::StatementFailed {
                label: sql_excerpt(sql),
                message,
            }),
            None => Ok(QueryResult::empty()),
        }
    }

    fn backend_type(&self) -> &'static str {
        "recording"
    }
}

/// Sample configuration with the given pipeline switches
pub fn config(dialect: Dialect, commit_mode: CommitMode, user_dedup: UserDedup) -> WarehouseConfig {
    let mut config = WarehouseConfig::parse(sample_config()).unwrap();
    config.cluster.dialect = dialect;
    config.pipeline.commit_mode = commit_mode;
    config.pipeline.user_dedup = user_dedup;
    config
}

/// Sample configuration with all defaults
pub fn default_config() -> WarehouseConfig {
    config(Dialect::Redshift, CommitMode::PerStatement, UserDedup::Latest)
}
