//! Sequential statement execution with a commit policy

use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, error, info};

use crate::config::CommitMode;
use crate::warehouse::{Warehouse, WarehouseError, WarehouseResult};

/// A SQL statement with a short human label for logs and errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub label: String,
    pub sql: String,
}

impl Statement {
    pub fn new(label: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            sql: sql.into(),
        }
    }
}

/// Outcome of one executed statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementOutcome {
    pub label: String,
    /// Rows affected as reported by the engine
    pub rows_affected: u64,
    pub elapsed_ms: u64,
}

/// Per-statement statistics for one pipeline component
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageReport {
    pub stage: String,
    pub statements: Vec<StatementOutcome>,
}

impl StageReport {
    pub fn new(stage: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            statements: Vec::new(),
        }
    }

    pub fn total_rows(&self) -> u64 {
        self.statements.iter().map(|s| s.rows_affected).sum()
    }

    pub fn total_elapsed_ms(&self) -> u64 {
        self.statements.iter().map(|s| s.elapsed_ms).sum()
    }

    /// Outcome for a statement label, if it ran
    pub fn outcome(&self, label: &str) -> Option<&StatementOutcome> {
        self.statements.iter().find(|s| s.label == label)
    }
}

/// Runs statements one at a time, in order, stopping at the first failure
///
/// With [`CommitMode::PerStatement`] every statement commits on its own and a
/// failure leaves earlier statements in place. With [`CommitMode::PerStage`]
/// the whole batch runs between `BEGIN` and `COMMIT`, and a failure issues
/// `ROLLBACK` before the original error is returned.
pub struct StatementRunner<'a> {
    warehouse: &'a dyn Warehouse,
    commit_mode: CommitMode,
}

impl<'a> StatementRunner<'a> {
    pub fn new(warehouse: &'a dyn Warehouse, commit_mode: CommitMode) -> Self {
        Self {
            warehouse,
            commit_mode,
        }
    }

    /// Execute a batch of statements as one stage
    pub async fn run(&self, stage: &str, statements: &[Statement]) -> WarehouseResult<StageReport> {
        match self.commit_mode {
            CommitMode::PerStatement => self.run_each(stage, statements).await,
            CommitMode::PerStage => self.run_in_transaction(stage, statements).await,
        }
    }

    async fn run_each(&self, stage: &str, statements: &[Statement]) -> WarehouseResult<StageReport> {
        let mut report = StageReport::new(stage);

        for statement in statements {
            report.statements.push(self.run_one(statement).await?);
        }

        Ok(report)
    }

    async fn run_in_transaction(
        &self,
        stage: &str,
        statements: &[Statement],
    ) -> WarehouseResult<StageReport> {
        self.warehouse.execute("BEGIN").await.map_err(|e| {
            WarehouseError::TransactionFailed(format!("Failed to begin {}: {}", stage, e))
        })?;
        debug!("Opened transaction for {}", stage);

        match self.run_each(stage, statements).await {
            Ok(report) => {
                self.warehouse.execute("COMMIT").await.map_err(|e| {
                    WarehouseError::TransactionFailed(format!("Failed to commit {}: {}", stage, e))
                })?;
                info!("Committed {} statements for {}", report.statements.len(), stage);
                Ok(report)
            }
            Err(e) => {
                if let Err(rollback_err) = self.warehouse.execute("ROLLBACK").await {
                    error!("Failed to roll back {}: {}", stage, rollback_err);
                } else {
                    info!("Rolled back {}", stage);
                }
                Err(e)
            }
        }
    }

    async fn run_one(&self, statement: &Statement) -> WarehouseResult<StatementOutcome> {
        debug!("Executing {}", statement.label);
        let start = Instant::now();

        let rows_affected = self
            .warehouse
            .execute(&statement.sql)
            .await
            .map_err(|e| e.with_label(&statement.label))?;

        let elapsed_ms = start.elapsed().as_millis() as u64;
        debug!(
            "{} affected {} rows in {} ms",
            statement.label, rows_affected, elapsed_ms
        );

        Ok(StatementOutcome {
            label: statement.label.clone(),
            rows_affected,
            elapsed_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_report_totals() {
        let report = StageReport {
            stage: "transform".to_string(),
            statements: vec![
                StatementOutcome {
                    label: "insert users_dim".to_string(),
                    rows_affected: 96,
                    elapsed_ms: 12,
                },
                StatementOutcome {
                    label: "insert songs_dim".to_string(),
                    rows_affected: 14_896,
                    elapsed_ms: 30,
                },
            ],
        };

        assert_eq!(report.total_rows(), 14_992);
        assert_eq!(report.total_elapsed_ms(), 42);
        assert_eq!(
            report.outcome("insert users_dim").map(|o| o.rows_affected),
            Some(96)
        );
        assert!(report.outcome("insert time_dim").is_none());
    }
}
