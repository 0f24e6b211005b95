//! Data quality checks against the populated star schema
//!
//! A fixed, ordered battery of SQL assertions. Every check runs even when an
//! earlier one fails; the terminal failure is raised only after the whole
//! summary has been logged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::pipeline::transformer::epoch_millis_to_timestamp;
use crate::warehouse::schema::{SONGPLAYS_FACT, SONGS_DIM, STAGING_EVENTS};
use crate::warehouse::{QueryResult, Warehouse, WarehouseError, WarehouseResult};

/// Message recorded for a check with nothing to report
pub const NO_ISSUES_MESSAGE: &str = "No issues found.";

/// Terminal validation failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QualityError {
    /// At least one check found violations; takes precedence over errors
    #[error("One or more data quality checks failed. See the summary above for details.")]
    ChecksFailed { failed: usize, errored: usize },

    /// No check failed, but at least one could not run
    #[error("One or more data quality checks encountered an error. See the summary above for details.")]
    ChecksErrored { errored: usize },
}

/// Result type for validation
pub type QualityResult<T> = Result<T, QualityError>;

/// How a check's query result is turned into an issue count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    /// The query returns a single `COUNT(*)` value
    ScalarCount,
    /// Every returned row is one issue
    RowCount,
}

/// One SQL assertion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityCheck {
    pub description: String,
    pub sql: String,
    pub kind: CheckKind,
}

impl QualityCheck {
    pub fn new(description: impl Into<String>, sql: impl Into<String>, kind: CheckKind) -> Self {
        Self {
            description: description.into(),
            sql: sql.into(),
            kind,
        }
    }

    /// Fact rows missing a user, song, artist or start time
    ///
    /// Unmatched plays legitimately carry null song/artist ids, so this can
    /// report issues on a correct load.
    pub fn null_values() -> Self {
        Self::new(
            format!("Null values in {}", SONGPLAYS_FACT),
            format!(
                "SELECT COUNT(*)\n\
                 FROM {}\n\
                 WHERE user_id IS NULL OR song_id IS NULL OR artist_id IS NULL OR start_time IS NULL;",
                SONGPLAYS_FACT
            ),
            CheckKind::ScalarCount,
        )
    }

    /// Songs released before 1900 or after the current year
    ///
    /// A year of 0 marks an unknown release year and is not counted.
    pub fn year_consistency() -> Self {
        Self::new(
            format!("Year consistency in {}", SONGS_DIM),
            format!(
                "SELECT COUNT(*)\n\
                 FROM {}\n\
                 WHERE year <> 0 AND (year < 1900 OR year > EXTRACT(YEAR FROM CURRENT_DATE));",
                SONGS_DIM
            ),
            CheckKind::ScalarCount,
        )
    }

    /// Fact rows whose start time cannot be recomputed from the events
    ///
    /// The inner join can never produce a null `sp.start_time`, so this
    /// check always passes. It is kept so summaries stay comparable across runs.
    pub fn start_time_accuracy() -> Self {
        Self::new(
            format!("Start time accuracy in {}", SONGPLAYS_FACT),
            format!(
                "SELECT COUNT(*)\n\
                 FROM {} sp\n\
                 JOIN {} se ON sp.start_time = {}\n\
                 WHERE sp.start_time IS NULL;",
                SONGPLAYS_FACT,
                STAGING_EVENTS,
                epoch_millis_to_timestamp("se.ts")
            ),
            CheckKind::ScalarCount,
        )
    }

    /// Song ids appearing more than once; each duplicate group is one issue
    pub fn unique_song_ids() -> Self {
        Self::new(
            format!("Unique song IDs in {}", SONGS_DIM),
            format!(
                "SELECT song_id, COUNT(*)\n\
                 FROM {}\n\
                 GROUP BY song_id\n\
                 HAVING COUNT(*) > 1;",
                SONGS_DIM
            ),
            CheckKind::RowCount,
        )
    }

    /// The standard battery, in execution order
    pub fn default_checks() -> Vec<Self> {
        vec![
            Self::null_values(),
            Self::year_consistency(),
            Self::start_time_accuracy(),
            Self::unique_song_ids(),
        ]
    }

    /// Number of issues reported by a successful query
    fn issue_count(&self, result: &QueryResult) -> WarehouseResult<i64> {
        match self.kind {
            CheckKind::ScalarCount => result.scalar_i64(),
            CheckKind::RowCount => Ok(result.row_count() as i64),
        }
    }
}

/// Outcome of a single check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckStatus {
    Passed,
    /// The check ran and found violations
    Failed,
    /// The check itself could not run
    Error,
}

impl std::fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckStatus::Passed => write!(f, "Passed"),
            CheckStatus::Failed => write!(f, "Failed"),
            CheckStatus::Error => write!(f, "Error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub description: String,
    pub status: CheckStatus,
    pub message: String,
    /// Issue count, absent when the check errored
    pub issues: Option<i64>,
}

impl CheckResult {
    pub fn passed(description: &str) -> Self {
        Self {
            description: description.to_string(),
            status: CheckStatus::Passed,
            message: NO_ISSUES_MESSAGE.to_string(),
            issues: Some(0),
        }
    }

    pub fn failed(description: &str, issues: i64) -> Self {
        Self {
            description: description.to_string(),
            status: CheckStatus::Failed,
            message: format!("Issues found: {}", issues),
            issues: Some(issues),
        }
    }

    pub fn errored(description: &str, message: impl Into<String>) -> Self {
        Self {
            description: description.to_string(),
            status: CheckStatus::Error,
            message: message.into(),
            issues: None,
        }
    }

    /// `description: status - message`
    pub fn summary_line(&self) -> String {
        format!("{}: {} - {}", self.description, self.status, self.message)
    }
}

/// Ordered results of one validation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub results: Vec<CheckResult>,
}

impl ValidationReport {
    fn count(&self, status: CheckStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }

    pub fn passed_count(&self) -> usize {
        self.count(CheckStatus::Passed)
    }

    pub fn failed_count(&self) -> usize {
        self.count(CheckStatus::Failed)
    }

    pub fn errored_count(&self) -> usize {
        self.count(CheckStatus::Error)
    }

    pub fn summary_lines(&self) -> Vec<String> {
        self.results.iter().map(CheckResult::summary_line).collect()
    }

    /// Aggregate the run into success or a terminal failure
    ///
    /// Failed checks take precedence over errored ones.
    pub fn outcome(&self) -> QualityResult<()> {
        let failed = self.failed_count();
        let errored = self.errored_count();

        if failed > 0 {
            Err(QualityError::ChecksFailed { failed, errored })
        } else if errored > 0 {
            Err(QualityError::ChecksErrored { errored })
        } else {
            Ok(())
        }
    }
}

/// Runs quality checks against a warehouse connection
pub struct DataQualityValidator<'a> {
    warehouse: &'a dyn Warehouse,
    checks: Vec<QualityCheck>,
}

impl<'a> DataQualityValidator<'a> {
    /// Validator with the standard battery
    pub fn new(warehouse: &'a dyn Warehouse) -> Self {
        Self::with_checks(warehouse, QualityCheck::default_checks())
    }

    pub fn with_checks(warehouse: &'a dyn Warehouse, checks: Vec<QualityCheck>) -> Self {
        Self { warehouse, checks }
    }

    pub fn checks(&self) -> &[QualityCheck] {
        &self.checks
    }

    /// Run one check, mapping any query error to an `Error` status
    pub async fn run_check(&self, check: &QualityCheck) -> CheckResult {
        let issues = match self.warehouse.query(&check.sql).await {
            Ok(result) => check.issue_count(&result),
            Err(e) => Err(e),
        };

        match issues {
            Ok(count) if count > 0 => {
                warn!(
                    "Data quality check failed: {}. Issues found: {}",
                    check.description, count
                );
                CheckResult::failed(&check.description, count)
            }
            Ok(_) => {
                info!("Data quality check passed: {}", check.description);
                CheckResult::passed(&check.description)
            }
            Err(e) => {
                let message = engine_message(e);
                error!(
                    "Error running data quality check: {}. Error: {}",
                    check.description, message
                );
                CheckResult::errored(&check.description, message)
            }
        }
    }

    /// Run every check in order and collect the results without failing
    pub async fn collect(&self) -> ValidationReport {
        info!("Running {} data quality checks", self.checks.len());
        let started_at = Utc::now();

        let mut results = Vec::with_capacity(self.checks.len());
        for check in &self.checks {
            results.push(self.run_check(check).await);
        }

        ValidationReport {
            started_at,
            finished_at: Utc::now(),
            results,
        }
    }

    /// Run every check, log the summary, then raise if anything failed or errored
    pub async fn run_checks(&self) -> QualityResult<ValidationReport> {
        let report = self.collect().await;

        info!("Data quality checks summary:");
        for line in report.summary_lines() {
            info!("{}", line);
        }

        report.outcome()?;
        info!("All data quality checks passed successfully.");
        Ok(report)
    }
}

/// Error text as reported by the engine, without our own wrapping
fn engine_message(error: WarehouseError) -> String {
    match error {
        WarehouseError::StatementFailed { message, .. } => message,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(statuses: &[CheckStatus]) -> ValidationReport {
        let now = Utc::now();
        ValidationReport {
            started_at: now,
            finished_at: now,
            results: statuses
                .iter()
                .enumerate()
                .map(|(i, status)| {
                    let description = format!("check {}", i);
                    match status {
                        CheckStatus::Passed => CheckResult::passed(&description),
                        CheckStatus::Failed => CheckResult::failed(&description, 3),
                        CheckStatus::Error => CheckResult::errored(&description, "boom"),
                    }
                })
                .collect(),
        }
    }

    #[test]
    fn test_default_checks() {
        let descriptions: Vec<String> = QualityCheck::default_checks()
            .into_iter()
            .map(|c| c.description)
            .collect();
        assert_eq!(
            descriptions,
            vec![
                "Null values in songplays_fact",
                "Year consistency in songs_dim",
                "Start time accuracy in songplays_fact",
                "Unique song IDs in songs_dim",
            ]
        );
        assert_eq!(QualityCheck::unique_song_ids().kind, CheckKind::RowCount);
        assert_eq!(QualityCheck::null_values().kind, CheckKind::ScalarCount);
    }

    #[test]
    fn test_outcome_all_passed() {
        let report = report(&[CheckStatus::Passed, CheckStatus::Passed]);
        assert!(report.outcome().is_ok());
        assert_eq!(report.passed_count(), 2);
    }

    #[test]
    fn test_outcome_failed_takes_precedence() {
        let report = report(&[CheckStatus::Error, CheckStatus::Failed, CheckStatus::Passed]);
        assert_eq!(
            report.outcome(),
            Err(QualityError::ChecksFailed {
                failed: 1,
                errored: 1
            })
        );
    }

    #[test]
    fn test_outcome_errored_only() {
        let report = report(&[CheckStatus::Passed, CheckStatus::Error]);
        let err = report.outcome().unwrap_err();
        assert_eq!(err, QualityError::ChecksErrored { errored: 1 });
        assert_eq!(
            err.to_string(),
            "One or more data quality checks encountered an error. See the summary above for details."
        );
    }

    #[test]
    fn test_summary_lines() {
        let report = report(&[CheckStatus::Passed, CheckStatus::Failed, CheckStatus::Error]);
        assert_eq!(
            report.summary_lines(),
            vec![
                "check 0: Passed - No issues found.",
                "check 1: Failed - Issues found: 3",
                "check 2: Error - boom",
            ]
        );
    }

    #[test]
    fn test_issue_count_by_kind() {
        let scalar = QueryResult::scalar("count", serde_json::json!(4));
        assert_eq!(QualityCheck::null_values().issue_count(&scalar).unwrap(), 4);

        let rows = QueryResult::new(
            vec!["song_id".to_string(), "count".to_string()],
            vec![
                serde_json::json!({"song_id": "A", "count": 2}),
                serde_json::json!({"song_id": "B", "count": 3}),
            ],
        );
        assert_eq!(QualityCheck::unique_song_ids().issue_count(&rows).unwrap(), 2);
        assert_eq!(
            QualityCheck::unique_song_ids()
                .issue_count(&QueryResult::empty())
                .unwrap(),
            0
        );
    }

    #[test]
    fn test_report_serializes() {
        let report = report(&[CheckStatus::Failed]);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["results"][0]["status"], "Failed");
        assert_eq!(json["results"][0]["issues"], 3);
    }
}
