//! Bulk loads the source datasets from object storage into staging tables

use tracing::info;

use super::runner::{StageReport, Statement, StatementRunner};
use crate::config::{IamRoleSection, S3Section, WarehouseConfig};
use crate::warehouse::schema::{STAGING_EVENTS, STAGING_SONGS};
use crate::warehouse::{Warehouse, WarehouseError, WarehouseResult};

/// Render a SQL string literal, doubling embedded single quotes
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// `COPY` of the event logs
///
/// Uses the configured field-mapping file (or `auto`) and parses `ts` as
/// epoch milliseconds.
pub fn copy_events_statement(s3: &S3Section, iam_role: &IamRoleSection) -> Statement {
    let sql = format!(
        "COPY {table} FROM {source}\n    CREDENTIALS {credentials}\n    FORMAT AS JSON {jsonpath}\n    REGION {region}\n    TIMEFORMAT AS 'epochmillisecs';",
        table = STAGING_EVENTS,
        source = quote_literal(&s3.log_data),
        credentials = quote_literal(&format!("aws_iam_role={}", iam_role.arn)),
        jsonpath = quote_literal(&s3.log_jsonpath),
        region = quote_literal(&s3.region),
    );
    Statement::new(format!("copy {}", STAGING_EVENTS), sql)
}

/// `COPY` of the song metadata with an inferred JSON layout
pub fn copy_songs_statement(s3: &S3Section, iam_role: &IamRoleSection) -> Statement {
    let sql = format!(
        "COPY {table} FROM {source}\n    CREDENTIALS {credentials}\n    JSON 'auto'\n    REGION {region};",
        table = STAGING_SONGS,
        source = quote_literal(&s3.song_data),
        credentials = quote_literal(&format!("aws_iam_role={}", iam_role.arn)),
        region = quote_literal(&s3.region),
    );
    Statement::new(format!("copy {}", STAGING_SONGS), sql)
}

pub struct Stager<'a> {
    runner: StatementRunner<'a>,
    config: &'a WarehouseConfig,
}

impl<'a> Stager<'a> {
    pub fn new(warehouse: &'a dyn Warehouse, config: &'a WarehouseConfig) -> Self {
        Self {
            runner: StatementRunner::new(warehouse, config.pipeline.commit_mode),
            config,
        }
    }

    /// Statements issued by [`Stager::load`], events first
    pub fn statements(&self) -> Vec<Statement> {
        vec![
            copy_events_statement(&self.config.s3, &self.config.iam_role),
            copy_songs_statement(&self.config.s3, &self.config.iam_role),
        ]
    }

    /// Load both staging tables
    ///
    /// Malformed source records abort the corresponding load; no error
    /// tolerance is configured.
    pub async fn load(&self) -> WarehouseResult<StageReport> {
        let dialect = self.config.cluster.dialect;
        if !dialect.supports_object_storage_copy() {
            return Err(WarehouseError::Unsupported(format!(
                "loading from object storage is not available for the {} dialect",
                dialect
            )));
        }

        info!(
            "Loading staging tables from {} and {}",
            self.config.s3.log_data, self.config.s3.song_data
        );
        let report = self.runner.run("load", &self.statements()).await?;
        for outcome in &report.statements {
            info!(
                "{}: {} rows in {} ms",
                outcome.label, outcome.rows_affected, outcome.elapsed_ms
            );
        }

        Ok(report)
    }
}
