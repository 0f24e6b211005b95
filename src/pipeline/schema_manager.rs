//! Drops and recreates the seven warehouse tables
//!
//! Destructive: any data in the staging, fact and dimension tables is lost.

use tracing::info;

use super::runner::{StageReport, Statement, StatementRunner};
use crate::config::WarehouseConfig;
use crate::models::{Dialect, TableDef, TableRole};
use crate::warehouse::{Warehouse, WarehouseResult, WarehouseSchema};

/// `DROP TABLE IF EXISTS` for every table, in catalogue order
pub fn drop_statements() -> Vec<Statement> {
    WarehouseSchema::tables()
        .iter()
        .map(|t| Statement::new(format!("drop {}", t.name), t.drop_sql()))
        .collect()
}

/// `CREATE TABLE` for every table, in catalogue order
pub fn create_statements(dialect: Dialect) -> Vec<Statement> {
    WarehouseSchema::tables()
        .iter()
        .map(|t| Statement::new(format!("create {}", t.name), t.create_sql(dialect)))
        .collect()
}

/// Table counts per role, e.g. `2 staging, 1 fact, 4 dimension`
pub fn role_summary(tables: &[TableDef]) -> String {
    [TableRole::Staging, TableRole::Fact, TableRole::Dimension]
        .iter()
        .map(|role| {
            let count = tables.iter().filter(|t| t.role == *role).count();
            format!("{} {}", count, role)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

pub struct SchemaManager<'a> {
    runner: StatementRunner<'a>,
    dialect: Dialect,
}

impl<'a> SchemaManager<'a> {
    pub fn new(warehouse: &'a dyn Warehouse, config: &WarehouseConfig) -> Self {
        Self {
            runner: StatementRunner::new(warehouse, config.pipeline.commit_mode),
            dialect: config.cluster.dialect,
        }
    }

    /// Drop all seven tables
    ///
    /// Missing tables are tolerated; any other failure stops the remaining drops.
    pub async fn drop_all(&self) -> WarehouseResult<StageReport> {
        info!("Dropping warehouse tables");
        let report = self.runner.run("drop_all", &drop_statements()).await?;
        info!(
            "Dropped {} tables ({})",
            report.statements.len(),
            role_summary(&WarehouseSchema::tables())
        );
        Ok(report)
    }

    /// Create all seven tables with keys and placement hints for the dialect
    pub async fn create_all(&self) -> WarehouseResult<StageReport> {
        info!("Creating warehouse tables ({} dialect)", self.dialect);
        let report = self
            .runner
            .run("create_all", &create_statements(self.dialect))
            .await?;
        info!(
            "Created {} tables ({})",
            report.statements.len(),
            role_summary(&WarehouseSchema::tables())
        );
        Ok(report)
    }
}
