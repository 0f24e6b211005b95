//! Songplay warehouse - ELT pipeline for a song-play star schema
//!
//! Provides:
//! - Typed configuration loaded from `dwh.toml` with environment overrides
//! - A table catalogue rendered to DDL per SQL dialect
//! - Schema management, bulk staging and set-based transforms
//! - Post-load data quality checks
//!
//! The `create-tables`, `elt` and `data-quality` binaries are thin wrappers
//! over [`cli::commands`].

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod models;
pub mod pipeline;
pub mod validation;
pub mod warehouse;

pub use config::{CommitMode, ConfigError, UserDedup, WarehouseConfig};
pub use models::{ColumnDef, ColumnType, Dialect, TableDef, TableRole};
pub use pipeline::{SchemaManager, StageReport, Stager, Transformer};
pub use validation::{
    CheckResult, CheckStatus, DataQualityValidator, QualityCheck, QualityError, ValidationReport,
};
pub use warehouse::{PostgresWarehouse, QueryResult, Warehouse, WarehouseError, WarehouseResult};
