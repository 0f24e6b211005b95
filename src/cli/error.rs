//! CLI-specific error types

use thiserror::Error;

use crate::config::ConfigError;
use crate::validation::QualityError;
use crate::warehouse::WarehouseError;

/// CLI-specific error type
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Warehouse error: {0}")]
    Warehouse(#[from] WarehouseError),

    #[error("Data quality error: {0}")]
    Quality(#[from] QualityError),

    #[error("Runtime error: {0}")]
    Runtime(String),

    #[error("Logging error: {0}")]
    Logging(String),
}
