//! Command line support shared by the three binaries
//!
//! Each binary is a standalone entry point; the operator runs
//! `create-tables`, then `elt`, then `data-quality`.

pub mod commands;
pub mod error;
pub mod logging;

use clap::{Args, Parser};
use std::path::PathBuf;

use crate::config::{CONFIG_FILENAME, WarehouseConfig};
use error::CliError;
use logging::{LogConfig, LogFormat, LogLevelArg};

/// Arguments accepted by every binary
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Path to the warehouse configuration file
    #[arg(
        long = "config",
        value_name = "PATH",
        env = "DWH_CONFIG",
        default_value = CONFIG_FILENAME
    )]
    pub config: PathBuf,

    /// Explicit log level (overrides -v)
    #[arg(long = "log-level", value_enum)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format
    #[arg(long = "log-format", value_enum, default_value = "pretty")]
    pub log_format: LogFormat,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl CommonArgs {
    pub fn log_config(&self) -> LogConfig {
        let config = LogConfig::from_verbosity(self.verbose).with_format(self.log_format);
        match self.log_level {
            Some(level) => config.with_level(level.into()),
            None => config,
        }
    }

    /// Load, override and validate the configuration file
    pub fn load_config(&self) -> Result<WarehouseConfig, CliError> {
        Ok(WarehouseConfig::load(&self.config)?)
    }
}

/// Drop and recreate all warehouse tables
#[derive(Debug, Parser)]
#[command(name = "create-tables", version)]
pub struct CreateTablesCli {
    #[command(flatten)]
    pub common: CommonArgs,
}

/// Load the staging tables and build the star schema
#[derive(Debug, Parser)]
#[command(name = "elt", version)]
pub struct EltCli {
    #[command(flatten)]
    pub common: CommonArgs,
}

/// Run the data quality checks
#[derive(Debug, Parser)]
#[command(name = "data-quality", version)]
pub struct DataQualityCli {
    #[command(flatten)]
    pub common: CommonArgs,
}

/// Runtime the synchronous command handlers block on
pub(crate) fn runtime() -> Result<tokio::runtime::Runtime, CliError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| CliError::Runtime(format!("Failed to create runtime: {}", e)))
}
