//! `create-tables`: drop and recreate the warehouse schema

use tracing::{Instrument, info};

use crate::cli::{CommonArgs, error::CliError, runtime};
use crate::config::WarehouseConfig;
use crate::pipeline::{SchemaManager, StageReport, run_span};
use crate::warehouse::{PostgresWarehouse, Warehouse};

/// Drop every table, then create every table
///
/// # Returns
/// The drop and create reports, in that order
pub async fn run_create_tables(
    warehouse: &dyn Warehouse,
    config: &WarehouseConfig,
) -> Result<(StageReport, StageReport), CliError> {
    let manager = SchemaManager::new(warehouse, config);
    let dropped = manager.drop_all().await?;
    let created = manager.create_all().await?;
    Ok((dropped, created))
}

pub fn handle_create_tables(args: &CommonArgs) -> Result<(), CliError> {
    let config = args.load_config()?;
    let rt = runtime()?;

    rt.block_on(
        async {
            let warehouse = PostgresWarehouse::connect(&config.cluster).await?;
            info!(
                "Connected to {} warehouse at {}",
                warehouse.backend_type(),
                warehouse.connection_string_masked()
            );

            run_create_tables(&warehouse, &config).await?;
            info!("Schema ready");
            Ok(())
        }
        .instrument(run_span("create_tables")),
    )
}
