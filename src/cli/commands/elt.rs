//! `elt`: load the staging tables, then transform them into the star schema

use tracing::{Instrument, info};

use crate::cli::{CommonArgs, error::CliError, runtime};
use crate::config::WarehouseConfig;
use crate::pipeline::{StageReport, Stager, Transformer, run_span};
use crate::warehouse::{PostgresWarehouse, Warehouse};

/// Stage then transform; the transform never starts if loading fails
///
/// # Returns
/// The load and transform reports, in that order
pub async fn run_elt(
    warehouse: &dyn Warehouse,
    config: &WarehouseConfig,
) -> Result<(StageReport, StageReport), CliError> {
    let loaded = Stager::new(warehouse, config).load().await?;
    info!(
        "Staged {} rows in {} ms",
        loaded.total_rows(),
        loaded.total_elapsed_ms()
    );

    let transformed = Transformer::new(warehouse, config).transform().await?;
    info!(
        "Inserted {} rows in {} ms",
        transformed.total_rows(),
        transformed.total_elapsed_ms()
    );

    Ok((loaded, transformed))
}

pub fn handle_elt(args: &CommonArgs) -> Result<(), CliError> {
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

            run_elt(&warehouse, &config).await?;
            Ok(())
        }
        .instrument(run_span("elt")),
    )
}
