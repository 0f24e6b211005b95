//! `data-quality`: run the quality checks and fail if any check fails or errors

use tracing::{Instrument, info};

use crate::cli::{CommonArgs, error::CliError, runtime};
use crate::pipeline::run_span;
use crate::validation::{DataQualityValidator, ValidationReport};
use crate::warehouse::{PostgresWarehouse, Warehouse};

/// Run the standard battery against a connection
pub async fn run_data_quality(warehouse: &dyn Warehouse) -> Result<ValidationReport, CliError> {
    let report = DataQualityValidator::new(warehouse).run_checks().await?;
    Ok(report)
}

pub fn handle_data_quality(args: &CommonArgs) -> Result<(), CliError> {
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

            let report = run_data_quality(&warehouse).await?;
            info!(
                "{} checks passed in {} ms",
                report.passed_count(),
                (report.finished_at - report.started_at).num_milliseconds()
            );
            Ok(())
        }
        .instrument(run_span("data_quality")),
    )
}
