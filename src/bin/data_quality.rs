//! Run the data quality checks against the star schema
//!
//! Exits with status 1 when any check fails or cannot run.

use clap::Parser;
use songplay_warehouse::cli::DataQualityCli;
use songplay_warehouse::cli::commands::quality::handle_data_quality;
use songplay_warehouse::cli::logging::init_logging;

fn main() {
    let cli = DataQualityCli::parse();

    if let Err(e) = init_logging(&cli.common.log_config()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = handle_data_quality(&cli.common) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}
