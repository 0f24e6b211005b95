//! Drop and recreate the warehouse tables

use clap::Parser;
use songplay_warehouse::cli::CreateTablesCli;
use songplay_warehouse::cli::commands::create_tables::handle_create_tables;
use songplay_warehouse::cli::logging::init_logging;

fn main() {
    let cli = CreateTablesCli::parse();

    if let Err(e) = init_logging(&cli.common.log_config()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = handle_create_tables(&cli.common) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}
