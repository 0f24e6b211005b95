//! Load the staging tables, then build the star schema from them

use clap::Parser;
use songplay_warehouse::cli::EltCli;
use songplay_warehouse::cli::commands::elt::handle_elt;
use songplay_warehouse::cli::logging::init_logging;

fn main() {
    let cli = EltCli::parse();

    if let Err(e) = init_logging(&cli.common.log_config()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = handle_elt(&cli.common) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}
