//! CLI command implementations
//!
//! Each `handle_*` function loads the configuration, connects, and blocks
//! on the matching `run_*` function. The `run_*` functions take any
//! [`crate::warehouse::Warehouse`] so they can be driven without a cluster.

pub mod create_tables;
pub mod elt;
pub mod quality;
