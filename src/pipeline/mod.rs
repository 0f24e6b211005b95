//! Pipeline components, in the order they run
//!
//! - [`SchemaManager`]: drop and recreate the seven tables
//! - [`Stager`]: bulk load the staging tables from object storage
//! - [`Transformer`]: populate the dimension and fact tables
//!
//! Every component executes its statements through a [`StatementRunner`],
//! which applies the configured commit mode.

pub mod runner;
pub mod schema_manager;
pub mod stager;
pub mod transformer;

pub use runner::{StageReport, Statement, StatementOutcome, StatementRunner};
pub use schema_manager::SchemaManager;
pub use stager::Stager;
pub use transformer::Transformer;

use tracing::{Span, info_span};
use uuid::Uuid;

/// Span for one invocation of an entry point, tagged with a fresh run id
pub fn run_span(stage: &str) -> Span {
    let run_id = Uuid::new_v4();
    info_span!("run", run_id = %run_id, stage = stage)
}
