//! Models for the warehouse star schema
//!
//! Tables are described as data and rendered to DDL per dialect, so the
//! catalogue in [`crate::warehouse::schema`] stays the single source of truth
//! for names, keys and placement hints.

pub mod column;
pub mod enums;
pub mod table;

pub use column::{ColumnDef, ColumnType};
pub use enums::{Dialect, TableRole};
pub use table::TableDef;
