//! Table model for warehouse tables

use serde::{Deserialize, Serialize};

use super::column::ColumnDef;
use super::enums::{Dialect, TableRole};

/// Table model representing one staging, fact or dimension table
///
/// # Example
///
/// ```rust
/// use songplay_warehouse::models::{ColumnDef, ColumnType, Dialect, TableDef, TableRole};
///
/// let table = TableDef::new(
///     "time_dim",
///     TableRole::Dimension,
///     vec![ColumnDef::new("start_time", ColumnType::Timestamp).primary_key().sort_key()],
/// );
/// assert!(table.create_sql(Dialect::Redshift).contains("SORTKEY"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDef {
    /// Table name
    pub name: String,
    /// Role in the star schema
    pub role: TableRole,
    /// Columns in declaration order
    pub columns: Vec<ColumnDef>,
}

impl TableDef {
    pub fn new(name: impl Into<String>, role: TableRole, columns: Vec<ColumnDef>) -> Self {
        Self {
            name: name.into(),
            role,
            columns,
        }
    }

    /// Name of the primary key column, if one is declared
    pub fn primary_key(&self) -> Option<&str> {
        self.columns
            .iter()
            .find(|c| c.primary_key)
            .map(|c| c.name.as_str())
    }

    /// Columns storage is ordered by
    pub fn sort_keys(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.sort_key)
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Column rows are distributed by
    pub fn dist_key(&self) -> Option<&str> {
        self.columns
            .iter()
            .find(|c| c.dist_key)
            .map(|c| c.name.as_str())
    }

    /// Comma separated column list for an `INSERT`
    ///
    /// Identity columns are filled by the engine and are left out.
    pub fn insert_columns(&self) -> String {
        self.columns
            .iter()
            .filter(|c| !c.identity)
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `DROP TABLE IF EXISTS` statement
    pub fn drop_sql(&self) -> String {
        format!("DROP TABLE IF EXISTS {};", self.name)
    }

    /// `CREATE TABLE` statement for the given dialect
    pub fn create_sql(&self, dialect: Dialect) -> String {
        let columns: Vec<String> = self
            .columns
            .iter()
            .map(|c| format!("    {}", c.render(dialect)))
            .collect();

        format!(
            "CREATE TABLE {}\n(\n{}\n);",
            self.name,
            columns.join(",\n")
        )
    }
}
