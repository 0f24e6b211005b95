//! Column model for warehouse tables

use serde::{Deserialize, Serialize};

use super::enums::Dialect;

/// Physical column type
///
/// Types are kept close to what the warehouse declares so that the rendered
/// DDL matches the source JSON field widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Integer,
    BigInt,
    /// Single precision float (`FLOAT4`)
    Real,
    Double,
    Varchar(u16),
    /// Widest variable-length string the warehouse allows
    VarcharMax,
    Text,
    Timestamp,
}

impl ColumnType {
    /// Render the type for the given dialect
    pub fn render(&self, dialect: Dialect) -> String {
        match (self, dialect) {
            (ColumnType::Integer, _) => "INTEGER".to_string(),
            (ColumnType::BigInt, _) => "BIGINT".to_string(),
            (ColumnType::Real, Dialect::Redshift) => "FLOAT4".to_string(),
            (ColumnType::Real, Dialect::Postgres) => "REAL".to_string(),
            (ColumnType::Double, _) => "DOUBLE PRECISION".to_string(),
            (ColumnType::Varchar(width), _) => format!("VARCHAR({})", width),
            (ColumnType::VarcharMax, Dialect::Redshift) => "VARCHAR(MAX)".to_string(),
            (ColumnType::VarcharMax, Dialect::Postgres) => "TEXT".to_string(),
            (ColumnType::Text, _) => "TEXT".to_string(),
            (ColumnType::Timestamp, _) => "TIMESTAMP".to_string(),
        }
    }
}

/// Column model representing a field in a warehouse table
///
/// Besides name and type a column carries the constraints and storage
/// placement hints that end up in the `CREATE TABLE` statement.
///
/// # Example
///
/// ```rust
/// use songplay_warehouse::models::{ColumnDef, ColumnType};
///
/// let column = ColumnDef::new("user_id", ColumnType::Integer)
///     .primary_key()
///     .sort_key();
/// assert!(column.primary_key);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Column name
    pub name: String,
    /// Physical type
    pub column_type: ColumnType,
    /// Whether this column is the (declared, unenforced) primary key
    #[serde(default)]
    pub primary_key: bool,
    /// Auto-incrementing surrogate key starting at 0
    #[serde(default)]
    pub identity: bool,
    /// Storage is ordered by this column
    #[serde(default)]
    pub sort_key: bool,
    /// Rows are distributed across nodes by this column
    #[serde(default)]
    pub dist_key: bool,
}

impl ColumnDef {
    /// Create a plain nullable column
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            primary_key: false,
            identity: false,
            sort_key: false,
            dist_key: false,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn identity(mut self) -> Self {
        self.identity = true;
        self
    }

    pub fn sort_key(mut self) -> Self {
        self.sort_key = true;
        self
    }

    pub fn dist_key(mut self) -> Self {
        self.dist_key = true;
        self
    }

    /// Render the column definition line used inside `CREATE TABLE`
    pub fn render(&self, dialect: Dialect) -> String {
        let mut parts = vec![self.name.clone()];

        if self.identity {
            match dialect {
                Dialect::Redshift => {
                    parts.push(format!("{} IDENTITY(0, 1)", self.column_type.render(dialect)))
                }
                Dialect::Postgres => parts.push(format!(
                    "{} GENERATED BY DEFAULT AS IDENTITY (START WITH 0 MINVALUE 0)",
                    self.column_type.render(dialect)
                )),
            }
        } else {
            parts.push(self.column_type.render(dialect));
        }

        if self.primary_key {
            parts.push("PRIMARY KEY".to_string());
        }

        if dialect.supports_placement_hints() {
            if self.dist_key {
                parts.push("DISTKEY".to_string());
            }
            if self.sort_key {
                parts.push("SORTKEY".to_string());
            }
        }

        parts.join(" ")
    }
}
