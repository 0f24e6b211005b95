//! Enums for the warehouse data model
//!
//! `Dialect` is read from configuration and `TableRole` is shown in logs; both
//! serialise in lowercase and `Display` the same way.

use serde::{Deserialize, Serialize};

/// SQL dialect used when rendering DDL and deciding which load path is available
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Columnar warehouse with sort/distribution keys and bulk `COPY` from object storage
    #[default]
    Redshift,
    /// Plain PostgreSQL, used for local development and end-to-end tests
    Postgres,
}

impl Dialect {
    /// Whether bulk loading straight from object storage is available
    pub fn supports_object_storage_copy(&self) -> bool {
        matches!(self, Dialect::Redshift)
    }

    /// Whether sort/distribution placement hints are rendered in DDL
    pub fn supports_placement_hints(&self) -> bool {
        matches!(self, Dialect::Redshift)
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dialect::Redshift => write!(f, "redshift"),
            Dialect::Postgres => write!(f, "postgres"),
        }
    }
}

/// Role a table plays in the star schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableRole {
    /// Landing table, truncated and reloaded every run
    Staging,
    Fact,
    Dimension,
}

impl std::fmt::Display for TableRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableRole::Staging => write!(f, "staging"),
            TableRole::Fact => write!(f, "fact"),
            TableRole::Dimension => write!(f, "dimension"),
        }
    }
}
