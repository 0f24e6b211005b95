//! Validation functionality
//!
//! Post-load data quality checks over the star schema.

pub mod quality;

pub use quality::{
    CheckKind, CheckResult, CheckStatus, DataQualityValidator, QualityCheck, QualityError,
    QualityResult, ValidationReport,
};
