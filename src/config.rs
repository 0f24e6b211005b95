//! Warehouse configuration file support
//!
//! Handles parsing of the `dwh.toml` configuration file and environment
//! variable overrides. The loaded [`WarehouseConfig`] is passed explicitly to
//! every pipeline component; nothing is kept in process-wide state.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::models::Dialect;

/// Default configuration filename
pub const CONFIG_FILENAME: &str = "dwh.toml";

/// Environment variable overrides, keyed by the config key they replace
pub const ENV_HOST: &str = "DWH_HOST";
pub const ENV_DB_NAME: &str = "DWH_DB_NAME";
pub const ENV_DB_USER: &str = "DWH_DB_USER";
pub const ENV_DB_PASSWORD: &str = "DWH_DB_PASSWORD";
pub const ENV_DB_PORT: &str = "DWH_DB_PORT";
pub const ENV_LOG_DATA: &str = "DWH_LOG_DATA";
pub const ENV_LOG_JSONPATH: &str = "DWH_LOG_JSONPATH";
pub const ENV_SONG_DATA: &str = "DWH_SONG_DATA";
pub const ENV_REGION: &str = "DWH_REGION";
pub const ENV_IAM_ROLE_ARN: &str = "DWH_IAM_ROLE_ARN";

static RE_S3_URI: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^s3://[a-z0-9][a-z0-9.\-]{1,61}[a-z0-9](/\S*)?$").expect("Invalid regex"));
static RE_REGION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z]{2}(-[a-z]+)+-\d+$").expect("Invalid regex"));
static RE_IAM_ROLE_ARN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^arn:aws[a-z\-]*:iam::\d{12}:role/[\w+=,.@/\-]+$").expect("Invalid regex")
});

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file missing or unreadable
    #[error("Failed to read config {}: {message}", path.display())]
    Io { path: PathBuf, message: String },

    /// TOML syntax error or missing required key
    #[error("Failed to parse config: {0}")]
    Parse(String),

    /// A key is present but its value is not acceptable
    #[error("Invalid config value for '{key}': {message}")]
    Invalid { key: String, message: String },
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// How statements of one pipeline component are committed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitMode {
    /// Every statement commits on its own
    #[default]
    PerStatement,
    /// All statements of a component run in one transaction
    PerStage,
}

/// How `users_dim` is deduplicated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserDedup {
    /// One row per user, taken from that user's most recent event
    #[default]
    Latest,
    /// `DISTINCT` over the whole row; a user seen with two levels gets two rows
    WholeRow,
}

/// Cluster connection section
#[derive(Clone, Serialize, Deserialize)]
pub struct ClusterSection {
    pub host: String,
    pub db_name: String,
    pub db_user: String,
    pub db_password: String,
    pub db_port: u16,
    /// SQL dialect spoken by the cluster
    #[serde(default)]
    pub dialect: Dialect,
}

impl std::fmt::Debug for ClusterSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterSection")
            .field("host", &self.host)
            .field("db_name", &self.db_name)
            .field("db_user", &self.db_user)
            .field("db_password", &"****")
            .field("db_port", &self.db_port)
            .field("dialect", &self.dialect)
            .finish()
    }
}

impl ClusterSection {
    /// Key/value connection string understood by `tokio_postgres`
    pub fn connection_string(&self) -> String {
        self.render_connection_string(&self.db_password)
    }

    /// Connection string with the password replaced, safe for logs
    pub fn masked_connection_string(&self) -> String {
        self.render_connection_string("****")
    }

    fn render_connection_string(&self, password: &str) -> String {
        format!(
            "host={} dbname={} user={} password={} port={}",
            quote_conn_value(&self.host),
            quote_conn_value(&self.db_name),
            quote_conn_value(&self.db_user),
            quote_conn_value(password),
            self.db_port
        )
    }
}

/// Quote a libpq key/value connection parameter
fn quote_conn_value(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{}'", escaped)
}

/// Object storage locations of the source datasets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Section {
    /// Prefix holding the JSON event logs
    pub log_data: String,
    /// Field-mapping file for the event logs, or `auto`
    pub log_jsonpath: String,
    /// Prefix holding the JSON song metadata
    pub song_data: String,
    pub region: String,
}

/// Role the warehouse assumes to read object storage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IamRoleSection {
    pub arn: String,
}

/// Pipeline behaviour switches
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineSection {
    #[serde(default)]
    pub commit_mode: CommitMode,
    #[serde(default)]
    pub user_dedup: UserDedup,
}

/// Main configuration structure
///
/// Represents the `dwh.toml` configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseConfig {
    pub cluster: ClusterSection,
    pub s3: S3Section,
    pub iam_role: IamRoleSection,
    #[serde(default)]
    pub pipeline: PipelineSection,
}

impl WarehouseConfig {
    /// Load configuration from a file, apply environment overrides and validate
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let mut config = Self::parse(&content)?;
        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Parse configuration from a TOML string
    ///
    /// Missing required keys are reported here; value checks happen in
    /// [`WarehouseConfig::validate`].
    pub fn parse(content: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Convert configuration to a TOML string
    pub fn to_toml(&self) -> ConfigResult<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply overrides from the process environment
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary lookup
    ///
    /// A port override that does not parse is kept as-is so that validation
    /// reports it instead of silently falling back to the file value.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(ENV_HOST) {
            self.cluster.host = host;
        }
        if let Some(db_name) = lookup(ENV_DB_NAME) {
            self.cluster.db_name = db_name;
        }
        if let Some(db_user) = lookup(ENV_DB_USER) {
            self.cluster.db_user = db_user;
        }
        if let Some(db_password) = lookup(ENV_DB_PASSWORD) {
            self.cluster.db_password = db_password;
        }
        if let Some(port) = lookup(ENV_DB_PORT) {
            self.cluster.db_port = port.trim().parse().unwrap_or(0);
        }
        if let Some(log_data) = lookup(ENV_LOG_DATA) {
            self.s3.log_data = log_data;
        }
        if let Some(log_jsonpath) = lookup(ENV_LOG_JSONPATH) {
            self.s3.log_jsonpath = log_jsonpath;
        }
        if let Some(song_data) = lookup(ENV_SONG_DATA) {
            self.s3.song_data = song_data;
        }
        if let Some(region) = lookup(ENV_REGION) {
            self.s3.region = region;
        }
        if let Some(arn) = lookup(ENV_IAM_ROLE_ARN) {
            self.iam_role.arn = arn;
        }
    }

    /// Check every value before any connection is attempted
    pub fn validate(&self) -> ConfigResult<()> {
        require_non_empty("cluster.host", &self.cluster.host)?;
        require_non_empty("cluster.db_name", &self.cluster.db_name)?;
        require_non_empty("cluster.db_user", &self.cluster.db_user)?;
        require_non_empty("cluster.db_password", &self.cluster.db_password)?;
        if self.cluster.db_port == 0 {
            return Err(invalid("cluster.db_port", "must be between 1 and 65535"));
        }

        require_s3_uri("s3.log_data", &self.s3.log_data)?;
        require_s3_uri("s3.song_data", &self.s3.song_data)?;
        if self.s3.log_jsonpath != "auto" {
            require_s3_uri("s3.log_jsonpath", &self.s3.log_jsonpath)?;
        }
        if !RE_REGION.is_match(&self.s3.region) {
            return Err(invalid(
                "s3.region",
                &format!("'{}' is not a region identifier", self.s3.region),
            ));
        }

        if !RE_IAM_ROLE_ARN.is_match(&self.iam_role.arn) {
            return Err(invalid(
                "iam_role.arn",
                &format!("'{}' is not an IAM role ARN", self.iam_role.arn),
            ));
        }

        Ok(())
    }
}

fn invalid(key: &str, message: &str) -> ConfigError {
    ConfigError::Invalid {
        key: key.to_string(),
        message: message.to_string(),
    }
}

fn require_non_empty(key: &str, value: &str) -> ConfigResult<()> {
    if value.trim().is_empty() {
        return Err(invalid(key, "must not be empty"));
    }
    Ok(())
}

fn require_s3_uri(key: &str, value: &str) -> ConfigResult<()> {
    if !RE_S3_URI.is_match(value) {
        return Err(invalid(
            key,
            &format!("'{}' is not an s3:// location", value),
        ));
    }
    Ok(())
}

/// Generate a sample configuration file content
pub fn sample_config() -> &'static str {
    r#"# Songplay warehouse configuration

[cluster]
host = "dwhcluster.abc123xyz789.us-west-2.redshift.amazonaws.com"
db_name = "dwh"
db_user = "dwhuser"
db_password = "change-me"
db_port = 5439
# SQL dialect: "redshift" (default) or "postgres" (local development, no S3 loading)
dialect = "redshift"

[s3]
log_data = "s3://udacity-dend/log_data"
log_jsonpath = "s3://udacity-dend/log_json_path.json"
song_data = "s3://udacity-dend/song_data"
region = "us-west-2"

[iam_role]
arn = "arn:aws:iam::123456789012:role/dwhRole"

[pipeline]
# "per_statement" (default) commits after every statement,
# "per_stage" wraps each component in a single transaction
commit_mode = "per_statement"
# "latest" (default) keeps one row per user, "whole_row" keeps one row per distinct user/level
user_dedup = "latest"
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn sample() -> WarehouseConfig {
        WarehouseConfig::parse(sample_config()).unwrap()
    }

    #[test]
    fn test_sample_config_is_valid() {
        let config = sample();
        assert!(config.validate().is_ok(), "Sample config should validate");
        assert_eq!(config.cluster.db_port, 5439);
        assert_eq!(config.cluster.dialect, Dialect::Redshift);
        assert_eq!(config.pipeline.commit_mode, CommitMode::PerStatement);
        assert_eq!(config.pipeline.user_dedup, UserDedup::Latest);
    }

    #[test]
    fn test_pipeline_section_defaults() {
        let toml = r#"
[cluster]
host = "localhost"
db_name = "dwh"
db_user = "dwh"
db_password = "secret"
db_port = 5432

[s3]
log_data = "s3://bucket/log_data"
log_jsonpath = "auto"
song_data = "s3://bucket/song_data"
region = "eu-central-1"

[iam_role]
arn = "arn:aws:iam::123456789012:role/loader"
"#;
        let config = WarehouseConfig::parse(toml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.pipeline.commit_mode, CommitMode::PerStatement);
        assert_eq!(config.pipeline.user_dedup, UserDedup::Latest);
        assert_eq!(config.cluster.dialect, Dialect::Redshift);
    }

    #[test]
    fn test_missing_key_is_parse_error() {
        let toml = sample_config().replace("db_user = \"dwhuser\"\n", "");
        let err = WarehouseConfig::parse(&toml).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("db_user"));
    }

    #[test]
    fn test_malformed_port_is_parse_error() {
        let toml = sample_config().replace("db_port = 5439", "db_port = \"abc\"");
        assert!(matches!(
            WarehouseConfig::parse(&toml),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = sample();
        config.s3.log_data = "https://bucket/log_data".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("s3.log_data"));

        let mut config = sample();
        config.iam_role.arn = "dwhRole".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("iam_role.arn"));

        let mut config = sample();
        config.cluster.host = "  ".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("cluster.host"));

        let mut config = sample();
        config.s3.region = "".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides() {
        let mut config = sample();
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_HOST, "override-host"),
            (ENV_DB_PASSWORD, "override-secret"),
            (ENV_DB_PORT, "5440"),
            (ENV_IAM_ROLE_ARN, "arn:aws:iam::210987654321:role/other"),
        ]);
        config.apply_overrides_from(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.cluster.host, "override-host");
        assert_eq!(config.cluster.db_password, "override-secret");
        assert_eq!(config.cluster.db_port, 5440);
        assert_eq!(config.iam_role.arn, "arn:aws:iam::210987654321:role/other");
        assert_eq!(config.cluster.db_name, "dwh");
    }

    #[test]
    fn test_unparsable_port_override_fails_validation() {
        let mut config = sample();
        config.apply_overrides_from(|key| (key == ENV_DB_PORT).then(|| "not-a-port".to_string()));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("cluster.db_port"));
    }

    #[test]
    fn test_connection_string_quoting_and_masking() {
        let mut config = sample();
        config.cluster.db_password = "it's secret".to_string();

        let conn = config.cluster.connection_string();
        assert!(conn.contains("password='it\\'s secret'"));
        assert!(conn.contains("port=5439"));

        let masked = config.cluster.masked_connection_string();
        assert!(masked.contains("password='****'"));
        assert!(!masked.contains("secret"));

        let debug = format!("{:?}", config.cluster);
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let err = WarehouseConfig::load(&dir.path().join(CONFIG_FILENAME)).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, sample().to_toml().unwrap()).unwrap();

        let loaded = WarehouseConfig::load(&path).unwrap();
        assert_eq!(loaded.s3.region, "us-west-2");
        assert_eq!(loaded.cluster.dialect, Dialect::Redshift);
    }
}
