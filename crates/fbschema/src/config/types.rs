//! Configuration type definitions.

use serde::{Deserialize, Serialize};

/// Root configuration structure.
///
/// Every section has defaults, so an empty document (or no file at all)
/// is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Connection settings used when creating a database in build mode.
    #[serde(default)]
    pub connection: ConnectionSettings,

    /// Build workflow settings.
    #[serde(default)]
    pub build: BuildConfig,

    /// Script classification settings.
    #[serde(default)]
    pub scripts: ScriptsConfig,

    /// Where error.log and report.txt are written.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Firebird connection settings for database creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionSettings {
    /// Server host. `None` creates the database through a local connection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    /// Server port (default: 3050).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Username (default: SYSDBA).
    #[serde(default = "default_user")]
    pub user: String,

    /// Password (default: masterkey).
    #[serde(default = "default_password")]
    pub password: String,

    /// Connection character set (default: UTF8).
    #[serde(default = "default_charset")]
    pub charset: String,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            host: None,
            port: default_port(),
            user: default_user(),
            password: default_password(),
            charset: default_charset(),
        }
    }
}

/// Build workflow configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Database file name created inside `--db-dir` (default: schema.fdb).
    #[serde(default = "default_database_file")]
    pub database_file: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            database_file: default_database_file(),
        }
    }
}

/// Script classification configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScriptsConfig {
    /// What to do with a file whose name matches several phase keywords.
    #[serde(default)]
    pub multi_match: MultiMatchPolicy,
}

/// Policy for script names matching more than one phase keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiMatchPolicy {
    /// Refuse to classify the directory.
    #[default]
    Reject,

    /// Keep only the highest-priority phase (domain, then table, then procedure).
    FirstMatch,

    /// Run the file in every matching phase.
    AllMatches,
}

/// Output file configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory for error.log and report.txt (default: current directory).
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
        }
    }
}

// Default value functions for serde
fn default_port() -> u16 {
    3050
}

fn default_user() -> String {
    "SYSDBA".to_string()
}

fn default_password() -> String {
    "masterkey".to_string()
}

fn default_charset() -> String {
    "UTF8".to_string()
}

fn default_database_file() -> String {
    "schema.fdb".to_string()
}

fn default_log_dir() -> String {
    ".".to_string()
}
