//! Configuration loading and validation.

mod types;
mod validation;

pub use types::*;

use crate::error::Result;
use std::path::{Path, PathBuf};

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    ///
    /// An empty document yields the defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = if yaml.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Serialize to YAML (used by `init`).
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }

    /// Directory for error.log and report.txt.
    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.output.log_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_yaml_is_default() {
        let config = Config::from_yaml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.connection.port, 3050);
        assert_eq!(config.build.database_file, "schema.fdb");
        assert_eq!(config.scripts.multi_match, MultiMatchPolicy::Reject);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
connection:
  host: db.internal
  password: secret
scripts:
  multi_match: first_match
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.connection.host.as_deref(), Some("db.internal"));
        assert_eq!(config.connection.user, "SYSDBA");
        assert_eq!(config.connection.password, "secret");
        assert_eq!(config.scripts.multi_match, MultiMatchPolicy::FirstMatch);
        assert_eq!(config.output.log_dir, ".");
    }

    #[test]
    fn test_unknown_policy_is_rejected() {
        let yaml = "scripts:\n  multi_match: sometimes\n";
        assert!(Config::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_invalid_values_fail_validation() {
        let yaml = "build:\n  database_file: ''\n";
        assert!(Config::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_yaml_round_trip() {
        let mut config = Config::default();
        config.scripts.multi_match = MultiMatchPolicy::AllMatches;
        let yaml = config.to_yaml().unwrap();
        assert_eq!(Config::from_yaml(&yaml).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = Config::load("/definitely/not/here.yaml").unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_IO_ERROR);
    }
}
