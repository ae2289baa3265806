//! Pipeline configuration
//!
//! Loaded from TOML or YAML by file extension. Every field has a default so
//! a config file only names what it changes.

use crate::error::ReplicaError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use twin_identity::{
    FileSeedStore, IdAbstractor, IdentifierSchema, SeedRegistry, MAX_DIGEST_BYTES,
    MIN_DIGEST_BYTES,
};
use twin_validate::{DependencyRule, ValidatorSuite};

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Replica pipeline configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplicaConfig {
    /// Directory of the file-backed seed store; memory store when absent
    pub seed_dir: Option<PathBuf>,
    /// Destination of the split files
    pub output_dir: PathBuf,
    /// Keyed digest width inside synthetic ids
    pub digest_bytes: usize,
    /// Extra identifier-shaped fields per resource type
    pub identifier_fields: BTreeMap<String, Vec<String>>,
    /// Use only `identifier_fields`, dropping the built-in table
    pub replace_default_identifier_fields: bool,
    /// Extra dependency rules on top of the built-in ones
    pub dependency_rules: Vec<DependencyRule>,
    /// Add missing ordering constraints instead of only reporting them
    pub auto_fix_dependencies: bool,
    pub log_format: LogFormat,
}

impl Default for ReplicaConfig {
    fn default() -> Self {
        Self {
            seed_dir: None,
            output_dir: PathBuf::from("replica"),
            digest_bytes: MIN_DIGEST_BYTES,
            identifier_fields: BTreeMap::new(),
            replace_default_identifier_fields: false,
            dependency_rules: Vec::new(),
            auto_fix_dependencies: true,
            log_format: LogFormat::Pretty,
        }
    }
}

impl ReplicaConfig {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a `.toml`, `.yaml`, or `.yml` file
    ///
    /// # Errors
    /// Unknown extension, I/O, parse, or validation failure
    pub fn from_file(path: &Path) -> Result<Self, ReplicaError> {
        let text = fs::read_to_string(path)?;
        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&text)?,
            Some("yaml" | "yml") => Self::from_yaml_str(&text)?,
            _ => return Err(ReplicaError::UnsupportedFormat(path.to_path_buf())),
        };
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// # Errors
    /// Parse or validation failure
    pub fn from_toml_str(text: &str) -> Result<Self, ReplicaError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    /// Parse or validation failure
    pub fn from_yaml_str(text: &str) -> Result<Self, ReplicaError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    #[inline]
    #[must_use]
    pub fn with_seed_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.seed_dir = Some(dir.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_digest_bytes(mut self, bytes: usize) -> Self {
        self.digest_bytes = bytes;
        self
    }

    /// With one more identifier-shaped field for a resource type
    #[must_use]
    pub fn with_identifier_field(mut self, resource_type: &str, path: &str) -> Self {
        self.identifier_fields
            .entry(resource_type.to_string())
            .or_default()
            .push(path.to_string());
        self
    }

    #[must_use]
    pub fn with_dependency_rule(mut self, rule: DependencyRule) -> Self {
        self.dependency_rules.push(rule);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_auto_fix(mut self, enabled: bool) -> Self {
        self.auto_fix_dependencies = enabled;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.log_format = format;
        self
    }

    /// # Errors
    /// Digest width out of range, malformed identifier paths, or an empty
    /// rule name
    pub fn validate(&self) -> Result<(), ReplicaError> {
        if !(MIN_DIGEST_BYTES..=MAX_DIGEST_BYTES).contains(&self.digest_bytes) {
            return Err(ReplicaError::config(format!(
                "digest_bytes must be within {MIN_DIGEST_BYTES}..={MAX_DIGEST_BYTES}, got {}",
                self.digest_bytes
            )));
        }
        if let Some(rule) = self.dependency_rules.iter().find(|r| r.name.trim().is_empty()) {
            return Err(ReplicaError::config(format!(
                "dependency rule for '{}' has no name",
                rule.child_type
            )));
        }
        IdentifierSchema::from_map(&self.identifier_fields)?;
        Ok(())
    }

    /// Identifier allowlist after merging over the built-in table
    ///
    /// # Errors
    /// Malformed field path
    pub fn identifier_schema(&self) -> Result<IdentifierSchema, ReplicaError> {
        let configured = IdentifierSchema::from_map(&self.identifier_fields)?;
        Ok(if self.replace_default_identifier_fields {
            configured
        } else {
            IdentifierSchema::azure_defaults().merge(configured)
        })
    }

    #[must_use]
    pub fn abstractor(&self) -> IdAbstractor {
        IdAbstractor::new().with_digest_bytes(self.digest_bytes)
    }

    /// Seed registry over the configured store
    ///
    /// # Errors
    /// Seed directory cannot be created
    pub fn seed_registry(&self) -> Result<SeedRegistry, ReplicaError> {
        Ok(match &self.seed_dir {
            Some(dir) => SeedRegistry::new(Arc::new(FileSeedStore::open(dir)?)),
            None => SeedRegistry::in_memory(),
        })
    }

    /// Built-in rules plus configured ones
    #[must_use]
    pub fn validator_suite(&self) -> ValidatorSuite {
        ValidatorSuite::with_defaults(self.auto_fix_dependencies)
            .with_rules(self.dependency_rules.iter().cloned(), self.auto_fix_dependencies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ReplicaConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.auto_fix_dependencies);
        assert_eq!(config.digest_bytes, MIN_DIGEST_BYTES);
    }

    #[test]
    fn rejects_narrow_digest() {
        let err = ReplicaConfig::new().with_digest_bytes(4).validate().unwrap_err();
        assert!(matches!(err, ReplicaError::Config(_)));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = ReplicaConfig::from_toml_str(
            r#"
            output_dir = "out"
            log_format = "json"

            [identifier_fields]
            "Microsoft.Web/sites" = ["serverFarmId"]
            "#,
        )
        .unwrap();
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(config.auto_fix_dependencies);
        let schema = config.identifier_schema().unwrap();
        assert_eq!(schema.fields_for("microsoft.web/sites").len(), 2);
    }

    #[test]
    fn replace_drops_builtin_table() {
        let config = ReplicaConfig {
            replace_default_identifier_fields: true,
            ..ReplicaConfig::default()
        };
        assert_eq!(config.identifier_schema().unwrap().type_count(), 0);
    }

    #[test]
    fn extra_rules_are_appended() {
        let config = ReplicaConfig::new().with_dependency_rule(DependencyRule::new(
            "app_plan",
            "azurerm_linux_web_app",
            "azurerm_service_plan",
        ));
        let builtin = ValidatorSuite::with_defaults(true).len();
        assert_eq!(config.validator_suite().len(), builtin + 1);
    }
}
