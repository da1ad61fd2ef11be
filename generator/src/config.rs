//! `sourcegen.toml` parsing.
//!
//! Every key is optional; a missing file or an empty table gives the
//! defaults below, which match the names the Unity code base expects.

use parser::cs_parser::is_keyword;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Top-level configuration, one table per generator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct GeneratorConfig {
    pub enum_strings: EnumStringsConfig,
    pub auto_dispose: AutoDisposeConfig,
}

/// `[enum-strings]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct EnumStringsConfig {
    pub enabled: bool,
    /// Namespace of the generated extension class
    pub namespace: String,
    pub class_name: String,
    pub method_name: String,
    /// What to do when two enums share a canonical path
    pub duplicate_paths: DuplicatePathPolicy,
}

impl Default for EnumStringsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            namespace: "SourceGenerated".to_string(),
            class_name: "EnumExtensions".to_string(),
            method_name: "ToFastString".to_string(),
            duplicate_paths: DuplicatePathPolicy::Warn,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePathPolicy {
    /// Keep the first declaration and warn about the others
    #[default]
    Warn,
    /// Keep the first declaration quietly
    Silent,
}

/// `[auto-dispose]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct AutoDisposeConfig {
    pub enabled: bool,
    /// Base class that marks a resource holder
    pub base_type: String,
    /// Simple names of the types whose members get released
    pub handle_types: Vec<String>,
    /// Overridden lifecycle method
    pub cleanup_hook: String,
    /// Method called on each tracked member
    pub release_method: String,
}

impl Default for AutoDisposeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_type: "SystemBase".to_string(),
            handle_types: vec!["NativeArray".to_string(), "NativeList".to_string()],
            cleanup_hook: "OnDestroy".to_string(),
            release_method: "Dispose".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("'{key}' must be a C# identifier, got '{value}'")]
    InvalidIdentifier { key: &'static str, value: String },

    #[error("'{key}' must be a dotted C# name, got '{value}'")]
    InvalidNamespace { key: &'static str, value: String },

    #[error("'auto-dispose.handle-types' must name at least one type")]
    NoHandleTypes,
}

impl GeneratorConfig {
    /// File looked up in the working directory when no `--config` is given
    pub const FILE_NAME: &'static str = "sourcegen.toml";

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: GeneratorConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("loading configuration from {}", path.display());
        Self::from_toml_str(&text)
    }

    /// Reject names that would make the generated code fail to compile
    pub fn validate(&self) -> Result<(), ConfigError> {
        let enums = &self.enum_strings;
        if !enums.namespace.split('.').all(is_identifier) {
            return Err(ConfigError::InvalidNamespace {
                key: "enum-strings.namespace",
                value: enums.namespace.clone(),
            });
        }
        check_identifier("enum-strings.class-name", &enums.class_name)?;
        check_identifier("enum-strings.method-name", &enums.method_name)?;

        let dispose = &self.auto_dispose;
        check_identifier("auto-dispose.base-type", &dispose.base_type)?;
        check_identifier("auto-dispose.cleanup-hook", &dispose.cleanup_hook)?;
        check_identifier("auto-dispose.release-method", &dispose.release_method)?;
        if dispose.handle_types.is_empty() {
            return Err(ConfigError::NoHandleTypes);
        }
        for handle in &dispose.handle_types {
            check_identifier("auto-dispose.handle-types", handle)?;
        }
        Ok(())
    }
}

fn check_identifier(key: &'static str, value: &str) -> Result<(), ConfigError> {
    if is_identifier(value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidIdentifier {
            key,
            value: value.to_string(),
        })
    }
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    let starts_well = matches!(chars.next(), Some(c) if c == '_' || c.is_alphabetic());
    starts_well && chars.all(|c| c == '_' || c.is_alphanumeric()) && !is_keyword(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = GeneratorConfig::from_toml_str("").unwrap();
        assert_eq!(config, GeneratorConfig::default());
        assert_eq!(config.enum_strings.method_name, "ToFastString");
        assert_eq!(config.auto_dispose.handle_types, vec!["NativeArray", "NativeList"]);
    }

    #[test]
    fn test_partial_sections() {
        let toml = r#"
[enum-strings]
namespace = "Game.Generated"
duplicate-paths = "silent"

[auto-dispose]
enabled = false
handle-types = ["NativeArray", "NativeHashMap"]
"#;
        let config = GeneratorConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.enum_strings.namespace, "Game.Generated");
        assert_eq!(config.enum_strings.class_name, "EnumExtensions");
        assert_eq!(config.enum_strings.duplicate_paths, DuplicatePathPolicy::Silent);
        assert!(!config.auto_dispose.enabled);
        assert_eq!(config.auto_dispose.handle_types[1], "NativeHashMap");
        assert_eq!(config.auto_dispose.cleanup_hook, "OnDestroy");
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let result = GeneratorConfig::from_toml_str("[enum-strings]\nmethod = \"X\"\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_invalid_names_are_rejected() {
        let result = GeneratorConfig::from_toml_str("[enum-strings]\nmethod-name = \"To String\"\n");
        assert!(matches!(
            result,
            Err(ConfigError::InvalidIdentifier { key: "enum-strings.method-name", .. })
        ));

        let result = GeneratorConfig::from_toml_str("[enum-strings]\nnamespace = \"Game..Gen\"\n");
        assert!(matches!(result, Err(ConfigError::InvalidNamespace { .. })));

        let result = GeneratorConfig::from_toml_str("[auto-dispose]\nrelease-method = \"class\"\n");
        assert!(matches!(result, Err(ConfigError::InvalidIdentifier { .. })));

        let result = GeneratorConfig::from_toml_str("[auto-dispose]\nhandle-types = []\n");
        assert!(matches!(result, Err(ConfigError::NoHandleTypes)));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let error = GeneratorConfig::from_file(Path::new("/nonexistent/sourcegen.toml")).unwrap_err();
        assert!(error.to_string().contains("/nonexistent/sourcegen.toml"));
    }
}
