//! Compiler configuration

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{QuarryError, QuarryResult};
use crate::transpiler::{Dialect, SqlGenerator};

/// File name looked up under the user's config directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Main compiler configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct QuarryConfig {
    /// Target dialect
    pub dialect: Dialect,

    /// Identifier grammar replacing the built-in one
    pub identifier_pattern: Option<String>,

    /// `tracing` filter directive used by the CLI when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for QuarryConfig {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            identifier_pattern: None,
            log_filter: "warn".to_string(),
        }
    }
}

impl QuarryConfig {
    /// Create a new configuration builder
    pub fn builder() -> QuarryConfigBuilder {
        QuarryConfigBuilder::default()
    }

    /// `<config dir>/quarry/config.toml`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("quarry").join(CONFIG_FILE))
    }

    /// Parse a TOML document.
    pub fn from_toml(content: &str) -> QuarryResult<Self> {
        toml::from_str(content).map_err(|e| QuarryError::Config(e.to_string()))
    }

    /// Read and parse a config file.
    pub fn from_file(path: &Path) -> QuarryResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load from `path`, or from the default location when it exists,
    /// or fall back to defaults.
    pub fn load(path: Option<&Path>) -> QuarryResult<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => {
                tracing::debug!(path = %path.display(), "loading config");
                Self::from_file(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Generator for the configured dialect and identifier grammar.
    pub fn generator(&self) -> QuarryResult<Box<dyn SqlGenerator>> {
        match &self.identifier_pattern {
            Some(pattern) => self.dialect.generator_with_pattern(pattern),
            None => Ok(self.dialect.generator()),
        }
    }
}

/// Builder for QuarryConfig
#[derive(Debug, Default)]
pub struct QuarryConfigBuilder {
    config: QuarryConfig,
}

impl QuarryConfigBuilder {
    /// Set the target dialect
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.config.dialect = dialect;
        self
    }

    /// Override the identifier grammar
    pub fn identifier_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.config.identifier_pattern = Some(pattern.into());
        self
    }

    /// Set the log filter
    pub fn log_filter(mut self, filter: impl Into<String>) -> Self {
        self.config.log_filter = filter.into();
        self
    }

    /// Build the configuration
    pub fn build(self) -> QuarryConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transpiler::DialectAdapter;

    #[test]
    fn test_parse_toml() {
        let config = QuarryConfig::from_toml(
            r#"
            dialect = "mysql"
            identifier_pattern = "[a-z_]+"
            "#,
        )
        .unwrap();
        assert_eq!(config.dialect, Dialect::MySQL);
        assert_eq!(config.identifier_pattern.as_deref(), Some("[a-z_]+"));
        assert_eq!(config.log_filter, "warn");
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(QuarryConfig::from_toml("").unwrap(), QuarryConfig::default());
    }

    #[test]
    fn test_unknown_dialect_is_config_error() {
        assert!(matches!(
            QuarryConfig::from_toml("dialect = \"oracle\""),
            Err(QuarryError::Config(_))
        ));
    }

    #[test]
    fn test_builder_generator() {
        let config = QuarryConfig::builder()
            .dialect(Dialect::SQLite)
            .identifier_pattern("[a-z]+")
            .build();
        let generator = config.generator().unwrap();
        assert_eq!(generator.dialect(), Dialect::SQLite);
        assert_eq!(generator.escape_identifier("users").unwrap(), "\"users\"");
        assert!(generator.escape_identifier("user_id").is_err());
    }

    #[test]
    fn test_bad_pattern_surfaces_on_generator() {
        let config = QuarryConfig::builder().identifier_pattern("(").build();
        assert!(matches!(config.generator(), Err(QuarryError::Config(_))));
    }
}
