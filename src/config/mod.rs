//! Pluggable configuration provider system.
//!
//! ```rust,no_run
//! use claude_plugin_lint::config::{ConfigBuilder, LintSettings};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = ConfigBuilder::new()
//!     .env()
//!     .file("lint.json")
//!     .user_file()
//!     .build()
//!     .await?;
//! let settings = LintSettings::from_provider(&provider).await?;
//! # Ok(())
//! # }
//! ```

pub mod composite;
pub mod env;
pub mod file;
pub mod memory;
pub mod provider;
pub mod settings;

pub use composite::CompositeConfigProvider;
pub use env::EnvConfigProvider;
pub use file::FileConfigProvider;
pub use memory::MemoryConfigProvider;
pub use provider::{ConfigProvider, ConfigProviderExt};
pub use settings::{ENV_PREFIX, LintSettings, OutputFormat, USER_CONFIG_FILE};

use thiserror::Error;

/// Errors that can occur in configuration operations
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment error: {0}")]
    Env(#[from] std::env::VarError),

    #[error("{0}")]
    ValidationErrors(ValidationErrors),
}

#[derive(Debug)]
pub struct ValidationErrors(pub Vec<ConfigError>);

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Validation failed: ")?;
        let msgs: Vec<String> = self.0.iter().map(|e| e.to_string()).collect();
        write!(f, "{}", msgs.join("; "))
    }
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Assembles providers; the first one added has the highest priority.
pub struct ConfigBuilder {
    providers: Vec<Box<dyn ConfigProvider>>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Environment variables with the `PLUGIN_LINT_` prefix
    pub fn env(self) -> Self {
        self.env_with_prefix(ENV_PREFIX)
    }

    pub fn env_with_prefix(mut self, prefix: &str) -> Self {
        self.providers
            .push(Box::new(EnvConfigProvider::prefixed(prefix)));
        self
    }

    pub fn file(mut self, path: impl AsRef<std::path::Path>) -> Self {
        self.providers
            .push(Box::new(FileConfigProvider::new(path.as_ref())));
        self
    }

    /// `~/.claude/plugin-lint.json`; skipped when no home directory is known.
    pub fn user_file(self) -> Self {
        match LintSettings::user_config_path() {
            Some(path) => self.file(path),
            None => {
                tracing::debug!("No home directory, skipping user config file");
                self
            }
        }
    }

    pub fn memory(mut self, provider: MemoryConfigProvider) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    pub async fn build(self) -> ConfigResult<CompositeConfigProvider> {
        let mut composite = CompositeConfigProvider::new();
        for provider in self.providers {
            composite.add_provider(provider);
        }
        tracing::debug!("Config providers: {:?}", composite.provider_names());
        Ok(composite)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidValue {
            key: "format".to_string(),
            message: "unknown format 'xml'".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid value for format: unknown format 'xml'");
    }

    #[tokio::test]
    async fn test_builder_precedence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lint.json");
        std::fs::write(&path, r#"{"format": "json", "check_permissions": false}"#).unwrap();

        let provider = ConfigBuilder::new()
            .memory(MemoryConfigProvider::named("cli").value("format", "human"))
            .file(&path)
            .build()
            .await
            .unwrap();

        assert_eq!(provider.provider_names(), vec!["cli", "file"]);
        let settings = LintSettings::from_provider(&provider).await.unwrap();
        assert_eq!(settings.format, OutputFormat::Human);
        assert!(!settings.check_permissions);
    }
}
