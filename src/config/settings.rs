//! Lint settings resolved from a provider chain.
//!
//! Highest priority first:
//! 1. Command-line flags
//! 2. Environment: `PLUGIN_LINT_*`
//! 3. `--config` file
//! 4. User file: ~/.claude/plugin-lint.json
//! 5. Built-in defaults

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::provider::{ConfigProvider, ConfigProviderExt};
use super::{ConfigError, ConfigResult, ValidationErrors};
use crate::plugins::{DEFAULT_PLUGIN_ROOT_TOKEN, ResolveOptions};

pub const ENV_PREFIX: &str = "PLUGIN_LINT_";
pub const USER_CONFIG_FILE: &str = "plugin-lint.json";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown format '{other}', expected human or json")),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Human => write!(f, "human"),
            Self::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LintSettings {
    pub plugin_root_token: String,
    pub check_permissions: bool,
    pub format: OutputFormat,
}

impl Default for LintSettings {
    fn default() -> Self {
        Self {
            plugin_root_token: DEFAULT_PLUGIN_ROOT_TOKEN.to_string(),
            check_permissions: true,
            format: OutputFormat::Human,
        }
    }
}

impl LintSettings {
    pub const PLUGIN_ROOT_TOKEN: &'static str = "plugin_root_token";
    pub const CHECK_PERMISSIONS: &'static str = "check_permissions";
    pub const FORMAT: &'static str = "format";

    /// Reads every setting, falling back to defaults for absent keys.
    /// All invalid values are reported together.
    pub async fn from_provider<P: ConfigProvider + ?Sized>(provider: &P) -> ConfigResult<Self> {
        let mut settings = Self::default();
        let mut errors = Vec::new();

        match provider.get::<String>(Self::PLUGIN_ROOT_TOKEN).await {
            Ok(Some(token)) if token.is_empty() => errors.push(ConfigError::InvalidValue {
                key: Self::PLUGIN_ROOT_TOKEN.into(),
                message: "placeholder token must not be empty".into(),
            }),
            Ok(Some(token)) => settings.plugin_root_token = token,
            Ok(None) => {}
            Err(e) => errors.push(e),
        }

        match provider.get::<bool>(Self::CHECK_PERMISSIONS).await {
            Ok(Some(check)) => settings.check_permissions = check,
            Ok(None) => {}
            Err(e) => errors.push(e),
        }

        match provider.get::<String>(Self::FORMAT).await {
            Ok(Some(raw)) => match raw.parse() {
                Ok(format) => settings.format = format,
                Err(message) => errors.push(ConfigError::InvalidValue {
                    key: Self::FORMAT.into(),
                    message,
                }),
            },
            Ok(None) => {}
            Err(e) => errors.push(e),
        }

        match errors.len() {
            0 => Ok(settings),
            1 => Err(errors.remove(0)),
            _ => Err(ConfigError::ValidationErrors(ValidationErrors(errors))),
        }
    }

    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            plugin_root_token: self.plugin_root_token.clone(),
            check_permissions: self.check_permissions,
        }
    }

    /// `~/.claude/plugin-lint.json`, when a home directory is known.
    pub fn user_config_path() -> Option<PathBuf> {
        crate::common::home_dir().map(|home| home.join(".claude").join(USER_CONFIG_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CompositeConfigProvider, MemoryConfigProvider};

    #[tokio::test]
    async fn test_defaults() {
        let settings = LintSettings::from_provider(&CompositeConfigProvider::new())
            .await
            .unwrap();
        assert_eq!(settings, LintSettings::default());
        assert_eq!(settings.plugin_root_token, "${CLAUDE_PLUGIN_ROOT}");
        assert!(settings.check_permissions);
    }

    #[tokio::test]
    async fn test_values_from_provider() {
        let provider = MemoryConfigProvider::named("test")
            .value("plugin_root_token", "@ROOT@")
            .value("check_permissions", "false")
            .value("format", "JSON");

        let settings = LintSettings::from_provider(&provider).await.unwrap();
        assert_eq!(settings.plugin_root_token, "@ROOT@");
        assert!(!settings.check_permissions);
        assert_eq!(settings.format, OutputFormat::Json);

        let options = settings.resolve_options();
        assert_eq!(options.plugin_root_token, "@ROOT@");
        assert!(!options.check_permissions);
    }

    #[tokio::test]
    async fn test_invalid_values_are_collected() {
        let provider = MemoryConfigProvider::named("test")
            .value("check_permissions", "sometimes")
            .value("format", "xml");

        match LintSettings::from_provider(&provider).await {
            Err(ConfigError::ValidationErrors(errors)) => assert_eq!(errors.0.len(), 2),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_single_invalid_value() {
        let provider = MemoryConfigProvider::named("test").value("plugin_root_token", "");
        assert!(matches!(
            LintSettings::from_provider(&provider).await,
            Err(ConfigError::InvalidValue { key, .. }) if key == "plugin_root_token"
        ));
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("human".parse::<OutputFormat>().unwrap(), OutputFormat::Human);
        assert_eq!(" Json ".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("yaml".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::Json.to_string(), "json");
    }
}
