//! # claude-plugin-lint
//!
//! Discovery and validation engine for AI-assistant plugins: bundles of
//! commands, skills, agents and hooks described by a `plugin.json` manifest
//! and an optional `marketplace.json`.
//!
//! A pass runs `ManifestLoader -> SchemaValidator -> ComponentDiscoverer ->
//! PathResolver` and produces a [`LintReport`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! #[tokio::main]
//! async fn main() {
//!     let report = claude_plugin_lint::lint("./my-plugin").await;
//!     print!("{}", report.render_human());
//!     std::process::exit(if report.success { 0 } else { 1 });
//! }
//! ```
//!
//! ## Custom Settings
//!
//! ```rust,no_run
//! use claude_plugin_lint::config::{ConfigBuilder, LintSettings};
//! use claude_plugin_lint::PluginLinter;
//!
//! # async fn example() -> claude_plugin_lint::Result<()> {
//! let provider = ConfigBuilder::new().env().user_file().build().await?;
//! let settings = LintSettings::from_provider(&provider).await?;
//! let report = PluginLinter::new(settings)
//!     .lint(std::path::Path::new("./my-plugin"))
//!     .await;
//! println!("{}", report.to_json()?);
//! # Ok(())
//! # }
//! ```

#![deny(rustdoc::broken_intra_doc_links)]

pub mod common;
pub mod config;
pub mod lint;
pub mod observability;
pub mod plugins;
pub mod report;

pub use config::{ConfigError, LintSettings, OutputFormat};
pub use lint::PluginLinter;
pub use plugins::{
    Component, ComponentKind, ComponentSet, DiscoveryStrategy, PluginDescriptor, PluginError,
    PluginManifest, Severity, Violation, ViolationKind,
};
pub use report::LintReport;

/// Error type for claude-plugin-lint operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A manifest could not be located, read or parsed.
    #[error(transparent)]
    Plugin(#[from] PluginError),

    /// Settings could not be read or are invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// JSON serialization or deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File system operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error category for unified error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The plugin itself is missing or malformed
    Manifest,
    /// Settings, flags or environment are wrong
    Configuration,
    /// IO and serialization failures
    Internal,
}

impl Error {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Plugin(_) => ErrorCategory::Manifest,
            Error::Config(_) => ErrorCategory::Configuration,
            Error::Json(_) | Error::Io(_) => ErrorCategory::Internal,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// One lint pass with default settings.
pub async fn lint(root: impl AsRef<std::path::Path>) -> LintReport {
    PluginLinter::default().lint(root.as_ref()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_error_category() {
        let err: Error = PluginError::ManifestNotFound {
            path: PathBuf::from("/p/plugin.json"),
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::Manifest);
        assert!(err.to_string().contains("/p/plugin.json"));

        let err: Error = ConfigError::InvalidValue {
            key: "format".into(),
            message: "unknown".into(),
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::Configuration);
    }

    #[tokio::test]
    async fn test_lint_shortcut() {
        let dir = tempfile::tempdir().unwrap();
        let report = lint(dir.path()).await;
        assert!(report.is_fatal());
    }
}
