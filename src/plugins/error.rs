use std::path::PathBuf;

use super::violation::{Severity, Violation, ViolationKind};

/// Fatal loader failures. Nothing downstream can run after one of these.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    #[error("Plugin manifest not found: {path}")]
    ManifestNotFound { path: PathBuf },

    #[error("Malformed manifest at {path}: {reason}")]
    MalformedManifest { path: PathBuf, reason: String },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PluginError {
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::ManifestNotFound { path }
            | Self::MalformedManifest { path, .. }
            | Self::Read { path, .. } => path,
        }
    }

    pub fn kind(&self) -> ViolationKind {
        match self {
            Self::ManifestNotFound { .. } => ViolationKind::MissingManifest,
            Self::MalformedManifest { .. } => ViolationKind::MalformedManifest,
            Self::Read { .. } => ViolationKind::UnreadableFile,
        }
    }

    /// Report entry for a failure that stopped the pass.
    pub fn to_violation(&self) -> Violation {
        Violation::new(self.kind(), self.path().display().to_string(), self.to_string())
            .with_severity(Severity::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PluginError::ManifestNotFound {
            path: PathBuf::from("/plugins/test/plugin.json"),
        };
        assert!(err.to_string().contains("/plugins/test/plugin.json"));

        let err = PluginError::MalformedManifest {
            path: PathBuf::from("/plugins/bad/plugin.json"),
            reason: "expected value at line 1".into(),
        };
        assert!(err.to_string().contains("expected value"));
        assert_eq!(err.path(), std::path::Path::new("/plugins/bad/plugin.json"));
    }

    #[test]
    fn test_read_error_keeps_source() {
        let err = PluginError::Read {
            path: PathBuf::from("/plugins/locked/plugin.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(std::error::Error::source(&err).is_some());

        let violation = err.to_violation();
        assert_eq!(violation.kind, ViolationKind::UnreadableFile);
        assert_eq!(violation.severity, Severity::Error);
        assert_eq!(violation.location, "/plugins/locked/plugin.json");
    }

    #[test]
    fn test_kinds() {
        let missing = PluginError::ManifestNotFound {
            path: PathBuf::from("/p/.claude-plugin/plugin.json"),
        };
        assert_eq!(missing.kind(), ViolationKind::MissingManifest);
        assert_eq!(missing.to_violation().kind, ViolationKind::MissingManifest);
    }
}
