//! Violation taxonomy shared by the validator, discoverer and resolver.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ViolationKind {
    MissingManifest,
    MalformedManifest,
    InvalidName,
    InvalidCommandsType,
    InvalidAgentPath,
    InvalidHooksType,
    UnexpectedSkillsField,
    InvalidPathPrefix,
    MissingPluginField,
    DanglingReference,
    InvalidDescriptionStyle,
    UnreadableFile,
    InvalidFrontmatter,
    InvalidMarketplaceField,
    DuplicatePluginName,
}

impl ViolationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingManifest => "MissingManifest",
            Self::MalformedManifest => "MalformedManifest",
            Self::InvalidName => "InvalidName",
            Self::InvalidCommandsType => "InvalidCommandsType",
            Self::InvalidAgentPath => "InvalidAgentPath",
            Self::InvalidHooksType => "InvalidHooksType",
            Self::UnexpectedSkillsField => "UnexpectedSkillsField",
            Self::InvalidPathPrefix => "InvalidPathPrefix",
            Self::MissingPluginField => "MissingPluginField",
            Self::DanglingReference => "DanglingReference",
            Self::InvalidDescriptionStyle => "InvalidDescriptionStyle",
            Self::UnreadableFile => "UnreadableFile",
            Self::InvalidFrontmatter => "InvalidFrontmatter",
            Self::InvalidMarketplaceField => "InvalidMarketplaceField",
            Self::DuplicatePluginName => "DuplicatePluginName",
        }
    }

    /// Per-file problems found after validation are warnings; everything
    /// the schema validator reports is an error.
    pub fn default_severity(self) -> Severity {
        match self {
            Self::DanglingReference
            | Self::InvalidDescriptionStyle
            | Self::UnreadableFile
            | Self::InvalidFrontmatter => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl std::fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// A single problem, located by manifest field (`agents[0]`) or by
/// plugin-relative file path (`./skills/testing/SKILL.md`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Violation {
    pub kind: ViolationKind,
    pub severity: Severity,
    pub location: String,
    pub message: String,
}

impl Violation {
    pub fn new(
        kind: ViolationKind,
        location: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            severity: kind.default_severity(),
            location: location.into(),
            message: message.into(),
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} [{}] {}",
            self.severity, self.location, self.kind, self.message
        )
    }
}
