//! Outcome of one lint pass, rendered for people or as JSON.

use std::fmt::Write as _;
use std::path::PathBuf;

use serde::Serialize;

use crate::plugins::{ComponentSet, HooksSource, PluginError, ResolvedHook, Severity, Violation};

#[derive(Debug, Clone, Serialize)]
pub struct LintReport {
    pub plugin_root: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin: Option<String>,
    pub success: bool,
    /// Set when the pass could not run at all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fatal: Option<Violation>,
    pub violations: Vec<Violation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<ComponentSet>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hook_commands: Vec<ResolvedHook>,
}

impl LintReport {
    pub fn new(plugin_root: impl Into<PathBuf>) -> Self {
        Self {
            plugin_root: plugin_root.into(),
            plugin: None,
            success: true,
            fatal: None,
            violations: Vec::new(),
            components: None,
            hook_commands: Vec::new(),
        }
    }

    pub fn fatal(plugin_root: impl Into<PathBuf>, error: &PluginError) -> Self {
        let mut report = Self::new(plugin_root);
        report.fatal = Some(error.to_violation());
        report.success = false;
        report
    }

    /// Adds a violation unless an identical one is already recorded.
    pub fn push(&mut self, violation: Violation) {
        if !self.violations.contains(&violation) {
            self.violations.push(violation);
            self.success = false;
        }
    }

    pub fn extend(&mut self, violations: impl IntoIterator<Item = Violation>) {
        for violation in violations {
            self.push(violation);
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.fatal.is_some()
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error) + usize::from(self.fatal.is_some())
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    fn count(&self, severity: Severity) -> usize {
        self.violations
            .iter()
            .filter(|v| v.severity == severity)
            .count()
    }

    /// One line per violation; a single summary line when the pass succeeded.
    pub fn render_human(&self) -> String {
        if let Some(fatal) = &self.fatal {
            return format!("{fatal}\n");
        }
        if self.success {
            let components = self.components.as_ref().map_or(0, ComponentSet::len);
            return format!(
                "ok: {} ({} component(s))\n",
                self.subject(),
                components
            );
        }

        let mut out = String::new();
        for violation in &self.violations {
            let _ = writeln!(out, "{violation}");
        }
        out
    }

    /// The discovered component set, one component per line.
    pub fn render_components(&self) -> String {
        let mut out = String::new();
        if let Some(fatal) = &self.fatal {
            let _ = writeln!(out, "{fatal}");
            return out;
        }

        if let Some(set) = &self.components {
            for component in set.files() {
                let _ = writeln!(
                    out,
                    "{:<8} {:<40} {}",
                    component.kind.to_string(),
                    component.name,
                    component.declared_path
                );
            }
            if let Some(HooksSource::Inline(inline)) = &set.hooks {
                let _ = writeln!(
                    out,
                    "{:<8} {:<40} inline ({} event(s))",
                    "hooks",
                    format!("{}:hooks", set.plugin),
                    inline.len()
                );
            }
        }
        for violation in &self.violations {
            let _ = writeln!(out, "{violation}");
        }
        out
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    fn subject(&self) -> String {
        match &self.plugin {
            Some(name) => name.clone(),
            None => self.plugin_root.display().to_string(),
        }
    }
}
