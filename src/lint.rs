//! The lint pipeline: load, validate, discover, resolve, report.

use std::path::Path;

use crate::config::LintSettings;
use crate::plugins::{
    ComponentDiscoverer, ManifestLoader, PathResolver, PluginDescriptor, SchemaValidator,
};
use crate::report::LintReport;

enum Validated {
    /// Fatal load error or invalid plugin manifest; nothing further runs.
    Stopped(LintReport),
    Ready(PluginDescriptor, LintReport),
}

/// Runs one pass over a plugin root. Holds no state between passes.
#[derive(Debug, Clone, Default)]
pub struct PluginLinter {
    settings: LintSettings,
    resolver: PathResolver,
}

impl PluginLinter {
    pub fn new(settings: LintSettings) -> Self {
        let resolver = PathResolver::new(settings.resolve_options());
        Self { settings, resolver }
    }

    pub fn settings(&self) -> &LintSettings {
        &self.settings
    }

    /// Full pass. Loader failures end up in [`LintReport::fatal`]; everything
    /// else is collected as violations.
    pub async fn lint(&self, root: &Path) -> LintReport {
        let (plugin, mut report) = match self.validate(root).await {
            Validated::Ready(plugin, report) => (plugin, report),
            Validated::Stopped(report) => return report,
        };
        tracing::info!("Linting plugin '{}' at {}", plugin.name(), root.display());

        let discovery = ComponentDiscoverer::discover(&plugin).await;
        report.extend(discovery.warnings);

        let (resolved, warnings) = self.resolver.resolve(discovery.components);
        report.extend(warnings);
        report.components = Some(resolved.components);
        report.hook_commands = resolved.hook_commands;

        log_outcome(&report);
        report
    }

    /// Loads, validates and discovers without resolving paths.
    pub async fn discover(&self, root: &Path) -> LintReport {
        let (plugin, mut report) = match self.validate(root).await {
            Validated::Ready(plugin, report) => (plugin, report),
            Validated::Stopped(report) => return report,
        };

        let discovery = ComponentDiscoverer::discover(&plugin).await;
        report.extend(discovery.warnings);
        report.components = Some(discovery.components);

        log_outcome(&report);
        report
    }

    async fn validate(&self, root: &Path) -> Validated {
        let loaded = match ManifestLoader::load(root).await {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::warn!("Cannot lint {}: {}", root.display(), e);
                return Validated::Stopped(LintReport::fatal(root, &e));
            }
        };

        let mut report = LintReport::new(root);
        let validation = SchemaValidator::validate(&loaded);
        report.extend(validation.violations);

        if let Some(marketplace) = &validation.marketplace {
            // sources are relative to the repository root, which is the plugin root
            report.extend(self.resolver.resolve_marketplace(marketplace, &loaded.root_dir));
        }

        match validation.plugin {
            Some(plugin) => {
                report.plugin = Some(plugin.name().to_string());
                Validated::Ready(plugin, report)
            }
            None => {
                tracing::debug!("Plugin manifest is invalid, skipping discovery");
                log_outcome(&report);
                Validated::Stopped(report)
            }
        }
    }
}

fn log_outcome(report: &LintReport) {
    if report.success {
        tracing::info!("Lint pass succeeded");
    } else {
        tracing::info!(
            "Lint pass failed: {} error(s), {} warning(s)",
            report.error_count(),
            report.warning_count()
        );
    }
}
