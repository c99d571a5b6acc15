//! Path resolution and per-file checks over a discovered component set.

use std::path::Path;

use serde::Serialize;

use super::discovery::{Component, ComponentSet, HooksSource, SkillComponent};
use super::hooks::{DEFAULT_PLUGIN_ROOT_TOKEN, ResolvedHook, resolve_inline_hooks};
use super::marketplace::MarketplaceManifest;
use super::violation::{Violation, ViolationKind};
use crate::common::{ScalarStyle, display_relative, is_markdown, scalar_style};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveOptions {
    pub plugin_root_token: String,
    pub check_permissions: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            plugin_root_token: DEFAULT_PLUGIN_ROOT_TOKEN.to_string(),
            check_permissions: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedPlugin {
    pub components: ComponentSet,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hook_commands: Vec<ResolvedHook>,
}

#[derive(Debug, Clone, Default)]
pub struct PathResolver {
    options: ResolveOptions,
}

impl PathResolver {
    pub fn new(options: ResolveOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    /// Checks every file the set references and expands inline hook commands.
    /// Problems come back as warnings; the set itself is never pruned.
    pub fn resolve(&self, components: ComponentSet) -> (ResolvedPlugin, Vec<Violation>) {
        let root = components.root_dir.clone();
        let mut warnings = Vec::new();

        for component in components.files() {
            if !component.path.is_file() {
                warnings.push(dangling(component));
                continue;
            }
            if self.options.check_permissions && is_markdown(&component.path) {
                self.check_readable(&root, &component.path, &mut warnings);
            }
        }

        for skill in &components.skills {
            check_description_style(skill, &mut warnings);
        }

        let hook_commands = match &components.hooks {
            Some(HooksSource::Inline(inline)) => {
                resolve_inline_hooks(inline, &self.options.plugin_root_token, &root)
            }
            _ => Vec::new(),
        };

        tracing::debug!(
            "Resolved {} file(s) and {} hook command(s) with {} warning(s)",
            components.files().count(),
            hook_commands.len(),
            warnings.len()
        );

        (
            ResolvedPlugin {
                components,
                hook_commands,
            },
            warnings,
        )
    }

    /// Local marketplace sources must point at an existing directory.
    /// Remote sources are accepted as-is.
    pub fn resolve_marketplace(
        &self,
        marketplace: &MarketplaceManifest,
        marketplace_root: &Path,
    ) -> Vec<Violation> {
        marketplace
            .plugins
            .iter()
            .enumerate()
            .filter_map(|(i, entry)| {
                let path = entry.source.local_path(marketplace_root)?;
                if path.is_dir() {
                    return None;
                }
                Some(Violation::new(
                    ViolationKind::DanglingReference,
                    format!("marketplace.plugins[{i}].source"),
                    format!(
                        "source of plugin '{}' points to missing directory {}",
                        entry.name,
                        display_relative(marketplace_root, &path)
                    ),
                ))
            })
            .collect()
    }

    #[cfg(unix)]
    fn check_readable(&self, root: &Path, path: &Path, warnings: &mut Vec<Violation>) {
        use rustix::fs::{Mode, stat};

        match stat(path) {
            Ok(st) => {
                let mode = Mode::from_raw_mode(st.st_mode);
                if !mode.contains(Mode::ROTH) {
                    warnings.push(Violation::new(
                        ViolationKind::UnreadableFile,
                        display_relative(root, path),
                        format!(
                            "file mode {:o} is not world-readable",
                            mode.bits() & 0o777
                        ),
                    ));
                }
            }
            Err(e) => warnings.push(Violation::new(
                ViolationKind::UnreadableFile,
                display_relative(root, path),
                format!("cannot stat file: {e}"),
            )),
        }
    }

    #[cfg(not(unix))]
    fn check_readable(&self, root: &Path, path: &Path, warnings: &mut Vec<Violation>) {
        if let Err(e) = std::fs::File::open(path) {
            warnings.push(Violation::new(
                ViolationKind::UnreadableFile,
                display_relative(root, path),
                format!("cannot open file: {e}"),
            ));
        }
    }
}

fn dangling(component: &Component) -> Violation {
    Violation::new(
        ViolationKind::DanglingReference,
        component.declared_path.clone(),
        format!("{} file '{}' does not exist", component.kind, component.declared_path),
    )
}

fn check_description_style(skill: &SkillComponent, warnings: &mut Vec<Violation>) {
    let style = scalar_style(&skill.raw_frontmatter, "description");
    // the description already deserialized, so the raw scan just could not see it
    if style == ScalarStyle::Absent {
        tracing::debug!(
            "Description style of {} not checked",
            skill.component.declared_path
        );
        return;
    }
    if !style.is_accepted() {
        warnings.push(Violation::new(
            ViolationKind::InvalidDescriptionStyle,
            skill.component.declared_path.clone(),
            format!("multi-line description must use a block literal (|), found {style}"),
        ));
    }
}
