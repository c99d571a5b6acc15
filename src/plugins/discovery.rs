//! Component discovery.
//!
//! Commands and skills are found by scanning the plugin tree; agents and
//! hooks come only from what the manifest declares. Each kind carries a
//! [`DiscoveryStrategy`] and [`ComponentDiscoverer`] dispatches on it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tokio::task::JoinHandle;

use super::manifest::{CommandsSpec, HooksSpec, PluginDescriptor};
use super::violation::{Violation, ViolationKind};
use crate::common::{
    SKILL_FILE, display_relative, glob_files, is_skill_file, parse_frontmatter, resolve_relative,
};

pub const NAMESPACE_SEP: char = ':';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    Command,
    Skill,
    Agent,
    Hooks,
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Command => write!(f, "command"),
            Self::Skill => write!(f, "skill"),
            Self::Agent => write!(f, "agent"),
            Self::Hooks => write!(f, "hooks"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestField {
    Agents,
    Hooks,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryStrategy {
    /// Glob `pattern` inside `dir` under the plugin root.
    Implicit {
        dir: &'static str,
        pattern: &'static str,
    },
    /// Read verbatim from a manifest field.
    Explicit(ManifestField),
}

impl ComponentKind {
    /// Every kind, in report order.
    pub const ALL: [Self; 4] = [Self::Command, Self::Skill, Self::Agent, Self::Hooks];

    pub fn strategy(self) -> DiscoveryStrategy {
        match self {
            Self::Command => DiscoveryStrategy::Implicit {
                dir: "commands",
                pattern: "*.md",
            },
            Self::Skill => DiscoveryStrategy::Implicit {
                dir: "skills",
                pattern: "*/SKILL.md",
            },
            Self::Agent => DiscoveryStrategy::Explicit(ManifestField::Agents),
            Self::Hooks => DiscoveryStrategy::Explicit(ManifestField::Hooks),
        }
    }
}

/// `plugin-name:resource-name`.
pub fn namespaced(plugin: &str, resource: &str) -> String {
    format!("{plugin}{NAMESPACE_SEP}{resource}")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Component {
    pub kind: ComponentKind,
    pub name: String,
    pub declared_path: String,
    pub path: PathBuf,
}

impl Component {
    fn from_path(kind: ComponentKind, plugin: &str, root: &Path, path: PathBuf) -> Self {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            kind,
            name: namespaced(plugin, &stem),
            declared_path: display_relative(root, &path),
            path,
        }
    }

    fn from_declared(kind: ComponentKind, plugin: &str, root: &Path, declared: &str) -> Self {
        let path = resolve_relative(root, declared);
        let mut component = Self::from_path(kind, plugin, root, path);
        component.declared_path = declared.to_string();
        component
    }
}

fn tool_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Tools {
        Csv(String),
        List(Vec<String>),
    }

    Ok(match Tools::deserialize(deserializer)? {
        Tools::Csv(csv) => csv
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect(),
        Tools::List(list) => list,
    })
}

/// YAML frontmatter of a `SKILL.md` file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillFrontmatter {
    pub name: String,
    pub description: String,
    #[serde(
        default,
        alias = "allowed-tools",
        deserialize_with = "tool_list",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub allowed_tools: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillComponent {
    #[serde(flatten)]
    pub component: Component,
    pub frontmatter: SkillFrontmatter,
    #[serde(skip)]
    pub raw_frontmatter: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HooksSource {
    File(Component),
    Inline(Map<String, Value>),
}

/// Everything one discovery pass found. Recomputed on every pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentSet {
    pub plugin: String,
    pub root_dir: PathBuf,
    pub commands: Vec<Component>,
    pub skills: Vec<SkillComponent>,
    pub agents: Vec<Component>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hooks: Option<HooksSource>,
}

impl ComponentSet {
    fn empty(plugin: &PluginDescriptor) -> Self {
        Self {
            plugin: plugin.name().to_string(),
            root_dir: plugin.root_dir().to_path_buf(),
            commands: Vec::new(),
            skills: Vec::new(),
            agents: Vec::new(),
            hooks: None,
        }
    }

    /// Every file-backed component, in kind order.
    pub fn files(&self) -> impl Iterator<Item = &Component> {
        let hooks_file = match &self.hooks {
            Some(HooksSource::File(component)) => Some(component),
            _ => None,
        };
        self.commands
            .iter()
            .chain(self.skills.iter().map(|s| &s.component))
            .chain(self.agents.iter())
            .chain(hooks_file)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
            + self.skills.len()
            + self.agents.len()
            + usize::from(self.hooks.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone)]
pub struct Discovery {
    pub components: ComponentSet,
    pub warnings: Vec<Violation>,
}

enum ScanRoot<'a> {
    Directory(PathBuf),
    /// The manifest lists the files; nothing is globbed.
    Listed(&'a [String]),
}

/// A glob running on the blocking pool.
struct Scan {
    kind: ComponentKind,
    location: String,
    pattern: &'static str,
    task: JoinHandle<Result<Vec<PathBuf>, glob::PatternError>>,
}

impl Scan {
    fn spawn(kind: ComponentKind, root: &Path, base: PathBuf, pattern: &'static str) -> Self {
        let location = display_relative(root, &base);
        let task = tokio::task::spawn_blocking(move || glob_files(&base, pattern));
        Self {
            kind,
            location,
            pattern,
            task,
        }
    }

    async fn finish(self, warnings: &mut Vec<Violation>) -> Vec<PathBuf> {
        match self.task.await {
            Ok(Ok(paths)) => paths,
            Ok(Err(e)) => {
                warnings.push(Violation::new(
                    ViolationKind::DanglingReference,
                    self.location,
                    format!("invalid discovery pattern '{}': {e}", self.pattern),
                ));
                Vec::new()
            }
            Err(e) => {
                tracing::warn!("Scan for {} files in {} failed: {}", self.kind, self.location, e);
                warnings.push(Violation::new(
                    ViolationKind::UnreadableFile,
                    self.location,
                    format!("cannot scan for {} files: {e}", self.kind),
                ));
                Vec::new()
            }
        }
    }
}

pub struct ComponentDiscoverer;

impl ComponentDiscoverer {
    pub async fn discover(plugin: &PluginDescriptor) -> Discovery {
        let root = plugin.root_dir();
        let mut components = ComponentSet::empty(plugin);
        let mut warnings = Vec::new();
        let mut found = Vec::new();
        let mut scans = Vec::new();

        for kind in ComponentKind::ALL {
            match kind.strategy() {
                DiscoveryStrategy::Implicit { dir, pattern } => {
                    match Self::scan_root(plugin, kind, dir, &mut warnings) {
                        ScanRoot::Directory(base) => {
                            scans.push(Scan::spawn(kind, root, base, pattern));
                        }
                        ScanRoot::Listed(files) => found.extend(
                            files
                                .iter()
                                .map(|f| Component::from_declared(kind, plugin.name(), root, f)),
                        ),
                    }
                }
                DiscoveryStrategy::Explicit(field) => {
                    found.extend(Self::read_field(plugin, kind, field, &mut components));
                }
            }
        }

        // all scans are already running; join them in kind order
        for scan in scans {
            let kind = scan.kind;
            for path in scan.finish(&mut warnings).await {
                found.push(Component::from_path(kind, plugin.name(), root, path));
            }
        }

        for component in found {
            Self::admit(plugin, &mut components, component, &mut warnings).await;
        }

        tracing::debug!(
            "Discovered {} command(s), {} skill(s), {} agent(s) for plugin '{}'",
            components.commands.len(),
            components.skills.len(),
            components.agents.len(),
            plugin.name()
        );

        Discovery {
            components,
            warnings,
        }
    }

    /// A `commands` entry in the manifest moves the scan to another
    /// directory or replaces it with a list of files.
    fn scan_root<'a>(
        plugin: &'a PluginDescriptor,
        kind: ComponentKind,
        dir: &str,
        warnings: &mut Vec<Violation>,
    ) -> ScanRoot<'a> {
        let commands = match kind {
            ComponentKind::Command => plugin.manifest().commands.as_ref(),
            _ => None,
        };

        match commands {
            None => ScanRoot::Directory(plugin.component_dir(dir)),
            Some(CommandsSpec::Directory(declared)) => {
                let base = resolve_relative(plugin.root_dir(), declared);
                if !base.is_dir() {
                    warnings.push(Violation::new(
                        ViolationKind::DanglingReference,
                        "commands",
                        format!("commands directory '{declared}' does not exist"),
                    ));
                }
                ScanRoot::Directory(base)
            }
            Some(CommandsSpec::Files(files)) => ScanRoot::Listed(files),
        }
    }

    fn read_field(
        plugin: &PluginDescriptor,
        kind: ComponentKind,
        field: ManifestField,
        components: &mut ComponentSet,
    ) -> Vec<Component> {
        let declared =
            |path: &str| Component::from_declared(kind, plugin.name(), plugin.root_dir(), path);

        match field {
            ManifestField::Agents => plugin
                .manifest()
                .agents
                .iter()
                .map(|agent| declared(agent))
                .collect(),
            ManifestField::Hooks => match &plugin.manifest().hooks {
                Some(HooksSpec::File(path)) => vec![declared(path)],
                Some(HooksSpec::Inline(map)) => {
                    components.hooks = Some(HooksSource::Inline(map.clone()));
                    Vec::new()
                }
                None => Vec::new(),
            },
        }
    }

    async fn admit(
        plugin: &PluginDescriptor,
        components: &mut ComponentSet,
        component: Component,
        warnings: &mut Vec<Violation>,
    ) {
        match component.kind {
            ComponentKind::Command => components.commands.push(component),
            ComponentKind::Agent => components.agents.push(component),
            ComponentKind::Hooks => components.hooks = Some(HooksSource::File(component)),
            ComponentKind::Skill => {
                if let Some(skill) = Self::load_skill(plugin, component, warnings).await {
                    components.skills.push(skill);
                }
            }
        }
    }

    /// Skills without readable, complete frontmatter are left out.
    async fn load_skill(
        plugin: &PluginDescriptor,
        mut component: Component,
        warnings: &mut Vec<Violation>,
    ) -> Option<SkillComponent> {
        if !is_skill_file(&component.path) {
            return None;
        }
        let location = component.declared_path.clone();

        let content = match tokio::fs::read_to_string(&component.path).await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Failed to read skill {}: {}", component.path.display(), e);
                warnings.push(Violation::new(
                    ViolationKind::UnreadableFile,
                    location,
                    format!("cannot read {SKILL_FILE}: {e}"),
                ));
                return None;
            }
        };

        let doc = match parse_frontmatter::<SkillFrontmatter>(&content) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!("Excluding skill {}: {}", component.path.display(), e);
                warnings.push(Violation::new(
                    ViolationKind::InvalidFrontmatter,
                    location,
                    e.to_string(),
                ));
                return None;
            }
        };

        let frontmatter = doc.frontmatter;
        if frontmatter.name.trim().is_empty() || frontmatter.description.trim().is_empty() {
            warnings.push(Violation::new(
                ViolationKind::InvalidFrontmatter,
                location,
                "frontmatter requires a non-empty name and description",
            ));
            return None;
        }

        component.name = namespaced(plugin.name(), &frontmatter.name);
        Some(SkillComponent {
            component,
            frontmatter,
            raw_frontmatter: doc.raw_frontmatter,
        })
    }
}
