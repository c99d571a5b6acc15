use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

pub(crate) const PLUGIN_CONFIG_DIR: &str = ".claude-plugin";
pub(crate) const PLUGIN_MANIFEST_FILE: &str = "plugin.json";

pub const MAX_NAME_LEN: usize = 64;

/// Keeps a field that is present with any value, including `null`, as `Some`.
pub(crate) fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// `plugin.json` as read from disk. Union-typed fields stay as raw JSON
/// until the validator has checked them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPluginManifest {
    #[serde(default, deserialize_with = "present")]
    pub name: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub commands: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub agents: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub hooks: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub skills: Option<Value>,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandsSpec {
    /// Override root scanned for `*.md` instead of `commands/`.
    Directory(String),
    /// Exact command files; nothing is globbed.
    Files(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HooksSpec {
    File(String),
    Inline(Map<String, Value>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginAuthor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Informational fields carried through without validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<PluginAuthor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
}

impl PluginMetadata {
    pub(crate) fn from_map(map: &Map<String, Value>) -> Self {
        serde_json::from_value(Value::Object(map.clone())).unwrap_or_else(|e| {
            tracing::debug!("Ignoring unparseable plugin metadata: {}", e);
            Self::default()
        })
    }
}

/// A `plugin.json` that passed schema validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PluginManifest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commands: Option<CommandsSpec>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub agents: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hooks: Option<HooksSpec>,
    #[serde(flatten)]
    pub metadata: PluginMetadata,
}

impl PluginManifest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            commands: None,
            agents: Vec::new(),
            hooks: None,
            metadata: PluginMetadata::default(),
        }
    }

    pub fn with_commands(mut self, commands: CommandsSpec) -> Self {
        self.commands = Some(commands);
        self
    }

    pub fn with_agents(mut self, agents: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.agents = agents.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_hooks(mut self, hooks: HooksSpec) -> Self {
        self.hooks = Some(hooks);
        self
    }
}

#[derive(Debug, Clone)]
pub struct PluginDescriptor {
    pub(crate) manifest: PluginManifest,
    pub(crate) root_dir: PathBuf,
}

impl PluginDescriptor {
    pub fn new(manifest: PluginManifest, root_dir: PathBuf) -> Self {
        Self { manifest, root_dir }
    }

    pub fn name(&self) -> &str {
        &self.manifest.name
    }

    pub fn manifest(&self) -> &PluginManifest {
        &self.manifest
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Directory a component kind is scanned from by default.
    pub fn component_dir(&self, dir: &str) -> PathBuf {
        self.root_dir.join(dir)
    }
}
