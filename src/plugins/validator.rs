//! Schema validation for plugin and marketplace manifests.
//!
//! Every rule is checked independently and all violations are collected,
//! so one pass surfaces every problem in a manifest.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

use super::loader::LoadedPlugin;
use super::manifest::{
    CommandsSpec, HooksSpec, MAX_NAME_LEN, PluginDescriptor, PluginManifest, PluginMetadata,
    RawPluginManifest,
};
use super::marketplace::{
    MarketplaceManifest, MarketplaceOwner, MarketplacePluginEntry, PluginSource,
    RawMarketplaceManifest, SAME_REPOSITORY_SOURCE,
};
use super::violation::{Violation, ViolationKind};
use crate::common::escapes_root;

fn name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").expect("valid kebab-case regex"))
}

/// Checks the kebab-case and length rules shared by plugin and marketplace names.
pub fn validate_name(name: &str) -> Result<(), String> {
    if name.chars().count() > MAX_NAME_LEN {
        return Err(format!(
            "'{}' is {} characters long, maximum is {}",
            name,
            name.chars().count(),
            MAX_NAME_LEN
        ));
    }
    if !name_regex().is_match(name) {
        return Err(format!(
            "'{name}' must be kebab-case (lowercase letters, digits and single hyphens)"
        ));
    }
    Ok(())
}

/// Outcome of validating everything a [`LoadedPlugin`] carries.
#[derive(Debug, Clone)]
pub struct Validation {
    pub plugin: Option<PluginDescriptor>,
    pub marketplace: Option<MarketplaceManifest>,
    pub violations: Vec<Violation>,
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

pub struct SchemaValidator;

impl SchemaValidator {
    pub fn validate(loaded: &LoadedPlugin) -> Validation {
        let mut violations = Vec::new();

        let plugin = match Self::validate_plugin(&loaded.manifest) {
            Ok(manifest) => Some(PluginDescriptor::new(manifest, loaded.root_dir.clone())),
            Err(found) => {
                violations.extend(found);
                None
            }
        };

        let marketplace = loaded.marketplace.as_ref().and_then(|m| {
            match Self::validate_marketplace(&m.manifest) {
                Ok(marketplace) => Some(marketplace),
                Err(found) => {
                    violations.extend(found);
                    None
                }
            }
        });

        tracing::debug!(
            "Schema validation finished with {} violation(s)",
            violations.len()
        );

        Validation {
            plugin,
            marketplace,
            violations,
        }
    }

    pub fn validate_plugin(raw: &RawPluginManifest) -> Result<PluginManifest, Vec<Violation>> {
        let mut violations = Vec::new();

        let name = Self::check_plugin_name(raw.name.as_ref(), &mut violations);
        let commands = Self::check_commands(raw.commands.as_ref(), &mut violations);
        let agents = Self::check_agents(raw.agents.as_ref(), &mut violations);
        let hooks = Self::check_hooks(raw.hooks.as_ref(), &mut violations);

        if raw.skills.is_some() {
            violations.push(Violation::new(
                ViolationKind::UnexpectedSkillsField,
                "skills",
                "skills are discovered from skills/*/SKILL.md and must not be declared",
            ));
        }

        match &commands {
            Some(CommandsSpec::Directory(dir)) => {
                check_path_prefix("commands", dir, &mut violations)
            }
            Some(CommandsSpec::Files(files)) => {
                for (i, file) in files.iter().enumerate() {
                    check_path_prefix(&format!("commands[{i}]"), file, &mut violations);
                }
            }
            None => {}
        }
        for (i, agent) in agents.iter().enumerate() {
            check_path_prefix(&format!("agents[{i}]"), agent, &mut violations);
        }
        if let Some(HooksSpec::File(path)) = &hooks {
            check_path_prefix("hooks", path, &mut violations);
        }

        match name {
            Some(name) if violations.is_empty() => Ok(PluginManifest {
                name,
                commands,
                agents,
                hooks,
                metadata: PluginMetadata::from_map(&raw.metadata),
            }),
            _ => Err(violations),
        }
    }

    fn check_plugin_name(value: Option<&Value>, violations: &mut Vec<Violation>) -> Option<String> {
        match value {
            Some(Value::String(name)) => match validate_name(name) {
                Ok(()) => Some(name.clone()),
                Err(reason) => {
                    violations.push(Violation::new(ViolationKind::InvalidName, "name", reason));
                    None
                }
            },
            Some(other) => {
                violations.push(Violation::new(
                    ViolationKind::InvalidName,
                    "name",
                    format!("name must be a string, got {}", value_type_name(other)),
                ));
                None
            }
            None => {
                violations.push(Violation::new(
                    ViolationKind::InvalidName,
                    "name",
                    "name is required",
                ));
                None
            }
        }
    }

    fn check_commands(
        value: Option<&Value>,
        violations: &mut Vec<Violation>,
    ) -> Option<CommandsSpec> {
        match value? {
            Value::String(dir) => Some(CommandsSpec::Directory(dir.clone())),
            Value::Array(items) => {
                let files: Option<Vec<String>> = items
                    .iter()
                    .map(|item| item.as_str().map(String::from))
                    .collect();
                if files.is_none() {
                    violations.push(Violation::new(
                        ViolationKind::InvalidCommandsType,
                        "commands",
                        "every commands entry must be a string path",
                    ));
                }
                files.map(CommandsSpec::Files)
            }
            other => {
                violations.push(Violation::new(
                    ViolationKind::InvalidCommandsType,
                    "commands",
                    format!(
                        "commands must be a directory path or an array of file paths, got {}",
                        value_type_name(other)
                    ),
                ));
                None
            }
        }
    }

    fn check_agents(value: Option<&Value>, violations: &mut Vec<Violation>) -> Vec<String> {
        let Some(value) = value else {
            return Vec::new();
        };
        let Value::Array(items) = value else {
            violations.push(Violation::new(
                ViolationKind::InvalidAgentPath,
                "agents",
                format!(
                    "agents must be an array of .md paths, got {}",
                    value_type_name(value)
                ),
            ));
            return Vec::new();
        };

        let mut agents = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let location = format!("agents[{i}]");
            match item.as_str() {
                Some(path) if path.ends_with(".md") => agents.push(path.to_string()),
                Some(path) => {
                    violations.push(Violation::new(
                        ViolationKind::InvalidAgentPath,
                        location,
                        format!("'{path}' must end with .md"),
                    ));
                    agents.push(path.to_string());
                }
                None => violations.push(Violation::new(
                    ViolationKind::InvalidAgentPath,
                    location,
                    format!("agent path must be a string, got {}", value_type_name(item)),
                )),
            }
        }
        agents
    }

    fn check_hooks(value: Option<&Value>, violations: &mut Vec<Violation>) -> Option<HooksSpec> {
        match value? {
            Value::String(path) => Some(HooksSpec::File(path.clone())),
            Value::Object(map) => Some(HooksSpec::Inline(map.clone())),
            other => {
                violations.push(Violation::new(
                    ViolationKind::InvalidHooksType,
                    "hooks",
                    format!(
                        "hooks must be a file path or an inline object, got {}",
                        value_type_name(other)
                    ),
                ));
                None
            }
        }
    }

    pub fn validate_marketplace(
        raw: &RawMarketplaceManifest,
    ) -> Result<MarketplaceManifest, Vec<Violation>> {
        let mut violations = Vec::new();

        let name = match raw.name.as_ref() {
            Some(Value::String(name)) => match validate_name(name) {
                Ok(()) => Some(name.clone()),
                Err(reason) => {
                    violations.push(Violation::new(
                        ViolationKind::InvalidName,
                        "marketplace.name",
                        reason,
                    ));
                    None
                }
            },
            _ => {
                violations.push(Violation::new(
                    ViolationKind::InvalidName,
                    "marketplace.name",
                    "marketplace name is required and must be a string",
                ));
                None
            }
        };

        let owner = Self::check_owner(raw.owner.as_ref(), &mut violations);

        let plugins = match raw.plugins.as_ref() {
            Some(Value::Array(entries)) => Self::check_entries(entries, &mut violations),
            Some(other) => {
                violations.push(Violation::new(
                    ViolationKind::InvalidMarketplaceField,
                    "marketplace.plugins",
                    format!("plugins must be an array, got {}", value_type_name(other)),
                ));
                Vec::new()
            }
            None => {
                violations.push(Violation::new(
                    ViolationKind::InvalidMarketplaceField,
                    "marketplace.plugins",
                    "plugins is required",
                ));
                Vec::new()
            }
        };

        match (name, owner) {
            (Some(name), Some(owner)) if violations.is_empty() => Ok(MarketplaceManifest {
                name,
                owner,
                plugins,
            }),
            _ => Err(violations),
        }
    }

    fn check_owner(
        value: Option<&Value>,
        violations: &mut Vec<Violation>,
    ) -> Option<MarketplaceOwner> {
        let Some(Value::Object(owner)) = value else {
            violations.push(Violation::new(
                ViolationKind::InvalidMarketplaceField,
                "marketplace.owner",
                "owner must be an object with a name",
            ));
            return None;
        };

        let name = non_empty_str(owner, "name");
        if name.is_none() {
            violations.push(Violation::new(
                ViolationKind::InvalidMarketplaceField,
                "marketplace.owner.name",
                "owner name is required",
            ));
        }

        let email = match owner.get("email") {
            None | Some(Value::Null) => None,
            Some(Value::String(email)) => Some(email.clone()),
            Some(other) => {
                violations.push(Violation::new(
                    ViolationKind::InvalidMarketplaceField,
                    "marketplace.owner.email",
                    format!("owner email must be a string, got {}", value_type_name(other)),
                ));
                None
            }
        };

        name.map(|name| MarketplaceOwner {
            name: name.to_string(),
            email,
        })
    }

    fn check_entries(
        entries: &[Value],
        violations: &mut Vec<Violation>,
    ) -> Vec<MarketplacePluginEntry> {
        let mut seen = HashSet::new();
        let mut plugins = Vec::with_capacity(entries.len());

        for (i, entry) in entries.iter().enumerate() {
            let location = format!("marketplace.plugins[{i}]");
            let Value::Object(entry) = entry else {
                violations.push(Violation::new(
                    ViolationKind::InvalidMarketplaceField,
                    location,
                    "plugin entry must be an object",
                ));
                continue;
            };

            let name = non_empty_str(entry, "name");
            match name {
                None => violations.push(Violation::new(
                    ViolationKind::MissingPluginField,
                    format!("{location}.name"),
                    "plugin entry requires a non-empty name",
                )),
                Some(name) => {
                    if let Err(reason) = validate_name(name) {
                        violations.push(Violation::new(
                            ViolationKind::InvalidName,
                            format!("{location}.name"),
                            reason,
                        ));
                    }
                    if !seen.insert(name) {
                        violations.push(Violation::new(
                            ViolationKind::DuplicatePluginName,
                            format!("{location}.name"),
                            format!("plugin '{name}' is listed more than once"),
                        ));
                    }
                }
            }

            let source = Self::check_source(entry.get("source"), &location, violations);

            if let (Some(name), Some(source)) = (name, source) {
                plugins.push(MarketplacePluginEntry {
                    name: name.to_string(),
                    source,
                    description: entry
                        .get("description")
                        .and_then(Value::as_str)
                        .map(String::from),
                    version: entry
                        .get("version")
                        .and_then(Value::as_str)
                        .map(String::from),
                });
            }
        }

        plugins
    }

    fn check_source(
        value: Option<&Value>,
        location: &str,
        violations: &mut Vec<Violation>,
    ) -> Option<PluginSource> {
        let location = format!("{location}.source");
        match value {
            None | Some(Value::Null) => {
                violations.push(Violation::new(
                    ViolationKind::MissingPluginField,
                    location,
                    "plugin entry requires a source",
                ));
                None
            }
            Some(Value::String(path)) if path.trim().is_empty() => {
                violations.push(Violation::new(
                    ViolationKind::MissingPluginField,
                    location,
                    "plugin entry requires a non-empty source",
                ));
                None
            }
            Some(Value::String(path)) => {
                if path != SAME_REPOSITORY_SOURCE {
                    let before = violations.len();
                    check_path_prefix(&location, path, violations);
                    if violations.len() > before {
                        return None;
                    }
                }
                Some(PluginSource::Local(path.clone()))
            }
            Some(Value::Object(remote)) if !remote.is_empty() => {
                Some(PluginSource::Remote(remote.clone()))
            }
            Some(other) => {
                violations.push(Violation::new(
                    ViolationKind::MissingPluginField,
                    location,
                    format!(
                        "source must be a path or a remote source object, got {}",
                        value_type_name(other)
                    ),
                ));
                None
            }
        }
    }
}

fn check_path_prefix(location: &str, path: &str, violations: &mut Vec<Violation>) {
    if !path.starts_with("./") {
        violations.push(Violation::new(
            ViolationKind::InvalidPathPrefix,
            location,
            format!("'{path}' must start with ./"),
        ));
    } else if escapes_root(path) {
        violations.push(Violation::new(
            ViolationKind::InvalidPathPrefix,
            location,
            format!("'{path}' must stay inside the plugin root"),
        ));
    }
}

fn non_empty_str<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    map.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
