//! Plugin manifests and their components.
//!
//! A plugin is a directory with a `.claude-plugin/plugin.json` manifest
//! (or a `plugin.json` at its root) and any combination of:
//! - `commands/`: slash-command markdown files, discovered
//! - `skills/<name>/SKILL.md`: skills with YAML frontmatter, discovered
//! - agents: markdown files, only ever declared in the manifest
//! - hooks: a hooks file path or an inline object in the manifest
//!
//! Components are namespaced as `plugin-name:component-name`.
//!
//! # Directory Structure
//!
//! ```text
//! my-plugin/
//! ├── .claude-plugin/
//! │   ├── plugin.json
//! │   └── marketplace.json
//! ├── commands/
//! │   └── hello.md
//! ├── skills/
//! │   └── commit/
//! │       └── SKILL.md
//! ├── agents/
//! │   └── reviewer.md
//! └── hooks/
//!     └── hooks.json
//! ```

mod discovery;
mod error;
mod hooks;
mod loader;
mod manifest;
mod marketplace;
mod resolver;
mod validator;
mod violation;

pub use discovery::{
    Component, ComponentDiscoverer, ComponentKind, ComponentSet, Discovery, DiscoveryStrategy,
    HooksSource, ManifestField, NAMESPACE_SEP, SkillComponent, SkillFrontmatter, namespaced,
};
pub use error::PluginError;
pub use hooks::{
    DEFAULT_PLUGIN_ROOT_TOKEN, HookAction, HookRule, ResolvedHook, resolve_inline_hooks,
    resolve_plugin_root,
};
pub use loader::{LoadedMarketplace, LoadedPlugin, ManifestLoader};
pub use manifest::{
    CommandsSpec, HooksSpec, MAX_NAME_LEN, PluginAuthor, PluginDescriptor, PluginManifest,
    PluginMetadata, RawPluginManifest,
};
pub use marketplace::{
    MarketplaceManifest, MarketplaceOwner, MarketplacePluginEntry, PluginSource,
    RawMarketplaceManifest, SAME_REPOSITORY_SOURCE,
};
pub use resolver::{PathResolver, ResolveOptions, ResolvedPlugin};
pub use validator::{SchemaValidator, Validation, validate_name};
pub use violation::{Severity, Violation, ViolationKind};
