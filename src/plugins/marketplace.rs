use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::manifest::present;
use crate::common::resolve_relative;

pub(crate) const MARKETPLACE_MANIFEST_FILE: &str = "marketplace.json";

/// Source value meaning "this marketplace's own repository".
pub const SAME_REPOSITORY_SOURCE: &str = "./";

/// `marketplace.json` as read from disk.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMarketplaceManifest {
    #[serde(default, deserialize_with = "present")]
    pub name: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub owner: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub plugins: Option<Value>,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketplaceOwner {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PluginSource {
    /// Relative path inside the marketplace repository.
    Local(String),
    /// Remote descriptor such as `{"source": "github", "repo": "..."}`; never resolved.
    Remote(Map<String, Value>),
}

impl PluginSource {
    /// Filesystem location of a local source, relative to the marketplace root.
    pub fn local_path(&self, marketplace_root: &Path) -> Option<PathBuf> {
        match self {
            Self::Local(path) => Some(resolve_relative(marketplace_root, path)),
            Self::Remote(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketplacePluginEntry {
    pub name: String,
    pub source: PluginSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// A `marketplace.json` that passed schema validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketplaceManifest {
    pub name: String,
    pub owner: MarketplaceOwner,
    pub plugins: Vec<MarketplacePluginEntry>,
}
