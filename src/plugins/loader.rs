use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use super::PluginError;
use super::manifest::{PLUGIN_CONFIG_DIR, PLUGIN_MANIFEST_FILE, RawPluginManifest};
use super::marketplace::{MARKETPLACE_MANIFEST_FILE, RawMarketplaceManifest};

#[derive(Debug, Clone)]
pub struct LoadedMarketplace {
    pub path: PathBuf,
    pub manifest: RawMarketplaceManifest,
}

/// Parsed but unvalidated manifests for one plugin root.
#[derive(Debug, Clone)]
pub struct LoadedPlugin {
    pub root_dir: PathBuf,
    pub manifest_path: PathBuf,
    pub manifest: RawPluginManifest,
    pub marketplace: Option<LoadedMarketplace>,
}

pub struct ManifestLoader;

impl ManifestLoader {
    /// Candidate manifest locations, in lookup order.
    pub fn candidates(root_dir: &Path) -> [PathBuf; 2] {
        [
            root_dir.join(PLUGIN_CONFIG_DIR).join(PLUGIN_MANIFEST_FILE),
            root_dir.join(PLUGIN_MANIFEST_FILE),
        ]
    }

    pub fn locate(root_dir: &Path) -> Option<PathBuf> {
        Self::candidates(root_dir)
            .into_iter()
            .find(|path| path.is_file())
    }

    pub async fn load(root_dir: &Path) -> Result<LoadedPlugin, PluginError> {
        let manifest_path = Self::locate(root_dir).ok_or_else(|| PluginError::ManifestNotFound {
            path: root_dir.join(PLUGIN_CONFIG_DIR).join(PLUGIN_MANIFEST_FILE),
        })?;
        tracing::debug!("Loading plugin manifest from {}", manifest_path.display());

        let manifest: RawPluginManifest = Self::read_document(&manifest_path).await?;

        let marketplace_path = manifest_path.with_file_name(MARKETPLACE_MANIFEST_FILE);
        let marketplace = if marketplace_path.is_file() {
            tracing::debug!("Loading marketplace manifest from {}", marketplace_path.display());
            let manifest = Self::read_document(&marketplace_path).await?;
            Some(LoadedMarketplace {
                path: marketplace_path,
                manifest,
            })
        } else {
            None
        };

        Ok(LoadedPlugin {
            root_dir: root_dir.to_path_buf(),
            manifest_path,
            manifest,
            marketplace,
        })
    }

    async fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T, PluginError> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PluginError::ManifestNotFound {
                    path: path.to_path_buf(),
                });
            }
            Err(e) => {
                return Err(PluginError::Read {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
        };

        serde_json::from_str(&content).map_err(|e| PluginError::MalformedManifest {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_config(root: &Path, file: &str, content: &str) {
        let config_dir = root.join(PLUGIN_CONFIG_DIR);
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(config_dir.join(file), content).unwrap();
    }

    #[tokio::test]
    async fn test_load_from_config_dir() {
        let dir = tempdir().unwrap();
        write_config(dir.path(), PLUGIN_MANIFEST_FILE, r#"{"name":"test-plugin"}"#);

        let loaded = ManifestLoader::load(dir.path()).await.unwrap();
        assert_eq!(loaded.manifest.name.unwrap(), "test-plugin");
        assert!(loaded.manifest_path.ends_with(".claude-plugin/plugin.json"));
        assert!(loaded.marketplace.is_none());
    }

    #[tokio::test]
    async fn test_load_from_root_fallback() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(PLUGIN_MANIFEST_FILE), r#"{"name":"rooted"}"#).unwrap();

        let loaded = ManifestLoader::load(dir.path()).await.unwrap();
        assert_eq!(loaded.manifest.name.unwrap(), "rooted");
        assert_eq!(loaded.manifest_path, dir.path().join(PLUGIN_MANIFEST_FILE));
    }

    #[tokio::test]
    async fn test_config_dir_takes_precedence() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(PLUGIN_MANIFEST_FILE), r#"{"name":"outer"}"#).unwrap();
        write_config(dir.path(), PLUGIN_MANIFEST_FILE, r#"{"name":"inner"}"#);

        let loaded = ManifestLoader::load(dir.path()).await.unwrap();
        assert_eq!(loaded.manifest.name.unwrap(), "inner");
    }

    #[tokio::test]
    async fn test_load_sibling_marketplace() {
        let dir = tempdir().unwrap();
        write_config(dir.path(), PLUGIN_MANIFEST_FILE, r#"{"name":"p"}"#);
        write_config(
            dir.path(),
            MARKETPLACE_MANIFEST_FILE,
            r#"{"name":"m","owner":{"name":"o"},"plugins":[]}"#,
        );

        let loaded = ManifestLoader::load(dir.path()).await.unwrap();
        let marketplace = loaded.marketplace.unwrap();
        assert!(marketplace.path.ends_with(".claude-plugin/marketplace.json"));
        assert_eq!(marketplace.manifest.name.unwrap(), "m");
    }

    #[tokio::test]
    async fn test_manifest_not_found() {
        let dir = tempdir().unwrap();
        let err = ManifestLoader::load(dir.path()).await.unwrap_err();
        assert!(matches!(err, PluginError::ManifestNotFound { .. }));
    }

    #[tokio::test]
    async fn test_manifest_invalid_json() {
        let dir = tempdir().unwrap();
        write_config(dir.path(), PLUGIN_MANIFEST_FILE, "not json");

        let err = ManifestLoader::load(dir.path()).await.unwrap_err();
        assert!(matches!(err, PluginError::MalformedManifest { .. }));
    }

    #[tokio::test]
    async fn test_manifest_must_be_object() {
        let dir = tempdir().unwrap();
        write_config(dir.path(), PLUGIN_MANIFEST_FILE, r#"["my-plugin"]"#);

        let err = ManifestLoader::load(dir.path()).await.unwrap_err();
        assert!(matches!(err, PluginError::MalformedManifest { .. }));
    }

    #[tokio::test]
    async fn test_malformed_marketplace_is_fatal() {
        let dir = tempdir().unwrap();
        write_config(dir.path(), PLUGIN_MANIFEST_FILE, r#"{"name":"p"}"#);
        write_config(dir.path(), MARKETPLACE_MANIFEST_FILE, "{ broken");

        let err = ManifestLoader::load(dir.path()).await.unwrap_err();
        match err {
            PluginError::MalformedManifest { path, .. } => {
                assert!(path.ends_with("marketplace.json"))
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
