//! File-based Configuration Provider
//!
//! Reads settings from a JSON object on disk. A missing file is an empty
//! configuration; a file that is not a JSON object is an error.

use std::collections::HashMap;
use std::path::PathBuf;

use serde_json::Value;
use tokio::sync::OnceCell;

use super::ConfigResult;
use super::provider::ConfigProvider;

pub struct FileConfigProvider {
    path: PathBuf,
    data: OnceCell<HashMap<String, Value>>,
}

impl FileConfigProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            data: OnceCell::new(),
        }
    }

    async fn load(&self) -> ConfigResult<HashMap<String, Value>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No config file at {}", self.path.display());
                return Ok(HashMap::new());
            }
            Err(e) => return Err(e.into()),
        };
        tracing::debug!("Loaded config file {}", self.path.display());
        Ok(serde_json::from_str(&content)?)
    }

    async fn data(&self) -> ConfigResult<&HashMap<String, Value>> {
        self.data.get_or_try_init(|| self.load()).await
    }
}

#[async_trait::async_trait]
impl ConfigProvider for FileConfigProvider {
    fn name(&self) -> &str {
        "file"
    }

    async fn get_raw(&self, key: &str) -> ConfigResult<Option<String>> {
        let map = self.data().await?;

        // dot notation walks nested objects
        let mut parts = key.split('.');
        let mut current = parts.next().and_then(|first| map.get(first));
        for part in parts {
            current = current.and_then(|v| v.get(part));
        }

        Ok(match current {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Null) | None => None,
            Some(v) => Some(v.to_string()),
        })
    }
}

impl std::fmt::Debug for FileConfigProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileConfigProvider")
            .field("path", &self.path)
            .field("loaded", &self.data.initialized())
            .finish()
    }
}
