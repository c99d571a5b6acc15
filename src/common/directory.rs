use std::path::{Component, Path, PathBuf};

use glob::{MatchOptions, Pattern};

pub const SKILL_FILE: &str = "SKILL.md";

pub fn is_markdown(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == "md")
}

pub fn is_skill_file(path: &Path) -> bool {
    path.file_name().is_some_and(|name| name == SKILL_FILE)
}

/// Returns every regular file under `base` matching the relative `pattern`,
/// sorted by path. A missing `base` yields an empty list.
pub fn glob_files(base: &Path, pattern: &str) -> Result<Vec<PathBuf>, glob::PatternError> {
    if !base.is_dir() {
        return Ok(Vec::new());
    }

    let full = format!(
        "{}/{}",
        Pattern::escape(&base.to_string_lossy()).trim_end_matches('/'),
        pattern
    );
    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };

    let mut files: Vec<PathBuf> = glob::glob_with(&full, options)?
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::warn!("Skipping unreadable path during discovery: {}", e);
                None
            }
        })
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    Ok(files)
}

/// Joins a manifest-relative path (`./agents/x.md`) onto the plugin root.
pub fn resolve_relative(root: &Path, declared: &str) -> PathBuf {
    let trimmed = declared.trim_start_matches("./");
    if trimmed.is_empty() || trimmed == "." {
        return root.to_path_buf();
    }
    root.join(trimmed)
}

/// Renders `path` relative to `root` in manifest notation (`./commands/x.md`).
pub fn display_relative(root: &Path, path: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(rel) => {
            let parts: Vec<String> = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            format!("./{}", parts.join("/"))
        }
        Err(_) => path.display().to_string(),
    }
}

pub fn escapes_root(declared: &str) -> bool {
    Path::new(declared)
        .components()
        .any(|c| matches!(c, Component::ParentDir | Component::RootDir))
}
