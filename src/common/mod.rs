mod directory;
mod frontmatter;

use std::path::PathBuf;

pub(crate) use directory::{
    SKILL_FILE, display_relative, escapes_root, glob_files, is_markdown, is_skill_file,
    resolve_relative,
};
pub use frontmatter::{
    FrontmatterError, ParsedDocument, ScalarStyle, parse_frontmatter, scalar_style,
    split_frontmatter,
};

pub(crate) fn home_dir() -> Option<PathBuf> {
    directories::UserDirs::new().map(|d| d.home_dir().to_path_buf())
}
