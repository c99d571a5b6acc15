//! YAML frontmatter splitting, parsing and `description` style detection.
//!
//! Frontmatter is the block between a leading `---` line and the next line
//! consisting only of `---`. The style check works on the raw text because
//! serde erases how a scalar was written.

use serde::de::DeserializeOwned;

const DELIMITER: &str = "---";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FrontmatterError {
    #[error("document must start with YAML frontmatter (---)")]
    Missing,

    #[error("frontmatter is not terminated with ---")]
    Unterminated,

    #[error("failed to parse frontmatter: {0}")]
    Yaml(String),
}

pub struct ParsedDocument<F> {
    pub frontmatter: F,
    pub raw_frontmatter: String,
    pub body: String,
}

/// Splits a document into its raw frontmatter text and body.
pub fn split_frontmatter(content: &str) -> Result<(&str, &str), FrontmatterError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut lines = content.split_inclusive('\n');

    let first = lines.next().ok_or(FrontmatterError::Missing)?;
    if first.trim_end() != DELIMITER {
        return Err(FrontmatterError::Missing);
    }

    let start = first.len();
    let mut offset = start;
    for line in lines {
        if line.trim_end() == DELIMITER {
            let raw = &content[start..offset];
            let body = &content[offset + line.len()..];
            return Ok((raw, body));
        }
        offset += line.len();
    }

    Err(FrontmatterError::Unterminated)
}

pub fn parse_frontmatter<F: DeserializeOwned>(
    content: &str,
) -> Result<ParsedDocument<F>, FrontmatterError> {
    let (raw, body) = split_frontmatter(content)?;

    let frontmatter: F =
        serde_yaml_bw::from_str(raw).map_err(|e| FrontmatterError::Yaml(e.to_string()))?;

    Ok(ParsedDocument {
        frontmatter,
        raw_frontmatter: raw.to_string(),
        body: body.trim().to_string(),
    })
}

/// How a top-level scalar key is written in the raw frontmatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarStyle {
    Absent,
    SingleLine,
    /// `|`, `|-`, `|+`, optionally with an indentation indicator.
    BlockLiteral,
    /// `>` and its variants.
    Folded,
    /// Plain or quoted value spread over several lines.
    MultiLineFlow,
}

impl ScalarStyle {
    /// Multi-line values must be block literals; anything on a single line is fine.
    pub fn is_accepted(self) -> bool {
        matches!(self, Self::SingleLine | Self::BlockLiteral)
    }
}

impl std::fmt::Display for ScalarStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Absent => write!(f, "no value"),
            Self::SingleLine => write!(f, "a single-line value"),
            Self::BlockLiteral => write!(f, "a block literal"),
            Self::Folded => write!(f, "a folded scalar (>)"),
            Self::MultiLineFlow => write!(f, "a plain or quoted scalar spanning lines"),
        }
    }
}

/// Determines how `key` is written at the top level of `raw` frontmatter.
///
/// Keys may be quoted or followed by spaces before the `:`, and values may
/// start with `&anchor` or `!tag` properties. Flow mappings and explicit
/// `? key` entries are not recognised and come back as [`ScalarStyle::Absent`].
pub fn scalar_style(raw: &str, key: &str) -> ScalarStyle {
    let mut lines = raw.lines();

    let value = loop {
        let Some(line) = lines.next() else {
            return ScalarStyle::Absent;
        };
        if let Some(rest) = entry_value(line, key) {
            break strip_properties(strip_comment(rest).trim());
        }
    };

    if value.starts_with('|') {
        return ScalarStyle::BlockLiteral;
    }
    if value.starts_with('>') {
        return ScalarStyle::Folded;
    }

    let continued = lines
        .take_while(|line| line.is_empty() || line.starts_with([' ', '\t']))
        .any(|line| !line.trim().is_empty() && !line.trim_start().starts_with('#'));

    match (value.is_empty(), continued) {
        (true, false) => ScalarStyle::Absent,
        (false, false) => ScalarStyle::SingleLine,
        (_, true) => ScalarStyle::MultiLineFlow,
    }
}

/// Text after the `:` when `line` is a top-level entry for `key`.
fn entry_value<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    if let Some(quote) = line.chars().next().filter(|&c| matches!(c, '"' | '\'')) {
        let inner = &line[1..];
        let close = inner.find(quote)?;
        let rest = inner[close + 1..].trim_start().strip_prefix(':')?;
        return (&inner[..close] == key).then_some(rest);
    }

    // `description:foo` is a plain scalar, not a key
    let colon = line.match_indices(':').map(|(i, _)| i).find(|&i| {
        let after = &line[i + 1..];
        after.is_empty() || after.starts_with([' ', '\t'])
    })?;
    (line[..colon].trim_end() == key).then_some(&line[colon + 1..])
}

/// Drops leading `&anchor` and `!tag` node properties.
fn strip_properties(mut value: &str) -> &str {
    while value.starts_with(['&', '!']) {
        value = match value.find([' ', '\t']) {
            Some(idx) => value[idx..].trim_start(),
            None => "",
        };
    }
    value
}

fn strip_comment(value: &str) -> &str {
    let trimmed = value.trim_start();
    if trimmed.starts_with('"') || trimmed.starts_with('\'') {
        return value;
    }
    match value.find(" #") {
        Some(idx) => &value[..idx],
        None if trimmed.starts_with('#') => "",
        None => value,
    }
}
