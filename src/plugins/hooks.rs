//! Inline hook configuration and plugin-root placeholder expansion.
//!
//! Accepted shapes:
//! - official: `{"hooks": {"PreToolUse": [{"matcher": "...", "hooks": [{"command": "..."}]}]}}`
//! - nested without the wrapper: `{"PreToolUse": [{"matcher": "...", "hooks": [...]}]}`
//! - flat legacy: `{"PreToolUse": ["echo pre"]}`

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_PLUGIN_ROOT_TOKEN: &str = "${CLAUDE_PLUGIN_ROOT}";

/// Pure string substitution; the result is never shell-evaluated.
pub fn resolve_plugin_root(value: &str, token: &str, root: &Path) -> String {
    if token.is_empty() {
        return value.to_string();
    }
    value.replace(token, &root.display().to_string())
}

/// A hook rule entry mapping an optional matcher to a list of actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookRule {
    #[serde(default)]
    pub matcher: Option<String>,
    pub hooks: Vec<HookAction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookAction {
    #[serde(rename = "type")]
    pub hook_type: String,
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub timeout: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InlineHooks {
    Official {
        hooks: BTreeMap<String, Vec<HookRule>>,
    },
    Nested(BTreeMap<String, Vec<HookRule>>),
    Flat(BTreeMap<String, Vec<String>>),
}

/// A hook command with the plugin-root placeholder expanded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedHook {
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matcher: Option<String>,
    pub command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

/// Expands every command of an inline hooks object, ordered by event name.
///
/// Objects that match none of the accepted shapes are treated as opaque and
/// yield no commands.
pub fn resolve_inline_hooks(
    inline: &Map<String, Value>,
    token: &str,
    root: &Path,
) -> Vec<ResolvedHook> {
    let parsed: InlineHooks = match serde_json::from_value(Value::Object(inline.clone())) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::debug!("Inline hooks are not in a known format, leaving opaque: {}", e);
            return Vec::new();
        }
    };

    let mut resolved = Vec::new();
    match parsed {
        InlineHooks::Official { hooks } | InlineHooks::Nested(hooks) => {
            for (event, rules) in hooks {
                for rule in rules {
                    for action in rule.hooks.iter().filter(|a| a.hook_type == "command") {
                        let Some(command) = action.command.as_deref() else {
                            continue;
                        };
                        resolved.push(ResolvedHook {
                            event: event.clone(),
                            matcher: rule.matcher.clone(),
                            command: resolve_plugin_root(command, token, root),
                            timeout_secs: action.timeout,
                        });
                    }
                }
            }
        }
        InlineHooks::Flat(hooks) => {
            for (event, commands) in hooks {
                for command in commands {
                    resolved.push(ResolvedHook {
                        event: event.clone(),
                        matcher: None,
                        command: resolve_plugin_root(&command, token, root),
                        timeout_secs: None,
                    });
                }
            }
        }
    }
    resolved
}
