//! Lint Scenario Tests
//!
//! End-to-end passes over plugin trees built in temporary directories:
//! manifest loading, schema rules, discovery strategies, path resolution
//! and the final report.
//!
//! Run: cargo nextest run --test lint_scenarios

use std::path::Path;

use claude_plugin_lint::{
    ComponentKind, DiscoveryStrategy, LintReport, LintSettings, PluginLinter, ViolationKind,
    plugins::{SchemaValidator, validate_name},
};
use tempfile::{TempDir, tempdir};

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, content).unwrap();

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();
    }
}

fn plugin(manifest: &str) -> TempDir {
    let dir = tempdir().unwrap();
    write(dir.path(), ".claude-plugin/plugin.json", manifest);
    dir
}

async fn lint(root: &Path) -> LintReport {
    PluginLinter::new(LintSettings::default()).lint(root).await
}

fn kinds(report: &LintReport) -> Vec<ViolationKind> {
    report.violations.iter().map(|v| v.kind).collect()
}

const TESTING_SKILL: &str =
    "---\nname: testing\ndescription: ExUnit testing patterns\n---\n\n# Testing\n";

// =============================================================================
// Scenarios
// =============================================================================

mod scenarios {
    use super::*;

    #[tokio::test]
    async fn test_complete_plugin_has_no_violations() {
        let dir = tempdir().unwrap();
        write(
            dir.path(),
            "plugin.json",
            r#"{"name":"my-plugin","agents":["./agents/architect.md"]}"#,
        );
        write(dir.path(), "agents/architect.md", "# Architect");
        write(dir.path(), "commands/build.md", "# Build");
        write(dir.path(), "skills/testing/SKILL.md", TESTING_SKILL);

        let report = lint(dir.path()).await;
        assert!(report.success, "unexpected: {:?}", report.violations);
        assert!(report.violations.is_empty());

        let set = report.components.unwrap();
        assert_eq!(set.agents.len(), 1);
        assert_eq!(set.agents[0].name, "my-plugin:architect");
        assert_eq!(set.commands.len(), 1);
        assert_eq!(set.commands[0].name, "my-plugin:build");
        assert_eq!(set.skills.len(), 1);
        assert_eq!(set.skills[0].component.name, "my-plugin:testing");
    }

    #[tokio::test]
    async fn test_invalid_plugin_name() {
        let dir = plugin(r#"{"name":"My_Plugin"}"#);
        let report = lint(dir.path()).await;

        assert!(!report.success);
        assert_eq!(kinds(&report), vec![ViolationKind::InvalidName]);
        assert!(report.components.is_none());
    }

    #[tokio::test]
    async fn test_plain_multiline_description() {
        let dir = plugin(r#"{"name":"my-plugin"}"#);
        write(
            dir.path(),
            "skills/testing/SKILL.md",
            "---\nname: testing\ndescription:\n  Multi-line without pipe\n---\n",
        );

        let report = lint(dir.path()).await;
        assert!(!report.success);
        assert_eq!(kinds(&report), vec![ViolationKind::InvalidDescriptionStyle]);
        assert_eq!(report.violations[0].location, "./skills/testing/SKILL.md");
        assert_eq!(report.components.unwrap().skills.len(), 1);
    }

    #[tokio::test]
    async fn test_agent_without_extension() {
        let dir = plugin(r#"{"name":"my-plugin","agents":["./agents/debugger"]}"#);
        let report = lint(dir.path()).await;

        assert!(!report.success);
        assert_eq!(kinds(&report), vec![ViolationKind::InvalidAgentPath]);
    }

    #[tokio::test]
    async fn test_marketplace_entry_without_source() {
        let dir = plugin(r#"{"name":"my-plugin"}"#);
        write(
            dir.path(),
            ".claude-plugin/marketplace.json",
            r#"{"name":"tools","owner":{"name":"Acme"},"plugins":[{"name":"my-plugin"}]}"#,
        );

        let report = lint(dir.path()).await;
        assert!(!report.success);
        assert_eq!(kinds(&report), vec![ViolationKind::MissingPluginField]);
        assert_eq!(report.violations[0].location, "marketplace.plugins[0].source");
    }
}

// =============================================================================
// Properties
// =============================================================================

mod properties {
    use super::*;

    #[test]
    fn test_name_rule() {
        let longest = "a".repeat(64);
        for name in ["a", "my-plugin", "plugin-2", "x1-y2-z3", longest.as_str()] {
            assert!(validate_name(name).is_ok(), "{name} should be valid");
        }

        let too_long = "a".repeat(65);
        for name in [
            "",
            "-a",
            "a-",
            "a--b",
            "My-Plugin",
            "my_plugin",
            "my plugin",
            too_long.as_str(),
        ] {
            assert!(validate_name(name).is_err(), "{name} should be invalid");
        }
    }

    #[tokio::test]
    async fn test_skills_field_always_rejected() {
        for value in ["null", "[]", r#"["./skills/a"]"#, r#""./skills""#, "{}"] {
            let dir = plugin(&format!(r#"{{"name":"p","skills":{value}}}"#));
            let report = lint(dir.path()).await;
            assert!(
                kinds(&report).contains(&ViolationKind::UnexpectedSkillsField),
                "skills: {value}"
            );
        }
    }

    #[tokio::test]
    async fn test_agent_path_must_end_in_md() {
        for agent in ["./agents/x", "./agents/x.MD", "./agents/x.md.bak", "./agents/"] {
            let dir = plugin(&format!(r#"{{"name":"p","agents":["{agent}"]}}"#));
            let report = lint(dir.path()).await;
            assert_eq!(kinds(&report), vec![ViolationKind::InvalidAgentPath], "agent: {agent}");
        }
    }

    #[tokio::test]
    async fn test_discovery_is_idempotent() {
        let dir = plugin(r#"{"name":"p","agents":["./agents/a.md"]}"#);
        write(dir.path(), "agents/a.md", "a");
        write(dir.path(), "commands/b.md", "b");
        write(dir.path(), "commands/a.md", "a");
        write(dir.path(), "skills/testing/SKILL.md", TESTING_SKILL);

        let first = lint(dir.path()).await;
        let second = lint(dir.path()).await;
        assert_eq!(first.components, second.components);
        assert_eq!(first.violations, second.violations);
    }

    #[tokio::test]
    async fn test_commands_directory_is_not_recursive() {
        let dir = plugin(r#"{"name":"p","commands":"./commands/"}"#);
        write(dir.path(), "commands/top.md", "top");
        write(dir.path(), "commands/other.txt", "not markdown");
        write(dir.path(), "commands/nested/deep.md", "deep");

        let report = lint(dir.path()).await;
        assert!(report.success);
        let names: Vec<_> = report
            .components
            .unwrap()
            .commands
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["p:top"]);
    }

    #[test]
    fn test_strategy_per_kind() {
        assert!(matches!(
            ComponentKind::Command.strategy(),
            DiscoveryStrategy::Implicit { .. }
        ));
        assert!(matches!(
            ComponentKind::Skill.strategy(),
            DiscoveryStrategy::Implicit { .. }
        ));
        assert!(matches!(
            ComponentKind::Agent.strategy(),
            DiscoveryStrategy::Explicit(_)
        ));
        assert!(matches!(
            ComponentKind::Hooks.strategy(),
            DiscoveryStrategy::Explicit(_)
        ));
    }
}

// =============================================================================
// Manifest Loading
// =============================================================================

mod loading {
    use super::*;

    #[tokio::test]
    async fn test_missing_manifest() {
        let dir = tempdir().unwrap();
        let report = lint(dir.path()).await;
        assert!(report.is_fatal());
        assert_eq!(report.fatal.unwrap().kind, ViolationKind::MissingManifest);
    }

    #[tokio::test]
    async fn test_malformed_manifest() {
        for content in ["{", "[]", "\"my-plugin\"", ""] {
            let dir = plugin(content);
            let report = lint(dir.path()).await;
            assert_eq!(
                report.fatal.map(|f| f.kind),
                Some(ViolationKind::MalformedManifest),
                "content: {content:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_validator_collects_all_rules() {
        let dir = plugin(
            r#"{
                "name": "Bad Name",
                "commands": 42,
                "agents": ["agents/a.md", "./agents/b"],
                "hooks": true,
                "skills": []
            }"#,
        );
        let report = lint(dir.path()).await;

        let found = kinds(&report);
        for expected in [
            ViolationKind::InvalidName,
            ViolationKind::InvalidCommandsType,
            ViolationKind::InvalidAgentPath,
            ViolationKind::InvalidHooksType,
            ViolationKind::UnexpectedSkillsField,
            ViolationKind::InvalidPathPrefix,
        ] {
            assert!(found.contains(&expected), "missing {expected}: {found:?}");
        }
    }

    #[tokio::test]
    async fn test_validate_without_discovery() {
        let dir = plugin(r#"{"name":"p","commands":["./commands/a.md"]}"#);
        let loaded = claude_plugin_lint::plugins::ManifestLoader::load(dir.path())
            .await
            .unwrap();
        let validation = SchemaValidator::validate(&loaded);
        assert!(validation.is_valid());
        assert_eq!(validation.plugin.unwrap().name(), "p");
    }
}

// =============================================================================
// Resolution
// =============================================================================

mod resolution {
    use super::*;

    #[tokio::test]
    async fn test_dangling_references() {
        let dir = plugin(
            r#"{
                "name": "p",
                "commands": ["./commands/present.md", "./commands/gone.md"],
                "agents": ["./agents/gone.md"],
                "hooks": "./hooks/hooks.json"
            }"#,
        );
        write(dir.path(), "commands/present.md", "present");

        let report = lint(dir.path()).await;
        let mut locations: Vec<_> = report
            .violations
            .iter()
            .filter(|v| v.kind == ViolationKind::DanglingReference)
            .map(|v| v.location.as_str())
            .collect();
        locations.sort();
        assert_eq!(
            locations,
            vec!["./agents/gone.md", "./commands/gone.md", "./hooks/hooks.json"]
        );
    }

    #[tokio::test]
    async fn test_hooks_file_and_inline_hooks() {
        let dir = plugin(r#"{"name":"p","hooks":"./hooks/hooks.json"}"#);
        write(dir.path(), "hooks/hooks.json", "{}");
        assert!(lint(dir.path()).await.success);

        let dir = plugin(
            r#"{"name":"p","hooks":{"hooks":{"PostToolUse":[{"matcher":"Write","hooks":[{"type":"command","command":"${CLAUDE_PLUGIN_ROOT}/fmt.sh"}]}]}}}"#,
        );
        let report = lint(dir.path()).await;
        assert!(report.success);
        assert_eq!(report.hook_commands.len(), 1);
        assert_eq!(report.hook_commands[0].event, "PostToolUse");
        assert_eq!(
            report.hook_commands[0].command,
            format!("{}/fmt.sh", dir.path().display())
        );
    }

    #[tokio::test]
    async fn test_skill_frontmatter_problems_are_warnings() {
        let dir = plugin(r#"{"name":"p"}"#);
        write(dir.path(), "skills/good/SKILL.md", TESTING_SKILL);
        write(dir.path(), "skills/bare/SKILL.md", "# No frontmatter");
        write(
            dir.path(),
            "skills/open/SKILL.md",
            "---\nname: open\ndescription: never closed\n",
        );

        let report = lint(dir.path()).await;
        assert!(!report.success);
        assert_eq!(report.error_count(), 0);
        assert_eq!(report.warning_count(), 2);
        assert!(
            report
                .violations
                .iter()
                .all(|v| v.kind == ViolationKind::InvalidFrontmatter)
        );
        assert_eq!(report.components.unwrap().skills.len(), 1);
    }

    #[tokio::test]
    async fn test_block_literal_description_passes() {
        let dir = plugin(r#"{"name":"p"}"#);
        write(
            dir.path(),
            "skills/testing/SKILL.md",
            "---\nname: testing\ndescription: |\n  Line one\n  Line two\n---\n",
        );
        assert!(lint(dir.path()).await.success);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_permission_check_can_be_disabled() {
        use std::os::unix::fs::PermissionsExt;

        let dir = plugin(r#"{"name":"p"}"#);
        write(dir.path(), "commands/private.md", "secret");
        std::fs::set_permissions(
            dir.path().join("commands/private.md"),
            std::fs::Permissions::from_mode(0o600),
        )
        .unwrap();

        let report = lint(dir.path()).await;
        assert_eq!(kinds(&report), vec![ViolationKind::UnreadableFile]);

        let lenient = PluginLinter::new(LintSettings {
            check_permissions: false,
            ..Default::default()
        });
        assert!(lenient.lint(dir.path()).await.success);
    }

    #[tokio::test]
    async fn test_marketplace_local_sources() {
        let dir = plugin(r#"{"name":"p"}"#);
        write(
            dir.path(),
            ".claude-plugin/marketplace.json",
            r#"{
                "name": "tools",
                "owner": {"name": "Acme"},
                "plugins": [
                    {"name": "p", "source": "./"},
                    {"name": "other", "source": "./plugins/other"},
                    {"name": "remote", "source": {"source": "github", "repo": "acme/remote"}}
                ]
            }"#,
        );

        let report = lint(dir.path()).await;
        assert_eq!(kinds(&report), vec![ViolationKind::DanglingReference]);
        assert_eq!(report.violations[0].location, "marketplace.plugins[1].source");
    }
}
