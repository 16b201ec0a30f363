use proptest::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// For any crate in the workspace that uses a dependency also declared in
/// the root `[workspace.dependencies]` table, that crate should inherit it
/// with `workspace = true` rather than pinning its own version.
#[cfg(test)]
mod workspace_dependency_tests {
    use super::*;

    fn workspace_dependency_names() -> Vec<&'static str> {
        vec![
            "tokio",
            "reqwest",
            "axum",
            "tower-http",
            "serde",
            "serde_json",
            "serde_yaml",
            "chrono",
            "thiserror",
            "anyhow",
            "tracing",
            "tracing-subscriber",
            "clap",
            "regex",
            "form_urlencoded",
            "uuid",
        ]
    }

    fn parse_cargo_toml_dependencies(content: &str) -> HashMap<String, bool> {
        let mut dependencies = HashMap::new();
        let mut in_dependencies_section = false;

        for line in content.lines() {
            let line = line.trim();

            if line == "[dependencies]" || line == "[dev-dependencies]" || line == "[build-dependencies]" {
                in_dependencies_section = true;
                continue;
            }
            if line.starts_with('[') && line.ends_with(']') {
                in_dependencies_section = line == "[dependencies]";
                continue;
            }
            if in_dependencies_section && !line.is_empty() && !line.starts_with('#') {
                if let Some(eq_pos) = line.find('=') {
                    let dep_name = line[..eq_pos].trim().to_string();
                    let dep_value = line[eq_pos + 1..].trim();
                    dependencies.insert(dep_name, dep_value.contains("workspace = true"));
                }
            }
        }

        dependencies
    }

    proptest! {
        #[test]
        fn crate_dependencies_inherit_from_workspace(
            crate_name in prop::sample::select(vec!["reqmin-core", "reqmin-cli", "test-fixture-server"])
        ) {
            let cargo_toml_path = format!("../{}/Cargo.toml", crate_name);
            if !Path::new(&cargo_toml_path).exists() {
                return Ok(());
            }

            let content = fs::read_to_string(&cargo_toml_path)
                .map_err(|e| TestCaseError::fail(format!("failed to read {cargo_toml_path}: {e}")))?;
            let crate_deps = parse_cargo_toml_dependencies(&content);

            for dep_name in workspace_dependency_names() {
                if let Some(&uses_workspace) = crate_deps.get(dep_name) {
                    prop_assert!(
                        uses_workspace,
                        "crate '{}' declares '{}' without 'workspace = true'",
                        crate_name,
                        dep_name
                    );
                }
            }
        }
    }

    #[test]
    fn root_workspace_dependencies_cover_the_shared_stack() {
        let root = fs::read_to_string("../Cargo.toml").expect("root Cargo.toml should be readable");
        assert!(root.contains("[workspace.dependencies]"));
        for dep in workspace_dependency_names() {
            assert!(
                root.contains(&format!("{dep} = ")),
                "root workspace should declare {dep}"
            );
        }
    }
}
