use std::fs;
use std::path::Path;

/// Every workspace member declaring a `[[bin]]` section should have the
/// `src/main.rs` it points at, and every crate other engines depend on as a
/// library should have `src/lib.rs`.
#[cfg(test)]
mod crate_entry_point_tests {
    use super::*;

    fn has_section(cargo_toml: &str, section: &str) -> bool {
        cargo_toml.contains(section)
    }

    #[test]
    fn reqmin_core_is_library_only() {
        let path = "../reqmin-core";
        assert!(Path::new(&format!("{path}/src/lib.rs")).exists());
        let cargo = fs::read_to_string(format!("{path}/Cargo.toml")).unwrap();
        assert!(!has_section(&cargo, "[[bin]]"));
    }

    #[test]
    fn reqmin_cli_declares_a_binary_entry_point() {
        let path = "../reqmin-cli";
        let cargo = fs::read_to_string(format!("{path}/Cargo.toml")).unwrap();
        assert!(has_section(&cargo, "[[bin]]"));
        assert!(Path::new(&format!("{path}/src/main.rs")).exists());
    }

    #[test]
    fn test_fixture_server_has_both_lib_and_bin() {
        let path = "../test-fixture-server";
        let cargo = fs::read_to_string(format!("{path}/Cargo.toml")).unwrap();
        assert!(has_section(&cargo, "[lib]"));
        assert!(has_section(&cargo, "[[bin]]"));
        assert!(Path::new(&format!("{path}/src/lib.rs")).exists());
        assert!(Path::new(&format!("{path}/src/main.rs")).exists());
    }

    #[test]
    fn root_workspace_lists_every_member() {
        let root = fs::read_to_string("../Cargo.toml").unwrap();
        for member in ["reqmin-core", "reqmin-cli", "test-fixture-server", "workspace-tests"] {
            assert!(
                root.contains(&format!("\"{member}\"")),
                "root workspace should list member {member}"
            );
        }
        assert!(root.contains("resolver = \"2\""));
    }
}
