//! Integration tests for the permset binary
//!
//! Each test gets its own data directory and permset.yaml, and runs the
//! built binary against it.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const CONFIG: &str = "apiVersion: permset/v1\nkind: Config\nspec:\n  environment: production\n  database:\n    path: db\n";

fn setup() -> (TempDir, PathBuf) {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("permset.yaml");
    fs::write(&config, CONFIG).unwrap();
    (temp, config)
}

fn permset(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_permset"))
        .arg("--config")
        .arg(config)
        .args(args)
        .env_remove("PERMSET_ENV")
        .env_remove("PERMSET_DATABASE")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .output()
        .expect("Failed to run permset")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn assert_ok(output: &Output) {
    assert!(
        output.status.success(),
        "command failed\nSTDOUT:\n{}\nSTDERR:\n{}",
        stdout(output),
        stderr(output)
    );
}

#[test]
fn test_cli_version_output() {
    let output = Command::new(env!("CARGO_BIN_EXE_permset"))
        .arg("--version")
        .output()
        .expect("Failed to run permset --version");

    assert_ok(&output);
    assert!(stdout(&output).contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_migrate_then_create_role_syncs() {
    let (_temp, config) = setup();

    assert_ok(&permset(&config, &["db", "migrate"]));
    assert_ok(&permset(&config, &["set", "create", "Orders", "--set", "OrderManagement"]));

    let created = permset(&config, &["role", "create", "clerk", "--set", "Orders"]);
    assert_ok(&created);
    assert!(stdout(&created).contains("clerk -> [OrderManagement]"));

    let boot = permset(&config, &["boot"]);
    assert_ok(&boot);
    assert!(stdout(&boot).contains("clerk"));
    assert!(stdout(&boot).contains("OrderManagement"));
}

#[test]
fn test_unresolvable_set_stays_repairable() {
    let (_temp, config) = setup();
    assert_ok(&permset(&config, &["db", "migrate"]));

    let set = permset(&config, &["set", "create", "Bogus", "--set", "NoSuchSet"]);
    assert_ok(&set);
    assert!(stderr(&set).contains("does not resolve yet"));

    // Role row is written, then the post-save sync fails
    let role = permset(&config, &["role", "create", "clerk", "--set", "Bogus"]);
    assert!(!role.status.success());
    assert!(stderr(&role).contains("NoSuchSet"));

    // Full resync keeps failing while the bad set is attached
    let boot = permset(&config, &["boot"]);
    assert!(!boot.status.success());

    let list = permset(&config, &["role", "list"]);
    assert_ok(&list);
    assert!(stdout(&list).contains("clerk"));

    let show = permset(&config, &["role", "show", "clerk"]);
    assert_ok(&show);
    assert!(stdout(&show).contains("unresolved"));

    assert_ok(&permset(&config, &["set", "list"]));
    assert_ok(&permset(&config, &["role", "delete", "clerk"]));
    assert_ok(&permset(&config, &["set", "delete", "Bogus"]));

    let list = permset(&config, &["role", "list"]);
    assert_ok(&list);
    assert!(!stdout(&list).contains("clerk"));
    assert_ok(&permset(&config, &["boot"]));
}

#[test]
fn test_set_delete_detaches_unresolvable_set() {
    let (_temp, config) = setup();
    assert_ok(&permset(&config, &["db", "migrate"]));
    assert_ok(&permset(&config, &["set", "create", "Bogus", "--set", "NoSuchSet"]));
    assert!(!permset(&config, &["role", "create", "clerk", "--set", "Bogus"]).status.success());

    // Removing the set also removes the association, so the role syncs again
    assert_ok(&permset(&config, &["set", "delete", "Bogus"]));
    let boot = permset(&config, &["boot"]);
    assert_ok(&boot);
    assert!(stdout(&boot).contains("clerk"));
}

#[test]
fn test_duplicate_role_name_rejected() {
    let (_temp, config) = setup();
    assert_ok(&permset(&config, &["db", "migrate"]));
    assert_ok(&permset(&config, &["role", "create", "Manager"]));

    let duplicate = permset(&config, &["role", "create", "manager"]);

    assert!(!duplicate.status.success());
    assert!(stderr(&duplicate).contains("Name has already been taken"));
}

#[test]
fn test_role_commands_without_database() {
    let (_temp, config) = setup();

    let list = permset(&config, &["role", "list"]);

    assert!(!list.status.success());
}
