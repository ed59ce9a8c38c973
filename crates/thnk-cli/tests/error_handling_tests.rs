//! Tests for error handling, suggestions and exit codes.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use assert_cmd::cargo;
use predicates::prelude::*;
use tempfile::TempDir;

fn thnk(dir: &Path) -> Command {
    let mut cmd = cargo::cargo_bin_cmd!("thnk");
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir.join(".config"))
        .env("THNK_BACKEND__PROVIDER", "echo")
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

fn with_thnkfile(source: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("Thnkfile"), source).unwrap();
    temp
}

#[test]
fn missing_thnkfile_is_not_found() {
    let temp = TempDir::new().unwrap();
    thnk(temp.path())
        .arg("build")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("No Thnkfile found"))
        .stderr(predicate::str::contains("--file"));
}

#[test]
fn prompt_in_file_and_recipe_is_a_user_error() {
    let temp = with_thnkfile("out.md: out.prompt.md\n\tInline prompt\n");
    fs::write(temp.path().join("out.prompt.md"), "File prompt").unwrap();

    thnk(temp.path())
        .arg("build")
        .assert()
        .code(2)
        .stderr(predicate::str::contains(
            "Cannot have prompt both in file and in Thnkfile",
        ));
}

#[test]
fn missing_dependency_names_both_sides() {
    let temp = with_thnkfile("out.md: notes.txt\n\tSummarise\n");

    thnk(temp.path())
        .arg("build")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("notes.txt"))
        .stderr(predicate::str::contains("out.md"));
}

#[test]
fn cycle_is_reported() {
    let temp = with_thnkfile("a.md: b.md\n\tA\nb.md: a.md\n\tB\n");

    thnk(temp.path())
        .arg("plan")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Circular dependency: a.md -> b.md -> a.md"));
}

#[test]
fn syntax_error_carries_line_number() {
    let temp = with_thnkfile("out.md:\n\tWrite\nthis line has no colon\n");

    thnk(temp.path())
        .arg("targets")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("line 3"));
}

#[test]
fn openai_without_api_key_is_a_configuration_error() {
    let temp = with_thnkfile("out.md:\n\tWrite\n");

    thnk(temp.path())
        .env("THNK_BACKEND__PROVIDER", "openai")
        .env("THNK_BACKEND__API_KEY_ENV", "THNK_TEST_MISSING_KEY")
        .env_remove("THNK_TEST_MISSING_KEY")
        .arg("build")
        .assert()
        .code(4)
        .stderr(predicate::str::contains("THNK_TEST_MISSING_KEY"));
}

#[test]
fn empty_thnkfile_has_no_rules() {
    let temp = with_thnkfile("# nothing here\n");

    thnk(temp.path())
        .arg("build")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No rules in Thnkfile"));
}

#[test]
fn unknown_config_key_is_a_configuration_error() {
    let temp = TempDir::new().unwrap();
    thnk(temp.path())
        .args(["config", "get", "does.not.exist"])
        .assert()
        .code(4);
}
