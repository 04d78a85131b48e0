//! End-to-end integration tests for the `hscc` driver.
//!
//! Each test writes a `.hs` source file and invokes `hscc check`, asserting
//! on exit status and the printed diagnostics or `--dump-types` output.
//! There is no codegen in this core (§1), so unlike the teacher's
//! `compile_and_run` these stop at "did it check", not "did it run".
//!
//! Grounded on `meshc/tests/e2e.rs`'s `Command::new(find_meshc())` shape.

use std::path::PathBuf;
use std::process::Command;

fn hscc_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_hscc"))
}

fn write_source(dir: &tempfile::TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("main.hs");
    std::fs::write(&path, contents).expect("failed to write main.hs");
    path
}

#[test]
fn check_accepts_a_well_typed_module() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_source(&dir, "id x = x\n");

    let output = Command::new(hscc_bin())
        .args(["check", file.to_str().unwrap()])
        .output()
        .expect("failed to run hscc check");

    assert!(
        output.status.success(),
        "expected success, stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn check_dump_types_prints_the_generalized_scheme() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_source(&dir, "id x = x\n");

    let output = Command::new(hscc_bin())
        .args(["check", "--dump-types", file.to_str().unwrap()])
        .output()
        .expect("failed to run hscc check --dump-types");

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("id ::"), "expected id's scheme in stdout, got: {stdout}");
}

#[test]
fn check_rejects_a_signature_the_body_cannot_satisfy() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_source(&dir, "f :: a -> a\nf x = x + 1\n");

    let output = Command::new(hscc_bin())
        .args(["check", file.to_str().unwrap()])
        .output()
        .expect("failed to run hscc check");

    assert!(!output.status.success(), "expected the unsatisfiable signature to fail checking");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.is_empty(), "expected a rendered diagnostic on stderr");
}

#[test]
fn check_reports_a_parse_error_without_panicking() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_source(&dir, "f x = ) (\n");

    let output = Command::new(hscc_bin())
        .args(["check", file.to_str().unwrap()])
        .output()
        .expect("failed to run hscc check");

    assert!(!output.status.success());
    assert!(!String::from_utf8_lossy(&output.stderr).is_empty());
}

#[test]
fn dump_kinds_prints_the_builtin_type_constructor_environment() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_source(&dir, "id x = x\n");

    let output = Command::new(hscc_bin())
        .args(["dump-kinds", file.to_str().unwrap()])
        .output()
        .expect("failed to run hscc dump-kinds");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Bool"), "expected Bool's kind in stdout, got: {stdout}");
}

#[test]
fn dump_ast_prints_the_syntax_tree() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_source(&dir, "id x = x\n");

    let output = Command::new(hscc_bin())
        .args(["dump-ast", file.to_str().unwrap()])
        .output()
        .expect("failed to run hscc dump-ast");

    assert!(output.status.success());
    assert!(!String::from_utf8_lossy(&output.stdout).is_empty());
}
