use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

fn eep() -> Command {
    Command::cargo_bin("eep").expect("binary exists")
}

#[test]
fn eval_prints_the_value() {
    eep()
        .arg("eval")
        .arg("2*(10-1)")
        .assert()
        .success()
        .stdout("18\n");
}

#[test]
fn eval_uses_variable_bindings_and_prelude() {
    eep()
        .args(["--var", "x=3", "--var", "name=eep", "eval", "upper(name) + str(max(x, 4))"])
        .assert()
        .success()
        .stdout("EEP4\n");
}

#[test]
fn bare_mode_omits_the_prelude() {
    eep()
        .args(["eval", "max(1, 2)", "--bare"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("illegal function type"));
}

#[test]
fn eval_reports_syntax_errors() {
    eep()
        .args(["eval", "(1 + 2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("syntax error"));
}

#[test]
fn malformed_binding_is_rejected() {
    eep()
        .args(["--var", "novalue", "eval", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("NAME=VALUE"));
}

#[test]
fn run_evaluates_an_expression_file() {
    let dir = tempdir().expect("create temp dir");
    let path = dir.path().join("check.eep");
    fs::write(&path, "flag and \"on\" or \"off\"\n").expect("write expression");

    eep()
        .args(["--var", "flag=true", "run"])
        .arg(&path)
        .assert()
        .success()
        .stdout("on\n");
}

#[test]
fn run_reports_missing_files() {
    let dir = tempdir().expect("create temp dir");
    eep()
        .arg("run")
        .arg(dir.path().join("absent.eep"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("I/O error"));
}

#[test]
fn tokens_lists_the_scanned_stream() {
    eep()
        .args(["tokens", "a >= 1"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Identifier `a`")
                .and(predicate::str::contains("GreaterEqual `>=`"))
                .and(predicate::str::contains("Eof")),
        );
}
