//! CLI end-to-end tests

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn rx() -> Command {
    Command::new(assert_cmd::cargo_bin!("rx-playground"))
}

#[test]
fn test_help() {
    rx().arg("--help").assert().success();
}

#[test]
fn test_version() {
    rx()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("rx-playground"));
}

#[test]
fn test_no_command_prints_usage() {
    rx()
        .assert()
        .success()
        .stderr(predicate::str::contains("Usage: rx-playground <COMMAND>"));
}

#[test]
fn test_find_matches() {
    rx()
        .args(["eval", r"\d+", "hello 123 world"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"kind\": \"find\""))
        .stdout(predicate::str::contains("\"text\": \"123\""))
        .stdout(predicate::str::contains("\"start\": 6"));
}

#[test]
fn test_find_no_matches() {
    rx()
        .args(["eval", r"\d+", "hello world"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"value\": []"));
}

#[test]
fn test_capture_groups() {
    rx()
        .args(["eval", r"(\d{3})-(?P<line>\d{4})", "123-4567"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"group\": 1"))
        .stdout(predicate::str::contains("\"name\": \"line\""));
}

#[test]
fn test_replace() {
    rx()
        .args(["eval", r"(\w+)@(\w+)", "me@home", "--mode", "replace", "-r", "$2 at $1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"kind\": \"replace\""))
        .stdout(predicate::str::contains("\"value\": \"home at me\""));
}

#[test]
fn test_replace_without_template_returns_text() {
    rx()
        .args(["eval", "a", "banana", "--mode", "replace"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"value\": \"banana\""));
}

#[test]
fn test_replacement_error() {
    rx()
        .args(["eval", "(a)", "banana", "--mode", "replace", "-r", "$2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"kind\": \"replacement_error\""))
        .stdout(predicate::str::contains("group_out_of_range"));
}

#[test]
fn test_syntax_tree() {
    rx()
        .args(["eval", "(?P<year>\\d{4})", "--mode", "syntax"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"kind\": \"syntax\""))
        .stdout(predicate::str::contains("named_group"));
}

#[test]
fn test_pattern_error_is_a_result() {
    rx()
        .args(["eval", "(", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"kind\": \"pattern_error\""))
        .stdout(predicate::str::contains("regex parse error"));
}

#[test]
fn test_fancy_backreference() {
    rx()
        .args(["eval", r"(\w)\1", "hello"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"text\": \"ll\""));
}

#[test]
fn test_forced_engine_rejects_lookahead() {
    rx()
        .args(["eval", "a(?=b)", "ab", "--engine", "regex"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"kind\": \"pattern_error\""));
}

#[test]
fn test_unknown_engine_fails() {
    rx()
        .args(["eval", "a", "a", "--engine", "pcre"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("COMMAND_ERROR"))
        .stderr(predicate::str::contains("Unknown engine"));
}

#[test]
fn test_text_format() {
    rx()
        .args(["-f", "text", "eval", "a+", "baaab"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Match 1: \"aaa\" [1..4]"))
        .stdout(predicate::str::contains("1 match found"));
}

#[test]
fn test_text_format_pattern_error() {
    rx()
        .args(["-f", "text", "eval", "(", "x"])
        .assert()
        .success()
        .stdout(predicate::str::contains("regex parse error:"));
}

#[test]
fn test_stdin_input() {
    rx()
        .args(["eval", r"\d+"])
        .write_stdin("order 42 shipped")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"text\": \"42\""));
}

#[test]
fn test_file_input() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("input.txt");
    fs::write(&path, "alpha beta\ngamma").unwrap();

    rx()
        .args(["eval", r"\b\w+\b", "--file"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"text\": \"gamma\""));
}

#[test]
fn test_missing_file_fails() {
    rx()
        .args(["eval", "a", "--file", "/nonexistent/input.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read file"));
}

#[test]
fn test_session_frames() {
    rx()
        .arg("session")
        .write_stdin("{\"pattern\": \"a+\", \"text\": \"baaab\"}\n{\"scroll\": 3}\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"recomputed\":true"))
        .stdout(predicate::str::contains("\"recomputed\":false"))
        .stdout(predicate::str::contains("\"text\":\"aaa\""));
}

#[test]
fn test_session_rejects_bad_line() {
    rx()
        .arg("session")
        .write_stdin("not json\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("INVALID_INPUT"));
}

#[test]
fn test_docs_latest() {
    rx()
        .args(["docs", "regex-syntax"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "https://docs.rs/regex-syntax/latest/regex_syntax/",
        ));
}

#[test]
fn test_docs_versioned_text() {
    rx()
        .args(["-f", "text", "docs", "regex", "1.10.2"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "regex: https://docs.rs/regex/1.10.2/regex/",
        ));
}
