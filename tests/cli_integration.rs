//! CLI integration tests for procrastinate
//!
//! Each test runs the binary against its own temporary home directory, so
//! config and task files never leak between tests.

use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Get a command instance for the procrastinate binary, rooted at `home`
fn cmd(home: &TempDir) -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("procrastinate"));
    cmd.env_remove("PROCRASTINATE_HOME")
        .env_remove("RUST_LOG")
        .arg("--home")
        .arg(home.path());
    cmd
}

fn run(home: &TempDir, input: &str) -> assert_cmd::assert::Assert {
    cmd(home).args(input.split(' ')).assert()
}

fn task_file(home: &TempDir) -> String {
    fs::read_to_string(home.path().join("tasks.jsonl")).unwrap_or_default()
}

// =============================================================================
// One-shot commands
// =============================================================================

#[test]
fn test_add_dream() {
    let home = TempDir::new().unwrap();

    run(&home, "add write a novel")
        .success()
        .stdout(predicate::str::contains("Added dream: write a novel"))
        .stdout(predicate::str::contains("1. [ ] write a novel"));

    assert!(task_file(&home).contains("\"description\":\"write a novel\""));
}

#[test]
fn test_free_text_becomes_task() {
    let home = TempDir::new().unwrap();

    run(&home, "water the plants")
        .success()
        .stdout(predicate::str::contains("Added dream: water the plants"));
}

#[test]
fn test_add_deadline_with_absolute_date() {
    let home = TempDir::new().unwrap();

    run(&home, "add file taxes due 2030-04-15 17:00")
        .success()
        .stdout(predicate::str::contains("Added deadline: file taxes"))
        .stdout(predicate::str::contains("(due Mon 15 Apr 17:00)"));
}

#[test]
fn test_add_event() {
    let home = TempDir::new().unwrap();

    run(&home, "add conference from 2030-05-01 09:00 to 2030-05-03 18:00")
        .success()
        .stdout(predicate::str::contains("Added event: conference"));

    let content = task_file(&home);
    assert!(content.contains("\"type\":\"event\""));
    assert!(content.contains("\"start\":\"2030-05-01T09:00:00\""));
}

#[test]
fn test_tasks_persist_between_runs() {
    let home = TempDir::new().unwrap();

    run(&home, "add later due 2030-02-01 12:00").success();
    run(&home, "add sooner due 2030-01-01 12:00").success();
    run(&home, "add someday").success();

    run(&home, "show")
        .success()
        .stdout(predicate::str::contains("1. [ ] sooner"))
        .stdout(predicate::str::contains("2. [ ] later"))
        .stdout(predicate::str::contains("3. [ ] someday"));
}

#[test]
fn test_done_and_show_done() {
    let home = TempDir::new().unwrap();

    run(&home, "add chore").success();
    run(&home, "done 1")
        .success()
        .stdout(predicate::str::contains("Done dream: chore"));

    run(&home, "show")
        .success()
        .stdout(predicate::str::contains("(no tasks)"));
    run(&home, "show done")
        .success()
        .stdout(predicate::str::contains("1. [x] chore"));
}

#[test]
fn test_delete() {
    let home = TempDir::new().unwrap();

    run(&home, "add keep").success();
    run(&home, "add remove me").success();

    run(&home, "delete 2")
        .success()
        .stdout(predicate::str::contains("Deleted dream: remove me"));

    let content = task_file(&home);
    assert!(content.contains("keep"));
    assert!(!content.contains("remove me"));
}

#[test]
fn test_edit_partial_prints_command() {
    let home = TempDir::new().unwrap();

    run(&home, "add report due 2030-03-01 09:00").success();
    run(&home, "edit 1")
        .success()
        .stdout(predicate::str::contains("edit 1 report due 2030-03-01 09:00"));
}

#[test]
fn test_invalid_messages() {
    let home = TempDir::new().unwrap();

    run(&home, "add")
        .success()
        .stdout(predicate::str::contains("Please specify the description"));
    run(&home, "delete")
        .success()
        .stdout(predicate::str::contains("Please specify a valid line number"));
    run(&home, "delete 3")
        .success()
        .stdout(predicate::str::contains("Invalid line number"));
}

#[test]
fn test_search() {
    let home = TempDir::new().unwrap();

    run(&home, "add buy milk").success();
    run(&home, "add walk dog").success();

    run(&home, "search MILK")
        .success()
        .stdout(predicate::str::contains("Found 1 task(s)"))
        .stdout(predicate::str::contains("buy milk"))
        .stdout(predicate::str::contains("walk dog").not());
}

#[test]
fn test_help() {
    let home = TempDir::new().unwrap();

    run(&home, "help")
        .success()
        .stdout(predicate::str::contains("delete|del <n>"));
}

// =============================================================================
// Interactive mode
// =============================================================================

#[test]
fn test_interactive_session_with_undo() {
    let home = TempDir::new().unwrap();

    cmd(&home)
        .write_stdin("add first\nadd second\nundo\nshow all\nexit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Undid last operation"))
        .stdout(predicate::str::contains("Goodbye!"));

    let content = task_file(&home);
    assert!(content.contains("first"));
    assert!(!content.contains("second"));
}

#[test]
fn test_interactive_stops_at_end_of_input() {
    let home = TempDir::new().unwrap();

    cmd(&home)
        .write_stdin("add only task\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Added dream: only task"));
}

#[test]
fn test_line_numbers_follow_search_view() {
    let home = TempDir::new().unwrap();

    cmd(&home)
        .write_stdin("add apples\nadd bananas\nsearch bananas\ndone 1\nexit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Done dream: bananas"));
}

// =============================================================================
// Output formats
// =============================================================================

#[test]
fn test_json_output() {
    let home = TempDir::new().unwrap();

    run(&home, "add nap").success();

    let output = cmd(&home).args(["-f", "json", "show", "all"]).output().unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["message"], "All tasks");
    assert_eq!(value["listing"]["view"]["view"], "all");
    assert_eq!(value["listing"]["tasks"][0]["line"], 1);
    assert_eq!(value["listing"]["tasks"][0]["description"], "nap");
    assert_eq!(value["listing"]["tasks"][0]["type"], "dream");
}

#[test]
fn test_default_format_from_config() {
    let home = TempDir::new().unwrap();
    fs::write(home.path().join("config.toml"), "default_format = \"json\"\n").unwrap();

    let output = cmd(&home).args(["add", "nap"]).output().unwrap();
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["message"], "Added dream: nap");
}

// =============================================================================
// Configuration and storage location
// =============================================================================

#[test]
fn test_set_path_moves_tasks() {
    let home = TempDir::new().unwrap();
    let target = home.path().join("synced");

    run(&home, "add portable task").success();

    cmd(&home)
        .arg("set")
        .arg(target.to_str().unwrap())
        .arg("todo.jsonl")
        .assert()
        .success()
        .stdout(predicate::str::contains("Save location set to"));

    assert!(target.join("todo.jsonl").exists());
    assert!(!home.path().join("tasks.jsonl").exists());

    // The new location is remembered
    run(&home, "show")
        .success()
        .stdout(predicate::str::contains("portable task"));
}

#[test]
fn test_malformed_config_fails() {
    let home = TempDir::new().unwrap();
    fs::write(home.path().join("config.toml"), "save_filename = [").unwrap();

    run(&home, "show")
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_corrupt_task_file_fails() {
    let home = TempDir::new().unwrap();
    fs::write(home.path().join("tasks.jsonl"), "not json\n").unwrap();

    run(&home, "show")
        .failure()
        .stderr(predicate::str::contains("line 1"));
}

#[test]
fn test_home_from_environment() {
    let home = TempDir::new().unwrap();

    assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("procrastinate"))
        .env("PROCRASTINATE_HOME", home.path())
        .args(["add", "from", "env"])
        .assert()
        .success();

    assert!(task_file(&home).contains("from env"));
}
