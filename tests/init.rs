//! Tests the init command and the argument-error surface.

use std::error::Error;

use assert_cmd::Command;
use assert_fs::TempDir;
use assert_fs::prelude::*;
use predicates::prelude::*;

fn gitlet(dir: &TempDir, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("gitlet").unwrap();
    cmd.current_dir(dir).args(args);
    cmd
}

#[test]
fn init_creates_store_layout() -> Result<(), Box<dyn Error>> {
    let tmpdir = TempDir::new()?;

    gitlet(&tmpdir, &["init"]).assert().success();

    tmpdir.child(".gitlet").assert(predicate::path::is_dir());
    tmpdir
        .child(".gitlet/objects")
        .assert(predicate::path::is_dir());
    tmpdir
        .child(".gitlet/objects/commits")
        .assert(predicate::path::is_dir());
    tmpdir
        .child(".gitlet/refs")
        .assert(predicate::path::is_dir());
    tmpdir
        .child(".gitlet/refs/main")
        .assert(predicate::path::is_file());
    tmpdir
        .child(".gitlet/HEAD")
        .assert(predicate::path::is_file());

    Ok(())
}

#[test]
fn init_starts_from_the_initial_commit() -> Result<(), Box<dyn Error>> {
    let tmpdir = TempDir::new()?;

    gitlet(&tmpdir, &["init"]).assert().success();

    gitlet(&tmpdir, &["log"])
        .assert()
        .success()
        .stdout(predicate::str::contains("initial commit"));

    Ok(())
}

#[test]
fn init_refuses_an_existing_repository() -> Result<(), Box<dyn Error>> {
    let tmpdir = TempDir::new()?;

    gitlet(&tmpdir, &["init"]).assert().success();
    gitlet(&tmpdir, &["init"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "A Gitlet version-control system already exists in the current directory.",
        ));

    Ok(())
}

#[test]
fn commands_require_an_initialized_repository() -> Result<(), Box<dyn Error>> {
    let tmpdir = TempDir::new()?;

    gitlet(&tmpdir, &["status"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Not in an initialized Gitlet directory.",
        ));

    Ok(())
}

#[test]
fn no_arguments_asks_for_a_command() -> Result<(), Box<dyn Error>> {
    let tmpdir = TempDir::new()?;

    gitlet(&tmpdir, &[])
        .assert()
        .success()
        .stdout(predicate::str::contains("Please enter a command."));

    Ok(())
}

#[test]
fn unknown_command_is_reported() -> Result<(), Box<dyn Error>> {
    let tmpdir = TempDir::new()?;

    gitlet(&tmpdir, &["frobnicate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No command with that name exists."));

    Ok(())
}

#[test]
fn wrong_operand_count_is_reported() -> Result<(), Box<dyn Error>> {
    let tmpdir = TempDir::new()?;

    gitlet(&tmpdir, &["init"]).assert().success();

    gitlet(&tmpdir, &["add"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Incorrect operands."));

    gitlet(&tmpdir, &["log", "extra"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Incorrect operands."));

    Ok(())
}
