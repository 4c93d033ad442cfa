//! Tests the switch command.

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
fn switch_requires_an_existing_branch() -> Result<(), Box<dyn Error>> {
    let tmpdir = TempDir::new()?;
    gitlet(&tmpdir, &["init"]).assert().success();

    gitlet(&tmpdir, &["switch", "dev"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No such branch exists."));

    Ok(())
}

#[test]
fn switch_to_the_current_branch_is_pointless() -> Result<(), Box<dyn Error>> {
    let tmpdir = TempDir::new()?;
    gitlet(&tmpdir, &["init"]).assert().success();

    gitlet(&tmpdir, &["switch", "main"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "No need to switch to the current branch.",
        ));

    Ok(())
}

#[test]
fn switch_restores_the_branch_snapshot() -> Result<(), Box<dyn Error>> {
    let tmpdir = TempDir::new()?;
    gitlet(&tmpdir, &["init"]).assert().success();
    tmpdir.child("a.txt").write_str("hello\n")?;
    gitlet(&tmpdir, &["add", "a.txt"]).assert().success();
    gitlet(&tmpdir, &["commit", "add a"]).assert().success();

    gitlet(&tmpdir, &["branch", "dev"]).assert().success();
    tmpdir.child("a.txt").write_str("hello2\n")?;
    gitlet(&tmpdir, &["add", "a.txt"]).assert().success();
    gitlet(&tmpdir, &["commit", "edit on main"]).assert().success();

    gitlet(&tmpdir, &["switch", "dev"]).assert().success();

    tmpdir.child("a.txt").assert("hello\n");
    gitlet(&tmpdir, &["status"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("*dev")
                .and(predicate::str::contains("=== Staged Files ===\n\n")),
        );

    Ok(())
}

#[test]
fn switch_drops_files_the_target_does_not_track() -> Result<(), Box<dyn Error>> {
    let tmpdir = TempDir::new()?;
    gitlet(&tmpdir, &["init"]).assert().success();
    gitlet(&tmpdir, &["branch", "dev"]).assert().success();

    tmpdir.child("a.txt").write_str("hello\n")?;
    gitlet(&tmpdir, &["add", "a.txt"]).assert().success();
    gitlet(&tmpdir, &["commit", "add a"]).assert().success();

    // dev still points at the initial commit, which tracks nothing.
    gitlet(&tmpdir, &["switch", "dev"]).assert().success();
    tmpdir.child("a.txt").assert(predicate::path::missing());

    Ok(())
}

#[test]
fn switch_refuses_to_overwrite_untracked_files() -> Result<(), Box<dyn Error>> {
    let tmpdir = TempDir::new()?;
    gitlet(&tmpdir, &["init"]).assert().success();
    gitlet(&tmpdir, &["branch", "dev"]).assert().success();

    tmpdir.child("a.txt").write_str("hello\n")?;
    gitlet(&tmpdir, &["add", "a.txt"]).assert().success();
    gitlet(&tmpdir, &["commit", "add a"]).assert().success();

    gitlet(&tmpdir, &["switch", "dev"]).assert().success();

    // Untracked a.txt on dev stands in the way of switching back.
    tmpdir.child("a.txt").write_str("scratch work\n")?;
    gitlet(&tmpdir, &["switch", "main"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "There is an untracked file in the way; delete it, or add and commit it first.",
        ));

    // Nothing was touched.
    tmpdir.child("a.txt").assert("scratch work\n");
    gitlet(&tmpdir, &["status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("*dev"));

    Ok(())
}
