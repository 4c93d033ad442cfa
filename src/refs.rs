//! Branch pointers and HEAD. A branch is a file under `.gitlet/refs/`
//! whose contents are a commit hash; HEAD holds the name of the active
//! branch. There is no detached-HEAD state.

use std::fs;

use anyhow::{Context, Result};

use crate::error::GitletError;
use crate::repo::Repository;

pub fn branch_exists(repo: &Repository, name: &str) -> bool {
    repo.refs_dir().join(name).is_file()
}

/// Creates a new branch pointing at the given commit.
pub fn create_branch(repo: &Repository, name: &str, hash: &str) -> Result<()> {
    if branch_exists(repo, name) {
        return Err(GitletError::BranchExists.into());
    }
    set_branch(repo, name, hash)
}

/// Points an existing branch (or a brand-new one) at the given commit.
pub fn set_branch(repo: &Repository, name: &str, hash: &str) -> Result<()> {
    fs::write(repo.refs_dir().join(name), hash)
        .with_context(|| format!("Write branch pointer '{name}'"))
}

pub fn read_branch(repo: &Repository, name: &str) -> Result<String> {
    fs::read_to_string(repo.refs_dir().join(name))
        .with_context(|| format!("Read branch pointer '{name}'"))
}

pub fn delete_branch(repo: &Repository, name: &str) -> Result<()> {
    fs::remove_file(repo.refs_dir().join(name))
        .with_context(|| format!("Delete branch pointer '{name}'"))
}

/// All branch names, sorted.
pub fn list_branches(repo: &Repository) -> Result<Vec<String>> {
    let mut names: Vec<String> = fs::read_dir(repo.refs_dir())
        .context("Read refs directory")?
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_ok_and(|t| t.is_file()))
        .filter_map(|e| e.file_name().to_str().map(str::to_string))
        .collect();
    names.sort_unstable();
    Ok(names)
}

/// The name of the branch HEAD points at.
pub fn read_head(repo: &Repository) -> Result<String> {
    fs::read_to_string(repo.head_file()).context("Read branch name from HEAD")
}

pub fn set_head(repo: &Repository, branch: &str) -> Result<()> {
    fs::write(repo.head_file(), branch).context("Write branch name to HEAD")
}
