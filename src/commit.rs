//! The commit object: a snapshot mapping flat filenames to blob hashes,
//! plus a message, a timestamp, and parent link(s). A commit's id is the
//! sha1 of its serialized bytes, so logically equal commits hash
//! identically within a process. This module also holds the commit half of
//! the object store and the DAG queries: the first-parent history walk,
//! ancestor collection, and the lowest-common-ancestor split point.

use std::collections::{BTreeMap, HashSet, VecDeque};
use std::fmt::Display;
use std::fs;

use anyhow::{Context, Result};
use chrono::{Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::blob;
use crate::error::GitletError;
use crate::repo::Repository;

/// Parent links of a commit. The serde tag keeps a merge commit's
/// serialized form disjoint from a plain commit's, so their hashes can
/// never collide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Parentage {
    Initial,
    Single { parent: String },
    Merge { parent: String, second_parent: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commit {
    pub message: String,
    pub timestamp: i64,
    pub parents: Parentage,
    pub blobs: BTreeMap<String, String>,
}

impl Commit {
    pub fn new(message: String, parents: Parentage, blobs: BTreeMap<String, String>) -> Self {
        Commit {
            message,
            timestamp: Utc::now().timestamp(),
            parents,
            blobs,
        }
    }

    /// The parentless, empty commit every fresh repository starts from.
    pub fn initial() -> Self {
        Self::new("initial commit".to_string(), Parentage::Initial, BTreeMap::new())
    }

    pub fn first_parent(&self) -> Option<&str> {
        match &self.parents {
            Parentage::Initial => None,
            Parentage::Single { parent } | Parentage::Merge { parent, .. } => Some(parent),
        }
    }

    pub fn parent_hashes(&self) -> Vec<&str> {
        match &self.parents {
            Parentage::Initial => Vec::new(),
            Parentage::Single { parent } => vec![parent.as_str()],
            Parentage::Merge {
                parent,
                second_parent,
            } => vec![parent.as_str(), second_parent.as_str()],
        }
    }

    pub fn is_merge(&self) -> bool {
        matches!(self.parents, Parentage::Merge { .. })
    }

    /// Returns true if the commit tracks the given file.
    pub fn tracks(&self, filename: &str) -> bool {
        self.blobs.contains_key(filename)
    }

    pub fn blob_hash(&self, filename: &str) -> Option<&str> {
        self.blobs.get(filename).map(String::as_str)
    }

    /// Serializes the commit deterministically: struct fields in
    /// declaration order, the blob map in key order.
    fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).context("Serialize commit")
    }

    /// Writes the commit object to the store, returning its hash. The
    /// object file's content is exactly the hashed bytes.
    pub fn save(&self, repo: &Repository) -> Result<String> {
        let bytes = self.to_bytes()?;
        let hash = blob::hash_bytes(&bytes);

        let commit_path = repo.commits_dir().join(&hash);
        if !commit_path.exists() {
            fs::write(&commit_path, &bytes)
                .with_context(|| format!("Write commit object {hash}"))?;
        }

        Ok(hash)
    }

    /// Loads the commit object with the given identifying sha1 hash.
    pub fn load(repo: &Repository, hash: &str) -> Result<Self> {
        let commit_path = repo.commits_dir().join(hash);
        let bytes =
            fs::read(&commit_path).with_context(|| format!("Read commit object {hash}"))?;
        serde_json::from_slice(&bytes).with_context(|| format!("Deserialize commit {hash}"))
    }
}

/// Returns the hashes of every stored commit in directory-listing order.
pub fn list_hashes(repo: &Repository) -> Result<Vec<String>> {
    let mut hashes = Vec::new();
    for entry in fs::read_dir(repo.commits_dir()).context("Read commits directory")? {
        let entry = entry.context("Read commits directory entry")?;
        if entry.file_type().is_ok_and(|t| t.is_file())
            && let Some(name) = entry.file_name().to_str()
        {
            hashes.push(name.to_string());
        }
    }
    Ok(hashes)
}

/// Resolves an abbreviated commit id. Matching is by substring containment
/// over a sorted candidate list, so any unambiguous fragment of a hash
/// works, not just a prefix.
pub fn resolve_id(repo: &Repository, id: &str) -> Result<String> {
    if !id.is_empty() {
        let mut hashes = list_hashes(repo)?;
        hashes.sort_unstable();
        if let Some(hash) = hashes.into_iter().find(|h| h.contains(id)) {
            return Ok(hash);
        }
    }
    Err(GitletError::NoSuchCommit.into())
}

/// Every ancestor of `start`, itself included, following both parents of
/// merge commits.
pub fn ancestors(repo: &Repository, start: &str) -> Result<HashSet<String>> {
    let mut seen = HashSet::new();
    let mut queue = VecDeque::from([start.to_string()]);

    while let Some(hash) = queue.pop_front() {
        if !seen.insert(hash.clone()) {
            continue;
        }
        let commit = Commit::load(repo, &hash)?;
        for parent in commit.parent_hashes() {
            queue.push_back(parent.to_string());
        }
    }

    Ok(seen)
}

/// The split point of two commits: breadth-first from `b`, the first
/// commit that is also an ancestor of `a`. The initial commit is a
/// universal ancestor, so this always resolves within one repository.
pub fn lca(repo: &Repository, a: &str, b: &str) -> Result<String> {
    let reachable = ancestors(repo, a)?;

    let mut seen = HashSet::from([b.to_string()]);
    let mut queue = VecDeque::from([b.to_string()]);
    while let Some(hash) = queue.pop_front() {
        if reachable.contains(&hash) {
            return Ok(hash);
        }
        let commit = Commit::load(repo, &hash)?;
        for parent in commit.parent_hashes() {
            if seen.insert(parent.to_string()) {
                queue.push_back(parent.to_string());
            }
        }
    }

    anyhow::bail!("commits {a} and {b} share no ancestor")
}

/// First-parent walk from a starting commit, for the log command.
pub struct History<'a> {
    repo: &'a Repository,
    next_hash: Option<String>,
}

impl<'a> History<'a> {
    pub fn new(repo: &'a Repository, start: String) -> Self {
        History {
            repo,
            next_hash: Some(start),
        }
    }
}

impl Iterator for History<'_> {
    type Item = Result<(String, Commit)>;

    fn next(&mut self) -> Option<Self::Item> {
        let hash = self.next_hash.take()?;
        match Commit::load(self.repo, &hash) {
            Ok(commit) => {
                self.next_hash = commit.first_parent().map(str::to_string);
                Some(Ok((hash, commit)))
            }
            Err(err) => Some(Err(err)),
        }
    }
}

/// A commit paired with its hash, formatted for `log` and `global-log`:
///
/// ===
/// commit [sha1 hash]
/// Merge: [abbreviated parents, merge commits only]
/// Date: [local time]
/// [commit message]
pub struct LogEntry<'a> {
    pub hash: &'a str,
    pub commit: &'a Commit,
}

impl Display for LogEntry<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "===")?;
        writeln!(f, "commit {}", self.hash)?;

        if let Parentage::Merge {
            parent,
            second_parent,
        } = &self.commit.parents
        {
            writeln!(f, "Merge: {} {}", &parent[..7], &second_parent[..7])?;
        }

        // Converting a unix instant to the local zone is never ambiguous.
        let date = Local.timestamp_opt(self.commit.timestamp, 0).unwrap();
        writeln!(f, "Date: {}", date.format("%a %b %-d %H:%M:%S %Y %z"))?;

        if self.commit.is_merge() {
            writeln!(f, "{} ", self.commit.message)
        } else {
            writeln!(f, "{}", self.commit.message)
        }
    }
}
