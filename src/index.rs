//! The staging area: filenames staged for addition mapped to their blob
//! hashes, and filenames staged for removal mapped to the hash tracked at
//! removal time. The two maps are disjoint by construction, and iteration
//! is lexicographic, so everything downstream of the index is
//! deterministic.

use std::collections::BTreeMap;
use std::fs;
use std::io;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::repo::Repository;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Index {
    pub additions: BTreeMap<String, String>,
    pub removals: BTreeMap<String, String>,
}

impl Index {
    /// Loads the staging area, or an empty one when nothing is staged. The
    /// index file only appears on the first save.
    pub fn load(repo: &Repository) -> Result<Self> {
        let index_file = repo.index_file();
        if !index_file.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&index_file).context("Read .gitlet/index")?;
        serde_json::from_str(&content).context("Deserialize .gitlet/index")
    }

    /// Saves the staging area to the index file.
    pub fn save(&self, repo: &Repository) -> Result<()> {
        let f = fs::File::create(repo.index_file()).context("Create .gitlet/index")?;
        serde_json::to_writer(f, self).context("Save staging area to .gitlet/index")
    }

    /// Empties the staging area, dropping the index file.
    pub fn clear(repo: &Repository) -> Result<()> {
        match fs::remove_file(repo.index_file()) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).context("Delete .gitlet/index"),
        }
    }

    pub fn is_clear(&self) -> bool {
        self.additions.is_empty() && self.removals.is_empty()
    }

    /// Applies the staged delta to a head snapshot, producing the blob map
    /// of the next commit: removals drop entries, additions overwrite.
    pub fn apply_to(&self, mut blobs: BTreeMap<String, String>) -> BTreeMap<String, String> {
        for removed in self.removals.keys() {
            blobs.remove(removed);
        }
        for (filename, hash) in &self.additions {
            blobs.insert(filename.clone(), hash.clone());
        }
        blobs
    }
}
