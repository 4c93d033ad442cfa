//! The repository: locating it on disk, and the operations the command
//! surface dispatches onto it — staging, committing, history, branch
//! management, the working-directory reconciler, and the three-way merge
//! engine.

use std::collections::BTreeSet;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use log::debug;
use walkdir::WalkDir;

use crate::blob;
use crate::commit::{self, Commit, History, LogEntry, Parentage};
use crate::error::GitletError;
use crate::index::Index;
use crate::refs;

const GITLET_DIR: &str = ".gitlet";
const DEFAULT_BRANCH: &str = "main";

/// Handle on an initialized repository: the working-tree root and the
/// `.gitlet` directory inside it. Established once per command and passed
/// down explicitly.
#[derive(Debug)]
pub struct Repository {
    work_dir: PathBuf,
    gitlet_dir: PathBuf,
}

impl Repository {
    /// Creates a new repository in the current directory: the store
    /// layout, the initial commit, branch `main`, and HEAD.
    pub fn init() -> Result<Self> {
        let work_dir = std::env::current_dir().context("Get current working directory")?;
        let gitlet_dir = work_dir.join(GITLET_DIR);
        if gitlet_dir.exists() {
            return Err(GitletError::AlreadyInitialized.into());
        }

        let repo = Repository {
            work_dir,
            gitlet_dir,
        };
        fs::create_dir(&repo.gitlet_dir).context("Create '.gitlet/'")?;
        fs::create_dir(repo.objects_dir()).context("Create '.gitlet/objects/'")?;
        fs::create_dir(repo.commits_dir()).context("Create '.gitlet/objects/commits/'")?;
        fs::create_dir(repo.refs_dir()).context("Create '.gitlet/refs/'")?;

        let hash = Commit::initial().save(&repo)?;
        refs::create_branch(&repo, DEFAULT_BRANCH, &hash)?;
        refs::set_head(&repo, DEFAULT_BRANCH)?;

        Ok(repo)
    }

    /// Locates an existing repository by walking up from the current
    /// directory to the nearest `.gitlet`.
    pub fn discover() -> Result<Self> {
        let start = std::env::current_dir().context("Get current working directory")?;
        let mut dir = start.as_path();
        loop {
            let candidate = dir.join(GITLET_DIR);
            if candidate.is_dir() {
                return Ok(Repository {
                    work_dir: dir.to_path_buf(),
                    gitlet_dir: candidate,
                });
            }
            match dir.parent() {
                Some(parent) => dir = parent,
                None => return Err(GitletError::NotInitialized.into()),
            }
        }
    }

    pub(crate) fn objects_dir(&self) -> PathBuf {
        self.gitlet_dir.join("objects")
    }

    pub(crate) fn commits_dir(&self) -> PathBuf {
        self.objects_dir().join("commits")
    }

    pub(crate) fn refs_dir(&self) -> PathBuf {
        self.gitlet_dir.join("refs")
    }

    pub(crate) fn head_file(&self) -> PathBuf {
        self.gitlet_dir.join("HEAD")
    }

    pub(crate) fn index_file(&self) -> PathBuf {
        self.gitlet_dir.join("index")
    }

    /// The working-tree path of a tracked filename.
    fn work_path(&self, filename: &str) -> PathBuf {
        self.work_dir.join(filename)
    }

    /// The commit at the tip of the current branch.
    fn head_commit(&self) -> Result<(String, Commit)> {
        let branch = refs::read_head(self)?;
        let hash = refs::read_branch(self, &branch)?;
        let commit = Commit::load(self, &hash)?;
        Ok((hash, commit))
    }

    /// Non-hidden files at the working-tree root. Tracked filenames are
    /// flat, so the walk does not descend into subdirectories.
    fn working_files(&self) -> Result<BTreeSet<String>> {
        let mut files = BTreeSet::new();
        for entry in WalkDir::new(&self.work_dir).min_depth(1).max_depth(1) {
            let entry = entry.context("List working tree")?;
            if entry.file_type().is_file()
                && let Some(name) = entry.file_name().to_str()
                && !name.starts_with('.')
            {
                files.insert(name.to_string());
            }
        }
        Ok(files)
    }

    /// Stages a file for addition. Staging a file that is staged for
    /// removal just cancels the removal; re-staging the content the head
    /// commit already tracks cancels any pending addition.
    pub fn add(&self, filename: &str) -> Result<()> {
        let mut index = Index::load(self)?;
        if index.removals.remove(filename).is_some() {
            return index.save(self);
        }

        let path = self.work_path(filename);
        if !path.is_file() {
            return Err(GitletError::FileDoesNotExist.into());
        }
        let bytes = fs::read(&path).with_context(|| format!("Read '{filename}'"))?;
        let hash = blob::put(self, &bytes)?;

        let (_, head) = self.head_commit()?;
        if head.blob_hash(filename) == Some(hash.as_str()) {
            index.additions.remove(filename);
        } else {
            debug!("staged {filename} at {hash}");
            index.additions.insert(filename.to_string(), hash);
        }
        index.save(self)
    }

    /// Unstages the file if it is staged for addition; if the head commit
    /// tracks it, also deletes the working copy and stages the removal.
    pub fn rm(&self, filename: &str) -> Result<()> {
        let mut index = Index::load(self)?;
        let (_, head) = self.head_commit()?;

        let staged = index.additions.contains_key(filename);
        let tracked = head.blob_hash(filename);
        if !staged && (tracked.is_none() || index.removals.contains_key(filename)) {
            return Err(GitletError::NoReasonToRemove.into());
        }

        index.additions.remove(filename);
        if let Some(hash) = tracked {
            let path = self.work_path(filename);
            if path.is_file() {
                fs::remove_file(&path).with_context(|| format!("Delete '{filename}'"))?;
            }
            index.removals.insert(filename.to_string(), hash.to_string());
        }
        index.save(self)
    }

    /// Commits the staged changes: the head snapshot with additions
    /// applied and removals dropped.
    pub fn commit(&self, message: &str) -> Result<()> {
        if message.trim().is_empty() {
            return Err(GitletError::EmptyMessage.into());
        }
        let index = Index::load(self)?;
        if index.is_clear() {
            return Err(GitletError::NoChangesAdded.into());
        }

        let branch = refs::read_head(self)?;
        let parent_hash = refs::read_branch(self, &branch)?;
        let parent = Commit::load(self, &parent_hash)?;

        let new_commit = Commit::new(
            message.to_string(),
            Parentage::Single {
                parent: parent_hash,
            },
            index.apply_to(parent.blobs),
        );
        let hash = new_commit.save(self)?;
        debug!("commit {hash} on {branch}");

        Index::clear(self)?;
        refs::set_branch(self, &branch, &hash)
    }

    /// Prints the first-parent history of the current branch.
    pub fn log(&self) -> Result<()> {
        let (head_hash, _) = self.head_commit()?;

        let stdout = io::stdout();
        let mut out = io::BufWriter::new(stdout.lock());
        for entry in History::new(self, head_hash) {
            let (hash, commit) = entry?;
            writeln!(
                out,
                "{}",
                LogEntry {
                    hash: &hash,
                    commit: &commit
                }
            )?;
        }
        out.flush()?;
        Ok(())
    }

    /// Prints every commit in the store, in directory-listing order.
    pub fn global_log(&self) -> Result<()> {
        let stdout = io::stdout();
        let mut out = io::BufWriter::new(stdout.lock());
        for hash in commit::list_hashes(self)? {
            let commit = Commit::load(self, &hash)?;
            writeln!(
                out,
                "{}",
                LogEntry {
                    hash: &hash,
                    commit: &commit
                }
            )?;
        }
        out.flush()?;
        Ok(())
    }

    /// Prints the hash of every commit whose message matches exactly.
    pub fn find(&self, message: &str) -> Result<()> {
        let mut found = false;
        for hash in commit::list_hashes(self)? {
            if Commit::load(self, &hash)?.message == message {
                println!("{hash}");
                found = true;
            }
        }
        if !found {
            return Err(GitletError::NoCommitWithMessage.into());
        }
        Ok(())
    }

    /// Prints branches, staged and removed files, unstaged modifications,
    /// and untracked files.
    pub fn status(&self) -> Result<()> {
        let stdout = io::stdout();
        let mut out = io::BufWriter::new(stdout.lock());

        let current = refs::read_head(self)?;
        writeln!(out, "=== Branches ===")?;
        for branch in refs::list_branches(self)? {
            if branch == current {
                writeln!(out, "*{branch}")?;
            } else {
                writeln!(out, "{branch}")?;
            }
        }
        writeln!(out)?;

        let index = Index::load(self)?;
        writeln!(out, "=== Staged Files ===")?;
        for filename in index.additions.keys() {
            writeln!(out, "{filename}")?;
        }
        writeln!(out)?;

        writeln!(out, "=== Removed Files ===")?;
        for filename in index.removals.keys() {
            writeln!(out, "{filename}")?;
        }
        writeln!(out)?;

        writeln!(out, "=== Modifications Not Staged For Commit ===")?;
        for entry in self.unstaged_modifications(&index)? {
            writeln!(out, "{entry}")?;
        }
        writeln!(out)?;

        writeln!(out, "=== Untracked Files ===")?;
        for filename in self.untracked_files(&index)? {
            writeln!(out, "{filename}")?;
        }
        writeln!(out)?;

        out.flush()?;
        Ok(())
    }

    /// Tracked or staged files whose working-tree state diverges from what
    /// the index or the head commit records, tagged `(modified)` or
    /// `(deleted)`, in lexicographic order.
    fn unstaged_modifications(&self, index: &Index) -> Result<Vec<String>> {
        let (_, head) = self.head_commit()?;
        let working = self.working_files()?;

        let mut filenames: BTreeSet<&String> = head.blobs.keys().collect();
        filenames.extend(index.additions.keys());

        let mut entries = Vec::new();
        for filename in filenames {
            if !working.contains(filename) {
                let staged = index.additions.contains_key(filename);
                let tracked_unremoved =
                    head.tracks(filename) && !index.removals.contains_key(filename);
                if staged || tracked_unremoved {
                    entries.push(format!("{filename} (deleted)"));
                }
                continue;
            }

            let current = blob::hash_bytes(
                &fs::read(self.work_path(filename)).with_context(|| format!("Read '{filename}'"))?,
            );
            let recorded = index
                .additions
                .get(filename)
                .or_else(|| head.blobs.get(filename));
            if recorded.is_some_and(|hash| *hash != current) {
                entries.push(format!("{filename} (modified)"));
            }
        }
        Ok(entries)
    }

    /// Working-tree files neither staged for addition nor tracked by the
    /// head commit, in lexicographic order.
    fn untracked_files(&self, index: &Index) -> Result<Vec<String>> {
        let (_, head) = self.head_commit()?;
        Ok(self
            .working_files()?
            .into_iter()
            .filter(|f| !head.tracks(f) && !index.additions.contains_key(f))
            .collect())
    }

    /// Restores a file from the head commit, or from the commit named by
    /// `commit_id` (any unambiguous fragment of a hash). Restoring does
    /// not stage.
    pub fn restore(&self, commit_id: Option<&str>, filename: &str) -> Result<()> {
        let source = match commit_id {
            Some(id) => {
                let hash = commit::resolve_id(self, id)?;
                Commit::load(self, &hash)?
            }
            None => self.head_commit()?.1,
        };

        let Some(hash) = source.blob_hash(filename) else {
            return Err(GitletError::FileNotInCommit.into());
        };
        blob::restore(self, hash, &self.work_path(filename))
    }

    /// Creates a branch pointing at the current head commit.
    pub fn branch(&self, name: &str) -> Result<()> {
        let (head_hash, _) = self.head_commit()?;
        refs::create_branch(self, name, &head_hash)
    }

    /// Checks out the named branch's head commit and makes the branch
    /// current.
    pub fn switch(&self, name: &str) -> Result<()> {
        if !refs::branch_exists(self, name) {
            return Err(GitletError::NoSuchBranchToSwitch.into());
        }
        if name == refs::read_head(self)? {
            return Err(GitletError::AlreadyOnBranch.into());
        }

        let (_, head) = self.head_commit()?;
        let target_hash = refs::read_branch(self, name)?;
        let target = Commit::load(self, &target_hash)?;
        self.reconcile(&head, &target)?;

        Index::clear(self)?;
        refs::set_head(self, name)
    }

    /// Deletes the named branch pointer; its commits stay in the store.
    pub fn rm_branch(&self, name: &str) -> Result<()> {
        if !refs::branch_exists(self, name) {
            return Err(GitletError::NoSuchBranch.into());
        }
        if name == refs::read_head(self)? {
            return Err(GitletError::CannotRemoveCurrentBranch.into());
        }
        refs::delete_branch(self, name)
    }

    /// Moves the current branch to the named commit and checks it out.
    pub fn reset(&self, commit_id: &str) -> Result<()> {
        let target_hash = commit::resolve_id(self, commit_id)?;
        let target = Commit::load(self, &target_hash)?;
        let (_, head) = self.head_commit()?;
        self.reconcile(&head, &target)?;

        Index::clear(self)?;
        let branch = refs::read_head(self)?;
        refs::set_branch(self, &branch, &target_hash)
    }

    /// Projects `new`'s snapshot onto the working directory: refuses to
    /// touch anything while an untracked file would be overwritten, then
    /// deletes files tracked by `old` but not `new`, then restores every
    /// file `new` tracks.
    fn reconcile(&self, old: &Commit, new: &Commit) -> Result<()> {
        for filename in self.working_files()? {
            if !old.tracks(&filename) && new.tracks(&filename) {
                return Err(GitletError::UntrackedFileInTheWay.into());
            }
        }

        for filename in old.blobs.keys() {
            if !new.tracks(filename) {
                let path = self.work_path(filename);
                if path.is_file() {
                    fs::remove_file(&path).with_context(|| format!("Delete '{filename}'"))?;
                }
            }
        }

        for (filename, hash) in &new.blobs {
            blob::restore(self, hash, &self.work_path(filename))?;
        }
        Ok(())
    }

    /// Three-way merge of the given branch into the current one.
    pub fn merge(&self, given_branch: &str) -> Result<()> {
        let mut index = Index::load(self)?;
        if !index.is_clear() {
            return Err(GitletError::UncommittedChanges.into());
        }
        let current_branch = refs::read_head(self)?;
        if given_branch == current_branch {
            return Err(GitletError::MergeWithSelf.into());
        }
        if !refs::branch_exists(self, given_branch) {
            return Err(GitletError::NoSuchBranch.into());
        }

        let current_hash = refs::read_branch(self, &current_branch)?;
        let given_hash = refs::read_branch(self, given_branch)?;
        let current = Commit::load(self, &current_hash)?;
        let given = Commit::load(self, &given_hash)?;

        // Untracked-overwrite safety, before any mutation.
        for filename in self.working_files()? {
            if !current.tracks(&filename) && given.tracks(&filename) {
                return Err(GitletError::UntrackedFileInTheWay.into());
            }
        }

        let split_hash = commit::lca(self, &current_hash, &given_hash)?;
        debug!("merge split point {split_hash}");
        if split_hash == given_hash {
            return Err(GitletError::GivenBranchIsAncestor.into());
        }
        if split_hash == current_hash {
            self.reconcile(&current, &given)?;
            Index::clear(self)?;
            refs::set_branch(self, &current_branch, &given_hash)?;
            return Err(GitletError::FastForwarded.into());
        }
        let split = Commit::load(self, &split_hash)?;

        let mut filenames: BTreeSet<&String> = split.blobs.keys().collect();
        filenames.extend(current.blobs.keys());
        filenames.extend(given.blobs.keys());

        let mut conflict = false;
        for filename in filenames {
            let s = split.blob_hash(filename);
            let c = current.blob_hash(filename);
            let g = given.blob_hash(filename);

            // First matching rule wins; absence is a distinct value.
            match (s, c, g) {
                // Modified only in the given branch: take it.
                (Some(s), Some(c), Some(g)) if s == c && s != g => {
                    self.restore_and_stage(&mut index, filename, g)?;
                }
                // Changed on both sides, and differently: conflict.
                _ if s != c && s != g && c != g => {
                    self.write_conflict(&mut index, filename, c, g)?;
                    conflict = true;
                }
                // Never at the split, absent in given: leave the current
                // version alone.
                (None, _, None) => {}
                // Absent at the split, present in given: take it.
                (None, _, Some(g)) => {
                    self.restore_and_stage(&mut index, filename, g)?;
                }
                // Unmodified here, deleted in the given branch: remove.
                (Some(s), Some(c), None) if s == c => {
                    let path = self.work_path(filename);
                    if path.is_file() {
                        fs::remove_file(&path).with_context(|| format!("Delete '{filename}'"))?;
                    }
                    index.removals.insert(filename.clone(), c.to_string());
                }
                _ => {}
            }
        }

        let merge_commit = Commit::new(
            format!("Merged {given_branch} into {current_branch}."),
            Parentage::Merge {
                parent: current_hash,
                second_parent: given_hash,
            },
            index.apply_to(current.blobs),
        );
        let hash = merge_commit.save(self)?;
        debug!("merge commit {hash} on {current_branch}");

        Index::clear(self)?;
        refs::set_branch(self, &current_branch, &hash)?;

        if conflict {
            return Err(GitletError::MergeConflict.into());
        }
        Ok(())
    }

    /// Restores a file from a blob and stages it for addition. Merge
    /// resolution goes through this; plain `restore` never stages.
    fn restore_and_stage(&self, index: &mut Index, filename: &str, hash: &str) -> Result<()> {
        blob::restore(self, hash, &self.work_path(filename))?;
        index.removals.remove(filename);
        index.additions.insert(filename.to_string(), hash.to_string());
        Ok(())
    }

    /// Writes the conflict envelope for a file into the working tree and
    /// stages the result.
    fn write_conflict(
        &self,
        index: &mut Index,
        filename: &str,
        current: Option<&str>,
        given: Option<&str>,
    ) -> Result<()> {
        let mut content = Vec::from(&b"<<<<<<< HEAD\n"[..]);
        if let Some(hash) = current {
            content.extend(blob::read(self, hash)?);
        }
        content.extend_from_slice(b"=======\n");
        if let Some(hash) = given {
            content.extend(blob::read(self, hash)?);
        }
        content.extend_from_slice(b">>>>>>>\n");

        fs::write(self.work_path(filename), &content)
            .with_context(|| format!("Write conflict markers into '{filename}'"))?;
        let hash = blob::put(self, &content)?;
        index.removals.remove(filename);
        index.additions.insert(filename.to_string(), hash);
        Ok(())
    }
}
