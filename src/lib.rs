//! A local, content-addressed version-control system.
//!
//! The store lives under `.gitlet/` at the working-tree root:
//!
//! ```text
//! .gitlet/
//! ├── objects/         # blobs, named by the sha1 of their bytes
//! │   └── commits/     # serialized commits, named by the sha1 of their bytes
//! ├── refs/            # branch pointers: one file per branch, holding a commit hash
//! ├── HEAD             # name of the current branch
//! └── index            # staging area (absent while nothing is staged)
//! ```
//!
//! Commands mutate the staging area and the object and ref stores; `switch`,
//! `reset`, and `merge` project a commit's snapshot onto the working
//! directory through the reconciler in [`repo`].

pub mod blob;
pub mod commit;
pub mod error;
pub mod index;
pub mod refs;
pub mod repo;

#[cfg(test)]
pub(crate) mod test_utils;
