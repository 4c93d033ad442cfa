//! The user-facing error taxonomy. Every variant renders as the exact
//! one-line message the command surface prints; infrastructure failures
//! propagate as plain `anyhow` errors instead.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GitletError {
    #[error("A Gitlet version-control system already exists in the current directory.")]
    AlreadyInitialized,

    #[error("Not in an initialized Gitlet directory.")]
    NotInitialized,

    #[error("Please enter a command.")]
    EmptyCommand,

    #[error("Incorrect operands.")]
    IncorrectOperands,

    #[error("No command with that name exists.")]
    UnknownCommand,

    #[error("File does not exist.")]
    FileDoesNotExist,

    #[error("No reason to remove the file.")]
    NoReasonToRemove,

    #[error("Please enter a commit message.")]
    EmptyMessage,

    #[error("No changes added to the commit.")]
    NoChangesAdded,

    #[error("A branch with that name already exists.")]
    BranchExists,

    /// Missing branch, as reported by `branch`, `rm-branch`, and `merge`.
    #[error("A branch with that name does not exist.")]
    NoSuchBranch,

    /// Missing branch, as reported by `switch`.
    #[error("No such branch exists.")]
    NoSuchBranchToSwitch,

    #[error("Cannot remove the current branch.")]
    CannotRemoveCurrentBranch,

    #[error("No need to switch to the current branch.")]
    AlreadyOnBranch,

    #[error("No commit with that id exists.")]
    NoSuchCommit,

    #[error("File does not exist in that commit.")]
    FileNotInCommit,

    #[error("Found no commit with that message.")]
    NoCommitWithMessage,

    #[error("There is an untracked file in the way; delete it, or add and commit it first.")]
    UntrackedFileInTheWay,

    #[error("You have uncommitted changes.")]
    UncommittedChanges,

    #[error("Cannot merge a branch with itself.")]
    MergeWithSelf,

    #[error("Given branch is an ancestor of the current branch.")]
    GivenBranchIsAncestor,

    /// Informational: the merge already moved the current branch to the
    /// given head when this surfaces.
    #[error("Current branch fast-forwarded.")]
    FastForwarded,

    /// Informational: the merge commit is already written when this
    /// surfaces.
    #[error("Encountered a merge conflict.")]
    MergeConflict,
}
