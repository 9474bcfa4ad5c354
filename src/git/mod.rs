//! Git operations abstraction layer
//!
//! The release pipeline only talks to version control through the
//! [Repository] trait. Two implementations exist:
//!
//! - [repository::Git2Repository]: the working copy, driven through `git2`
//! - [mock::MockRepository]: an in-memory model for exercising the pipeline
//!
//! ## Error kinds
//!
//! Branch deletions report failure as
//! [ReleaseError::RecoverableVcs](crate::error::ReleaseError::RecoverableVcs) so
//! callers can warn and continue. Every other failure is fatal; a conflicting
//! merge is reported as
//! [ReleaseError::MergeConflict](crate::error::ReleaseError::MergeConflict) and
//! leaves the working copy conflicted for manual resolution.

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use std::path::Path;

use git2::Oid;

use crate::error::Result;

/// How a merge was applied to the current branch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The branch already contained the merged commits
    UpToDate,
    /// The branch pointer moved forward without a merge commit
    FastForward,
    /// A merge commit was created
    Merged(Oid),
}

/// Version-control capability used by the release pipeline.
///
/// All operations act on the single working copy the implementation was
/// opened on and block until they finish.
pub trait Repository {
    /// Switch the working copy to a local branch.
    ///
    /// If only a remote-tracking branch of that name exists, a local branch is
    /// created from it first.
    fn checkout(&self, branch: &str) -> Result<()>;

    /// Create `branch` at the current `HEAD` commit and switch to it.
    fn create_branch_from_head(&self, branch: &str) -> Result<()>;

    /// Delete a local branch, even if it has unmerged commits.
    ///
    /// # Returns
    /// * `Err(RecoverableVcs)` - If the branch is missing or cannot be removed
    fn delete_local_branch(&self, branch: &str) -> Result<()>;

    /// Delete a branch on a remote (`git push <remote> :<branch>`).
    ///
    /// # Returns
    /// * `Err(RecoverableVcs)` - If the remote refused or the branch is missing
    fn delete_remote_branch(&self, remote: &str, branch: &str) -> Result<()>;

    /// Fetch every configured remote using its configured refspecs.
    fn fetch_all(&self) -> Result<()>;

    /// Fetch `branch` from `remote` and merge it into the current branch.
    fn pull(&self, remote: &str, branch: &str) -> Result<MergeOutcome>;

    /// Merge a branch (e.g. "origin/ABC-1") into the current branch.
    ///
    /// # Returns
    /// * `Err(MergeConflict)` - If the merge stopped on conflicts
    fn merge(&self, reference: &str) -> Result<MergeOutcome>;

    /// Stage the given files and commit them on the current branch.
    fn commit_paths(&self, paths: &[&Path], message: &str) -> Result<Oid>;

    /// Create an annotated tag on `HEAD`. Fails if the tag already exists.
    fn create_tag(&self, name: &str, message: &str) -> Result<()>;

    /// Push a local branch to the same name on `remote`.
    fn push_branch(&self, remote: &str, branch: &str) -> Result<()>;

    /// Push tags to `remote`.
    fn push_tags(&self, remote: &str, tag_names: &[&str]) -> Result<()>;

    /// All tag names in the repository.
    fn list_tags(&self) -> Result<Vec<String>>;

    /// Log text for the commits on either side of `from...to` but not both.
    fn log_range(&self, from: &str, to: &str) -> Result<String>;
}
