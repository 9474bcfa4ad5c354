//! Rebuilds the staging branch from the refreshed mainline plus every issue
//! branch of the current fix version.

use crate::boundary::BoundaryWarning;
use crate::context::ReleaseContext;
use crate::error::Result;
use crate::git::MergeOutcome;

/// Where a branch to delete lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchScope {
    Local,
    Remote,
}

/// Deletes a branch, downgrading recoverable failures to a warning.
///
/// # Returns
/// * `Ok(true)` - The branch was deleted
/// * `Ok(false)` - Deletion failed in a way the pipeline tolerates
/// * `Err` - Any other VCS failure
pub fn delete_branch(ctx: &ReleaseContext<'_>, branch: &str, scope: BranchScope) -> Result<bool> {
    let result = match scope {
        BranchScope::Local => ctx.repo.delete_local_branch(branch),
        BranchScope::Remote => ctx.repo.delete_remote_branch(&ctx.layout.remote, branch),
    };

    match result {
        Ok(()) => {
            let place = match scope {
                BranchScope::Local => "local",
                BranchScope::Remote => "remote",
            };
            ctx.reporter
                .success(&format!("Deleted {} {} branch.", place, branch));
            Ok(true)
        }
        Err(e) if e.is_recoverable() => {
            ctx.reporter.warning(&BoundaryWarning::BranchNotDeleted {
                branch: branch.to_string(),
                remote: match scope {
                    BranchScope::Local => None,
                    BranchScope::Remote => Some(ctx.layout.remote.clone()),
                },
                reason: e.to_string(),
            });
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

/// Deletes the local branch named after every issue of the fix version.
pub fn delete_local_branches(ctx: &ReleaseContext<'_>) -> Result<()> {
    for issue in ctx.query_issues()? {
        delete_branch(ctx, &issue.key, BranchScope::Local)?;
    }
    Ok(())
}

/// Recreates staging and merges every issue branch into it.
///
/// Steps, strictly in order:
/// 1. switch to the mainline and delete local issue branches
/// 2. fetch all remotes and pull the mainline
/// 3. delete staging locally and on the remote
/// 4. create staging from `HEAD` and merge `<remote>/<issue key>` for each issue
/// 5. push staging
///
/// A merge conflict aborts the run and leaves the working copy for manual
/// resolution.
///
/// # Returns
/// The keys of the issues that were merged, in tracker order.
pub fn prepare_staging(ctx: &ReleaseContext<'_>) -> Result<Vec<String>> {
    let layout = &ctx.layout;

    ctx.repo.checkout(&layout.mainline)?;
    delete_local_branches(ctx)?;

    ctx.repo.fetch_all()?;
    ctx.repo.pull(&layout.remote, &layout.mainline)?;
    ctx.reporter
        .success(&format!("Updated {}", layout.mainline));

    delete_branch(ctx, &layout.staging, BranchScope::Local)?;
    delete_branch(ctx, &layout.staging, BranchScope::Remote)?;

    ctx.repo.create_branch_from_head(&layout.staging)?;
    ctx.reporter
        .success(&format!("Checkout {}", layout.staging));

    let mut merged = Vec::new();
    for issue in ctx.query_issues()? {
        let outcome = ctx.repo.merge(&layout.remote_branch(&issue.key))?;
        match outcome {
            MergeOutcome::UpToDate => ctx
                .reporter
                .status(&format!("{} already up to date", issue.key)),
            MergeOutcome::FastForward | MergeOutcome::Merged(_) => {
                ctx.reporter.success(&format!("{} merged", issue.key))
            }
        }
        merged.push(issue.key);
    }

    ctx.repo.push_branch(&layout.remote, &layout.staging)?;
    ctx.reporter
        .success(&format!("Pushed {}", layout.staging));

    Ok(merged)
}
