use std::fmt;

/// Non-fatal conditions met while preparing a release.
/// These are reported to the operator and the pipeline carries on.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// A local or remote branch could not be deleted (missing, checked out, or refused)
    BranchNotDeleted {
        branch: String,
        remote: Option<String>,
        reason: String,
    },
    /// The tracker returned no issues for the fix version
    NoMatchingIssues { project: String, fix_version: String },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::BranchNotDeleted {
                branch,
                remote: None,
                reason,
            } => write!(f, "Local {} cannot be deleted ({})", branch, reason),
            BoundaryWarning::BranchNotDeleted {
                branch,
                remote: Some(remote),
                reason,
            } => write!(
                f,
                "Remote {} on '{}' cannot be deleted ({})",
                branch, remote, reason
            ),
            BoundaryWarning::NoMatchingIssues {
                project,
                fix_version,
            } => write!(
                f,
                "No {} issues found for fix version '{}'",
                project, fix_version
            ),
        }
    }
}
