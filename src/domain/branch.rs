pub const DEFAULT_MAINLINE: &str = "master";
pub const DEFAULT_STAGING: &str = "staging";
pub const DEFAULT_REMOTE: &str = "origin";

/// Names of the integration branches and the remote the pipeline works against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchLayout {
    pub mainline: String,
    pub staging: String,
    pub remote: String,
}

impl BranchLayout {
    pub fn new(
        mainline: impl Into<String>,
        staging: impl Into<String>,
        remote: impl Into<String>,
    ) -> Self {
        BranchLayout {
            mainline: mainline.into(),
            staging: staging.into(),
            remote: remote.into(),
        }
    }

    /// Remote-tracking name of a feature branch, e.g. "origin/ABC-1"
    pub fn remote_branch(&self, branch: &str) -> String {
        format!("{}/{}", self.remote, branch)
    }

    /// Log range reported by the merge report, e.g. "master...staging"
    pub fn report_range(&self) -> String {
        format!("{}...{}", self.mainline, self.staging)
    }
}

impl Default for BranchLayout {
    fn default() -> Self {
        BranchLayout::new(DEFAULT_MAINLINE, DEFAULT_STAGING, DEFAULT_REMOTE)
    }
}
