use std::path::PathBuf;

use crate::boundary::BoundaryWarning;
use crate::config::DeploymentConfig;
use crate::domain::BranchLayout;
use crate::error::Result;
use crate::git::Repository;
use crate::tracker::{self, Issue, IssueTracker};
use crate::ui::{Prompt, Reporter};

/// Everything a pipeline stage needs, passed explicitly to each stage.
pub struct ReleaseContext<'a> {
    pub repo: &'a dyn Repository,
    pub tracker: &'a dyn IssueTracker,
    pub prompt: &'a dyn Prompt,
    pub reporter: Reporter,
    pub config_path: PathBuf,
    pub layout: BranchLayout,
}

impl<'a> ReleaseContext<'a> {
    pub fn new(
        repo: &'a dyn Repository,
        tracker: &'a dyn IssueTracker,
        prompt: &'a dyn Prompt,
        config_path: impl Into<PathBuf>,
    ) -> Self {
        ReleaseContext {
            repo,
            tracker,
            prompt,
            reporter: Reporter::default(),
            config_path: config_path.into(),
            layout: BranchLayout::default(),
        }
    }

    pub fn with_reporter(mut self, reporter: Reporter) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn with_layout(mut self, layout: BranchLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Reads the configuration file afresh.
    pub fn load_config(&self) -> Result<DeploymentConfig> {
        DeploymentConfig::load(&self.config_path)
    }

    /// Runs a fresh tracker query for the configured fix version.
    pub fn query_issues(&self) -> Result<Vec<Issue>> {
        let config = self.load_config()?;
        let issues = tracker::search_issues(&config, self.tracker)?;

        if issues.is_empty() {
            let settings = config.tracker_settings()?;
            self.reporter.warning(&BoundaryWarning::NoMatchingIssues {
                project: settings.project,
                fix_version: settings.fix_version,
            });
        }

        Ok(issues)
    }
}
