//! Issue tracker access
//!
//! The pipeline asks the tracker for the issues of the configured project and
//! fix version through the [IssueTracker] trait. [jira::JiraTracker] talks to a
//! JIRA server over its REST API; [mock::MockTracker] serves canned issues.

pub mod jira;
pub mod mock;

pub use jira::JiraTracker;
pub use mock::MockTracker;

use crate::config::{DeploymentConfig, TrackerSettings};
use crate::error::Result;

/// An issue as returned by a search. Only `key` drives the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    /// Unique tracker key, e.g. "ABC-123". Feature branches are named after it.
    pub key: String,
    pub summary: Option<String>,
}

impl Issue {
    pub fn new(key: impl Into<String>) -> Self {
        Issue {
            key: key.into(),
            summary: None,
        }
    }
}

/// Issue-tracker capability.
///
/// Every call authenticates afresh with the supplied settings; nothing is
/// cached between searches.
pub trait IssueTracker {
    /// Authenticate and run `query`, returning issues in tracker order.
    ///
    /// # Returns
    /// * `Err(Authentication)` - If the credentials are rejected or the server is unreachable
    fn search(&self, settings: &TrackerSettings, query: &str) -> Result<Vec<Issue>>;
}

/// Issues matching the configured project and fix version.
///
/// Builds the query from `search_pattern` and runs it against `tracker`. An
/// empty result is valid.
pub fn search_issues(config: &DeploymentConfig, tracker: &dyn IssueTracker) -> Result<Vec<Issue>> {
    let settings = config.tracker_settings()?;
    let query = settings.search_query()?;
    tracker.search(&settings, &query)
}
