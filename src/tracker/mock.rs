use std::cell::RefCell;

use crate::config::TrackerSettings;
use crate::error::{ReleaseError, Result};
use crate::tracker::{Issue, IssueTracker};

/// Tracker that answers every search with the same issues.
#[derive(Default)]
pub struct MockTracker {
    issues: Vec<Issue>,
    reject_credentials: bool,
    queries: RefCell<Vec<String>>,
}

impl MockTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_issues(keys: &[&str]) -> Self {
        MockTracker {
            issues: keys.iter().map(|key| Issue::new(*key)).collect(),
            ..Self::default()
        }
    }

    /// Make every search fail authentication
    pub fn rejecting_credentials() -> Self {
        MockTracker {
            reject_credentials: true,
            ..Self::default()
        }
    }

    /// Queries received so far, in order
    pub fn queries(&self) -> Vec<String> {
        self.queries.borrow().clone()
    }
}

impl IssueTracker for MockTracker {
    fn search(&self, settings: &TrackerSettings, query: &str) -> Result<Vec<Issue>> {
        if self.reject_credentials {
            return Err(ReleaseError::authentication(format!(
                "{} rejected user '{}'",
                settings.server, settings.username
            )));
        }
        self.queries.borrow_mut().push(query.to_string());
        Ok(self.issues.clone())
    }
}
