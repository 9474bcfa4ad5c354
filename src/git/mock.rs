use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use git2::{ObjectType, Oid};

use crate::error::{ReleaseError, Result};
use crate::git::{MergeOutcome, Repository};

/// Mock repository for testing without actual git operations.
///
/// Branches are modelled as ordered lists of commit summaries. Remote
/// branches are keyed by their remote-tracking name ("origin/ABC-1"), which is
/// also what `merge` and `log_range` resolve against.
pub struct MockRepository {
    state: RefCell<MockState>,
}

#[derive(Default)]
struct MockState {
    current: Option<String>,
    local: BTreeMap<String, Vec<String>>,
    remote: BTreeMap<String, Vec<String>>,
    tags: BTreeMap<String, String>,
    conflicts: BTreeSet<String>,
    pushed_tags: Vec<String>,
    calls: Vec<String>,
    commit_count: usize,
}

fn mock_oid(text: &str) -> Result<Oid> {
    Ok(Oid::hash_object(ObjectType::Commit, text.as_bytes())?)
}

fn not_found(what: &str) -> ReleaseError {
    ReleaseError::Git(git2::Error::from_str(&format!("{} not found", what)))
}

impl MockState {
    fn current_commits(&mut self) -> Result<(&String, &mut Vec<String>)> {
        let current = self
            .current
            .as_ref()
            .ok_or_else(|| ReleaseError::invalid_input("HEAD is not a branch"))?;
        let commits = self
            .local
            .get_mut(current)
            .ok_or_else(|| not_found(current))?;
        Ok((current, commits))
    }

    fn resolve(&self, reference: &str) -> Option<Vec<String>> {
        self.local
            .get(reference)
            .or_else(|| self.remote.get(reference))
            .cloned()
    }

    fn merge_into_current(&mut self, reference: &str) -> Result<MergeOutcome> {
        let source = self.resolve(reference).ok_or_else(|| not_found(reference))?;
        if self.conflicts.contains(reference) {
            return Err(ReleaseError::MergeConflict {
                reference: reference.to_string(),
                paths: vec![format!("{}.txt", reference)],
            });
        }

        let (current, target) = self.current_commits()?;
        let merge_commit = format!("Merge {} into {}", reference, current);
        let incoming: Vec<String> = source
            .iter()
            .filter(|commit| !target.contains(commit))
            .cloned()
            .collect();

        if incoming.is_empty() {
            return Ok(MergeOutcome::UpToDate);
        }
        if target.iter().all(|commit| source.contains(commit)) {
            *target = source;
            return Ok(MergeOutcome::FastForward);
        }

        target.extend(incoming);
        target.push(merge_commit.clone());
        Ok(MergeOutcome::Merged(mock_oid(&merge_commit)?))
    }
}

impl MockRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        MockRepository {
            state: RefCell::new(MockState::default()),
        }
    }

    /// Add a local branch holding the given commits
    pub fn add_local_branch(&mut self, name: impl Into<String>, commits: &[&str]) {
        self.state
            .get_mut()
            .local
            .insert(name.into(), commits.iter().map(|c| c.to_string()).collect());
    }

    /// Add a remote branch under its remote-tracking name, e.g. "origin/ABC-1"
    pub fn add_remote_branch(&mut self, name: impl Into<String>, commits: &[&str]) {
        self.state
            .get_mut()
            .remote
            .insert(name.into(), commits.iter().map(|c| c.to_string()).collect());
    }

    /// Add an existing tag
    pub fn add_tag(&mut self, name: impl Into<String>) {
        self.state
            .get_mut()
            .tags
            .insert(name.into(), String::new());
    }

    /// Make merging `reference` stop with a conflict
    pub fn add_conflict(&mut self, reference: impl Into<String>) {
        self.state.get_mut().conflicts.insert(reference.into());
    }

    /// Set the checked-out branch
    pub fn set_current_branch(&mut self, branch: impl Into<String>) {
        self.state.get_mut().current = Some(branch.into());
    }

    pub fn current_branch(&self) -> Option<String> {
        self.state.borrow().current.clone()
    }

    pub fn local_branch(&self, name: &str) -> Option<Vec<String>> {
        self.state.borrow().local.get(name).cloned()
    }

    pub fn remote_branch(&self, name: &str) -> Option<Vec<String>> {
        self.state.borrow().remote.get(name).cloned()
    }

    /// Message a tag was created with, if it exists
    pub fn tag_message(&self, name: &str) -> Option<String> {
        self.state.borrow().tags.get(name).cloned()
    }

    pub fn pushed_tags(&self) -> Vec<String> {
        self.state.borrow().pushed_tags.clone()
    }

    /// Every mutating call, in order, e.g. "checkout master"
    pub fn calls(&self) -> Vec<String> {
        self.state.borrow().calls.clone()
    }

    fn record(&self, call: String) {
        self.state.borrow_mut().calls.push(call);
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository for MockRepository {
    fn checkout(&self, branch: &str) -> Result<()> {
        self.record(format!("checkout {}", branch));
        let mut state = self.state.borrow_mut();

        if !state.local.contains_key(branch) {
            let suffix = format!("/{}", branch);
            let tracking = state
                .remote
                .iter()
                .find(|(name, _)| name.ends_with(&suffix))
                .map(|(_, commits)| commits.clone())
                .ok_or_else(|| not_found(branch))?;
            state.local.insert(branch.to_string(), tracking);
        }

        state.current = Some(branch.to_string());
        Ok(())
    }

    fn create_branch_from_head(&self, branch: &str) -> Result<()> {
        self.record(format!("create {}", branch));
        let mut state = self.state.borrow_mut();

        if state.local.contains_key(branch) {
            return Err(ReleaseError::Git(git2::Error::from_str(&format!(
                "a branch named '{}' already exists",
                branch
            ))));
        }
        let (_, head) = state.current_commits()?;
        let head = head.clone();
        state.local.insert(branch.to_string(), head);
        state.current = Some(branch.to_string());
        Ok(())
    }

    fn delete_local_branch(&self, branch: &str) -> Result<()> {
        self.record(format!("delete {}", branch));
        let mut state = self.state.borrow_mut();

        if state.current.as_deref() == Some(branch) {
            return Err(ReleaseError::recoverable(format!(
                "Local {} cannot be deleted: branch is checked out",
                branch
            )));
        }
        state
            .local
            .remove(branch)
            .map(|_| ())
            .ok_or_else(|| ReleaseError::recoverable(format!("Local {} cannot be deleted", branch)))
    }

    fn delete_remote_branch(&self, remote: &str, branch: &str) -> Result<()> {
        self.record(format!("delete {}/{}", remote, branch));
        self.state
            .borrow_mut()
            .remote
            .remove(&format!("{}/{}", remote, branch))
            .map(|_| ())
            .ok_or_else(|| ReleaseError::recoverable(format!("Remote {} cannot be deleted", branch)))
    }

    fn fetch_all(&self) -> Result<()> {
        self.record("fetch --all".to_string());
        Ok(())
    }

    fn pull(&self, remote: &str, branch: &str) -> Result<MergeOutcome> {
        self.record(format!("pull {} {}", remote, branch));
        let reference = format!("{}/{}", remote, branch);
        let mut state = self.state.borrow_mut();

        if !state.remote.contains_key(&reference) {
            return Err(ReleaseError::remote(format!("{} not found", reference)));
        }
        state.merge_into_current(&reference)
    }

    fn merge(&self, reference: &str) -> Result<MergeOutcome> {
        self.record(format!("merge {}", reference));
        self.state.borrow_mut().merge_into_current(reference)
    }

    fn commit_paths(&self, paths: &[&Path], message: &str) -> Result<Oid> {
        let files: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
        self.record(format!("commit {} {}", files.join(" "), message));
        let mut state = self.state.borrow_mut();

        state.commit_count += 1;
        let commit = format!("{} ({})", message, state.commit_count);
        let (_, head) = state.current_commits()?;
        head.push(commit.clone());
        mock_oid(&commit)
    }

    fn create_tag(&self, name: &str, message: &str) -> Result<()> {
        self.record(format!("tag {}", name));
        let mut state = self.state.borrow_mut();

        if state.tags.contains_key(name) {
            return Err(ReleaseError::tag(format!("'{}': tag already exists", name)));
        }
        state.tags.insert(name.to_string(), message.to_string());
        Ok(())
    }

    fn push_branch(&self, remote: &str, branch: &str) -> Result<()> {
        self.record(format!("push {} {}", remote, branch));
        let mut state = self.state.borrow_mut();

        let commits = state
            .local
            .get(branch)
            .cloned()
            .ok_or_else(|| ReleaseError::remote(format!("src refspec {} does not match any", branch)))?;
        state.remote.insert(format!("{}/{}", remote, branch), commits);
        Ok(())
    }

    fn push_tags(&self, remote: &str, tag_names: &[&str]) -> Result<()> {
        self.record(format!("push {} tags {}", remote, tag_names.join(" ")));
        let mut state = self.state.borrow_mut();

        for tag in tag_names {
            if !state.tags.contains_key(*tag) {
                return Err(ReleaseError::remote(format!("src refspec {} does not match any", tag)));
            }
            state.pushed_tags.push(tag.to_string());
        }
        Ok(())
    }

    fn list_tags(&self) -> Result<Vec<String>> {
        Ok(self.state.borrow().tags.keys().cloned().collect())
    }

    fn log_range(&self, from: &str, to: &str) -> Result<String> {
        let state = self.state.borrow();
        let left = state.resolve(from).ok_or_else(|| not_found(from))?;
        let right = state.resolve(to).ok_or_else(|| not_found(to))?;

        let lines: Vec<&str> = right
            .iter()
            .filter(|commit| !left.contains(commit))
            .chain(left.iter().filter(|commit| !right.contains(commit)))
            .map(String::as_str)
            .collect();
        Ok(lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo_on_master() -> MockRepository {
        let mut repo = MockRepository::new();
        repo.add_local_branch("master", &["init"]);
        repo.set_current_branch("master");
        repo
    }

    #[test]
    fn test_mock_repository_tags() {
        let mut repo = MockRepository::new();
        repo.add_tag("1.0");

        assert_eq!(repo.list_tags().unwrap(), vec!["1.0".to_string()]);
        assert!(repo.create_tag("1.0", "again").is_err());
    }

    #[test]
    fn test_checkout_creates_local_from_remote() {
        let mut repo = MockRepository::new();
        repo.add_remote_branch("origin/master", &["init"]);

        repo.checkout("master").unwrap();
        assert_eq!(repo.current_branch().as_deref(), Some("master"));
        assert_eq!(repo.local_branch("master").unwrap(), vec!["init"]);
    }

    #[test]
    fn test_merge_fast_forwards_then_merges() {
        let mut repo = repo_on_master();
        repo.add_remote_branch("origin/ABC-1", &["init", "ABC-1 login"]);
        repo.add_remote_branch("origin/ABC-2", &["init", "ABC-2 logout"]);

        assert_eq!(repo.merge("origin/ABC-1").unwrap(), MergeOutcome::FastForward);
        assert!(matches!(
            repo.merge("origin/ABC-2").unwrap(),
            MergeOutcome::Merged(_)
        ));
        assert_eq!(repo.merge("origin/ABC-2").unwrap(), MergeOutcome::UpToDate);
        assert_eq!(
            repo.local_branch("master").unwrap(),
            vec![
                "init",
                "ABC-1 login",
                "ABC-2 logout",
                "Merge origin/ABC-2 into master"
            ]
        );
    }

    #[test]
    fn test_merge_conflict() {
        let mut repo = repo_on_master();
        repo.add_remote_branch("origin/ABC-1", &["init", "ABC-1 login"]);
        repo.add_conflict("origin/ABC-1");

        assert!(matches!(
            repo.merge("origin/ABC-1"),
            Err(ReleaseError::MergeConflict { .. })
        ));
    }

    #[test]
    fn test_delete_missing_branch_is_recoverable() {
        let repo = repo_on_master();
        let err = repo.delete_local_branch("ABC-9").unwrap_err();
        assert!(err.is_recoverable());

        let err = repo.delete_remote_branch("origin", "staging").unwrap_err();
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_cannot_delete_checked_out_branch() {
        let repo = repo_on_master();
        assert!(repo.delete_local_branch("master").unwrap_err().is_recoverable());
    }

    #[test]
    fn test_push_tags_requires_local_tag() {
        let repo = repo_on_master();
        assert!(repo.push_tags("origin", &["2.0"]).is_err());

        repo.create_tag("2.0", "Release 2.0").unwrap();
        repo.push_tags("origin", &["2.0"]).unwrap();
        assert_eq!(repo.pushed_tags(), vec!["2.0".to_string()]);
    }

    #[test]
    fn test_log_range_is_symmetric_difference() {
        let mut repo = MockRepository::new();
        repo.add_local_branch("master", &["init", "hotfix"]);
        repo.add_local_branch("staging", &["init", "ABC-1 login"]);

        let log = repo.log_range("master", "staging").unwrap();
        assert_eq!(log, "ABC-1 login\nhotfix");
    }
}
