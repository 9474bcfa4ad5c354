//! Main workflow orchestration logic
//!
//! Runs the release pipeline stage by stage against a [ReleaseContext]. The
//! binary only parses arguments, builds the context and reports the outcome,
//! so the whole workflow can be driven programmatically with mock
//! capabilities.

use crate::context::ReleaseContext;
use crate::domain::{ReleaseVersion, TagKind};
use crate::error::Result;
use crate::{reconcile, report, ui, version};

pub const VERSION_QUESTION: &str = "Version: ";
pub const RC_VERSION_QUESTION: &str = "RC Version: ";

/// Switches for a release run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReleaseOptions {
    /// Delete local issue branches again after the merge report
    pub delete_local_branches: bool,
}

/// Result of a completed release run
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseOutcome {
    pub release: ReleaseVersion,
    /// Issue keys merged into staging, in tracker order
    pub merged: Vec<String>,
    /// Lines of the merge report
    pub report: Vec<String>,
    /// Tags pushed to the remote, in push order
    pub pushed_tags: Vec<String>,
}

impl ReleaseOutcome {
    /// Whether the final tag was created and pushed
    pub fn promoted(&self) -> bool {
        self.pushed_tags.contains(&self.release.final_tag())
    }
}

/// Main release workflow
///
/// 1. Validate configuration
/// 2. Ask for version and rc version
/// 3. Refuse to continue if either tag exists
/// 4. Rebuild staging
/// 5. Commit the version bump and create the candidate tag
/// 6. Print the merge report
/// 7. Optionally delete local issue branches
/// 8. Ask about promotion and push tags
///
/// Any error aborts the run where it happened; nothing is rolled back.
pub fn run_release(ctx: &ReleaseContext<'_>, options: &ReleaseOptions) -> Result<ReleaseOutcome> {
    ctx.reporter.splash();
    ctx.load_config()?.validate()?;

    let version = ui::ask_non_empty(ctx.prompt, VERSION_QUESTION)?;
    let rc_version = ui::ask_non_empty(ctx.prompt, RC_VERSION_QUESTION)?;
    let release = ReleaseVersion::new(version, rc_version)?;

    version::check_tags(ctx, &release)?;

    let merged = reconcile::prepare_staging(ctx)?;
    version::create_version(ctx, &release)?;
    version::create_tag(ctx, &release, TagKind::Candidate)?;
    let report = report::print_merged_branches(ctx)?;

    if options.delete_local_branches {
        reconcile::delete_local_branches(ctx)?;
    }

    let pushed_tags = version::push_tag(ctx, &release)?;

    Ok(ReleaseOutcome {
        release,
        merged,
        report,
        pushed_tags,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use tempfile::TempDir;

    use super::*;
    use crate::config::DeploymentConfig;
    use crate::error::ReleaseError;
    use crate::git::MockRepository;
    use crate::tracker::MockTracker;
    use crate::ui::{Reporter, ScriptedPrompt};
    use crate::version::PROMOTION_QUESTION;

    const CONFIG: &str = r#"
[JIRA]
server = "https://jira.example.com"
username = "bot"
password = "pw"
project = "ABC"
fix_version = "2.0"
search_pattern = "project = {} AND fixVersion = {}"

[PROJECT]
version = "1.0"
rc_version = "4"
bump_message = "Bump version to {}rc{}"
tag_message = "Release {}"
"#;

    fn workspace(contents: &str) -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("deployment.toml");
        fs::write(&path, contents).unwrap();
        (dir, path)
    }

    fn repository() -> MockRepository {
        let mut repo = MockRepository::new();
        repo.add_local_branch("master", &["init"]);
        repo.add_local_branch("staging", &["init", "stale"]);
        repo.add_remote_branch("origin/master", &["init", "hotfix"]);
        repo.add_remote_branch("origin/staging", &["init", "stale"]);
        repo.add_remote_branch("origin/ABC-1", &["init", "ABC-1 login"]);
        repo.add_remote_branch("origin/ABC-2", &["init", "ABC-2 logout"]);
        repo.set_current_branch("staging");
        repo
    }

    #[test]
    fn test_full_release_with_promotion() {
        let (_dir, path) = workspace(CONFIG);
        let repo = repository();
        let tracker = MockTracker::with_issues(&["ABC-1", "ABC-2"]);
        let prompt = ScriptedPrompt::new(&["2.0", "1", "Y"]);
        let ctx = ReleaseContext::new(&repo, &tracker, &prompt, &path)
            .with_reporter(Reporter::quiet());

        let outcome = run_release(&ctx, &ReleaseOptions::default()).unwrap();

        assert_eq!(outcome.merged, vec!["ABC-1", "ABC-2"]);
        assert_eq!(outcome.report, vec!["- ABC-1", "- ABC-2"]);
        assert_eq!(outcome.pushed_tags, vec!["2.0", "2.0rc1"]);
        assert!(outcome.promoted());
        assert_eq!(
            prompt.asked(),
            vec![VERSION_QUESTION, RC_VERSION_QUESTION, PROMOTION_QUESTION]
        );

        let config = DeploymentConfig::load(&path).unwrap();
        assert_eq!(config.get("PROJECT", "version").unwrap(), "2.0");
        assert_eq!(config.get("PROJECT", "rc_version").unwrap(), "1");

        let staging = repo.local_branch("staging").unwrap();
        assert!(staging.last().unwrap().starts_with("Bump version to 2.0rc1"));
        assert_eq!(repo.remote_branch("origin/staging"), Some(staging));
        assert_eq!(repo.tag_message("2.0rc1").as_deref(), Some("Release 2.0rc1"));
        assert_eq!(repo.tag_message("2.0").as_deref(), Some("Release 2.0"));
    }

    #[test]
    fn test_release_without_promotion_pushes_candidate_only() {
        let (_dir, path) = workspace(CONFIG);
        let repo = repository();
        let tracker = MockTracker::with_issues(&["ABC-1"]);
        let prompt = ScriptedPrompt::new(&["2.0", "1", "n"]);
        let ctx = ReleaseContext::new(&repo, &tracker, &prompt, &path)
            .with_reporter(Reporter::quiet());

        let outcome = run_release(&ctx, &ReleaseOptions::default()).unwrap();

        assert_eq!(outcome.pushed_tags, vec!["2.0rc1"]);
        assert!(!outcome.promoted());
        assert_eq!(repo.tag_message("2.0"), None);
    }

    #[test]
    fn test_missing_key_aborts_before_any_prompt() {
        let without_tag_message = CONFIG.replace("tag_message = \"Release {}\"\n", "");
        let (_dir, path) = workspace(&without_tag_message);
        let repo = repository();
        let tracker = MockTracker::with_issues(&["ABC-1"]);
        let prompt = ScriptedPrompt::new(&["2.0", "1", "Y"]);
        let ctx = ReleaseContext::new(&repo, &tracker, &prompt, &path)
            .with_reporter(Reporter::quiet());

        let err = run_release(&ctx, &ReleaseOptions::default()).unwrap_err();

        assert!(matches!(err, ReleaseError::MissingKey { ref key, .. } if key == "tag_message"));
        assert!(prompt.asked().is_empty());
        assert!(repo.calls().is_empty());
    }

    #[test]
    fn test_tag_collision_aborts_before_reconciliation() {
        let (_dir, path) = workspace(CONFIG);
        let mut repo = repository();
        repo.add_tag("2.0rc1");
        let tracker = MockTracker::with_issues(&["ABC-1"]);
        let prompt = ScriptedPrompt::new(&["2.0", "1", "Y"]);
        let ctx = ReleaseContext::new(&repo, &tracker, &prompt, &path)
            .with_reporter(Reporter::quiet());

        let err = run_release(&ctx, &ReleaseOptions::default()).unwrap_err();

        assert_eq!(err.to_string(), "2.0rc1 already exists");
        assert!(repo.calls().is_empty());
        assert!(tracker.queries().is_empty());
        assert_eq!(
            DeploymentConfig::load(&path).unwrap().get("PROJECT", "version").unwrap(),
            "1.0"
        );
    }

    #[test]
    fn test_blank_version_is_asked_again() {
        let (_dir, path) = workspace(CONFIG);
        let repo = repository();
        let tracker = MockTracker::new();
        let prompt = ScriptedPrompt::new(&["", "3.1", " ", "2", "N"]);
        let ctx = ReleaseContext::new(&repo, &tracker, &prompt, &path)
            .with_reporter(Reporter::quiet());

        let outcome = run_release(&ctx, &ReleaseOptions::default()).unwrap();

        assert_eq!(outcome.release, ReleaseVersion::new("3.1", "2").unwrap());
        assert!(outcome.merged.is_empty());
        assert_eq!(outcome.pushed_tags, vec!["3.1rc2"]);
    }

    #[test]
    fn test_local_branch_cleanup_only_with_flag() {
        for (flag, expected_deletes) in [(false, 1), (true, 2)] {
            let (_dir, path) = workspace(CONFIG);
            let mut repo = repository();
            repo.add_local_branch("ABC-1", &["init", "ABC-1 wip"]);
            let tracker = MockTracker::with_issues(&["ABC-1"]);
            let prompt = ScriptedPrompt::new(&["2.0", "1", "N"]);
            let ctx = ReleaseContext::new(&repo, &tracker, &prompt, &path)
                .with_reporter(Reporter::quiet());
            let options = ReleaseOptions {
                delete_local_branches: flag,
            };

            run_release(&ctx, &options).unwrap();

            let deletes = repo
                .calls()
                .iter()
                .filter(|call| call.as_str() == "delete ABC-1")
                .count();
            assert_eq!(deletes, expected_deletes, "flag {}", flag);
        }
    }

    #[test]
    fn test_merge_conflict_leaves_no_tags() {
        let (_dir, path) = workspace(CONFIG);
        let mut repo = repository();
        repo.add_conflict("origin/ABC-2");
        let tracker = MockTracker::with_issues(&["ABC-1", "ABC-2"]);
        let prompt = ScriptedPrompt::new(&["2.0", "1", "Y"]);
        let ctx = ReleaseContext::new(&repo, &tracker, &prompt, &path)
            .with_reporter(Reporter::quiet());

        let err = run_release(&ctx, &ReleaseOptions::default()).unwrap_err();

        assert!(matches!(err, ReleaseError::MergeConflict { .. }));
        assert_eq!(repo.tag_message("2.0rc1"), None);
        assert!(repo.pushed_tags().is_empty());
    }
}
