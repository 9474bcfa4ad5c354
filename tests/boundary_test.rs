use jira_release::boundary::BoundaryWarning;
use jira_release::context::ReleaseContext;
use jira_release::git::MockRepository;
use jira_release::reconcile::{delete_branch, BranchScope};
use jira_release::tracker::MockTracker;
use jira_release::ui::{Reporter, ScriptedPrompt};
use std::io::Write;
use tempfile::NamedTempFile;

// ============================================================================
// BoundaryWarning Display Tests
// ============================================================================

#[test]
fn test_boundary_warning_local_branch_display() {
    let warning = BoundaryWarning::BranchNotDeleted {
        branch: "ABC-1".to_string(),
        remote: None,
        reason: "branch not found".to_string(),
    };

    let display_msg = warning.to_string();
    assert!(
        display_msg.starts_with("Local ABC-1 cannot be deleted"),
        "Message should name the local branch, got: {}",
        display_msg
    );
    assert!(
        display_msg.contains("branch not found"),
        "Message should carry the reason, got: {}",
        display_msg
    );
}

#[test]
fn test_boundary_warning_remote_branch_display() {
    let warning = BoundaryWarning::BranchNotDeleted {
        branch: "staging".to_string(),
        remote: Some("origin".to_string()),
        reason: "remote ref does not exist".to_string(),
    };

    let display_msg = warning.to_string();
    assert!(
        display_msg.contains("Remote staging on 'origin' cannot be deleted"),
        "Message should name the remote branch, got: {}",
        display_msg
    );
}

#[test]
fn test_boundary_warning_no_matching_issues_display() {
    let warning = BoundaryWarning::NoMatchingIssues {
        project: "ABC".to_string(),
        fix_version: "2.0".to_string(),
    };

    assert_eq!(
        warning.to_string(),
        "No ABC issues found for fix version '2.0'"
    );
}

// ============================================================================
// Warn-and-continue behaviour
// ============================================================================

#[test]
fn test_missing_branches_are_skipped_in_both_scopes() {
    let mut config = NamedTempFile::new().unwrap();
    config.write_all(b"[JIRA]\nproject = \"ABC\"\n").unwrap();

    let mut repo = MockRepository::new();
    repo.add_local_branch("master", &["init"]);
    repo.set_current_branch("master");
    let tracker = MockTracker::new();
    let prompt = ScriptedPrompt::new(&[]);
    let ctx = ReleaseContext::new(&repo, &tracker, &prompt, config.path())
        .with_reporter(Reporter::quiet());

    assert!(!delete_branch(&ctx, "ABC-9", BranchScope::Local).unwrap());
    assert!(!delete_branch(&ctx, "ABC-9", BranchScope::Remote).unwrap());
    assert!(!delete_branch(&ctx, "master", BranchScope::Local).unwrap());
    assert_eq!(repo.local_branch("master"), Some(vec!["init".to_string()]));
}
