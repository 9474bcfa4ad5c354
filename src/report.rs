//! Summary of the issue keys that landed on staging.

use std::collections::BTreeSet;

use crate::config::JIRA_SECTION;
use crate::context::ReleaseContext;
use crate::error::Result;

/// Tokens of `log` that mention `prefix` (e.g. "ABC-"), excluding anything
/// containing "origin", deduplicated.
pub fn collect_issue_tokens(log: &str, prefix: &str) -> BTreeSet<String> {
    log.split_whitespace()
        .filter(|token| token.contains(prefix) && !token.contains("origin"))
        .map(str::to_string)
        .collect()
}

/// Report lines, one "- <token>" per collected token.
pub fn format_report(tokens: &BTreeSet<String>) -> Vec<String> {
    tokens.iter().map(|token| format!("- {}", token)).collect()
}

/// Prints the issue keys found in the `mainline...staging` log.
///
/// # Returns
/// The printed report lines.
pub fn print_merged_branches(ctx: &ReleaseContext<'_>) -> Result<Vec<String>> {
    let config = ctx.load_config()?;
    let prefix = format!("{}-", config.get(JIRA_SECTION, "project")?.to_uppercase());

    let log = ctx
        .repo
        .log_range(&ctx.layout.mainline, &ctx.layout.staging)?;
    let lines = format_report(&collect_issue_tokens(&log, &prefix));

    ctx.reporter
        .header(&format!("New feature branches ({})", ctx.layout.report_range()));
    for line in &lines {
        ctx.reporter.bullet(line);
    }

    Ok(lines)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;
    use crate::git::MockRepository;
    use crate::tracker::MockTracker;
    use crate::ui::{Reporter, ScriptedPrompt};

    #[test]
    fn test_collect_issue_tokens_filters_origin_and_duplicates() {
        let tokens = collect_issue_tokens(
            "Merge PROJ-1 into staging from origin/PROJ-1 PROJ-2",
            "PROJ-",
        );
        let lines: BTreeSet<String> = format_report(&tokens).into_iter().collect();

        let expected: BTreeSet<String> = ["- PROJ-1", "- PROJ-2"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(lines, expected);
    }

    #[test]
    fn test_collect_issue_tokens_splits_on_line_breaks() {
        let tokens = collect_issue_tokens("PROJ-3 fix\r\nPROJ-4\tdocs\nPROJ-3", "PROJ-");
        assert_eq!(
            tokens.into_iter().collect::<Vec<_>>(),
            vec!["PROJ-3".to_string(), "PROJ-4".to_string()]
        );
    }

    #[test]
    fn test_tokens_keep_surrounding_punctuation() {
        let tokens = collect_issue_tokens("PROJ-5: login (PROJ-6)", "PROJ-");
        assert!(tokens.contains("PROJ-5:"));
        assert!(tokens.contains("(PROJ-6)"));
    }

    #[test]
    fn test_other_projects_are_ignored() {
        assert!(collect_issue_tokens("XYZ-1 ABC", "PROJ-").is_empty());
    }

    #[test]
    fn test_print_merged_branches_uses_uppercase_project() {
        let mut config = NamedTempFile::new().unwrap();
        config
            .write_all(b"[JIRA]\nproject = \"abc\"\n")
            .unwrap();

        let mut repo = MockRepository::new();
        repo.add_local_branch("master", &["init"]);
        repo.add_local_branch(
            "staging",
            &["init", "ABC-1 login", "Merge remote-tracking branch 'origin/ABC-2' into staging", "ABC-2 logout"],
        );
        let tracker = MockTracker::new();
        let prompt = ScriptedPrompt::new(&[]);
        let ctx = ReleaseContext::new(&repo, &tracker, &prompt, config.path())
            .with_reporter(Reporter::quiet());

        let lines = print_merged_branches(&ctx).unwrap();
        assert_eq!(lines, vec!["- ABC-1", "- ABC-2"]);
    }
}
