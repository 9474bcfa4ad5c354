use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use jira_release::config::DEFAULT_CONFIG_FILE;
use jira_release::domain::branch::{DEFAULT_MAINLINE, DEFAULT_REMOTE, DEFAULT_STAGING};
use jira_release::domain::BranchLayout;
use jira_release::git::Git2Repository;
use jira_release::tracker::JiraTracker;
use jira_release::ui::{Reporter, TerminalPrompt};
use jira_release::{run_release, ReleaseContext, ReleaseOptions};

#[derive(clap::Parser)]
#[command(
    name = "jira-release",
    version,
    about = "Rebuild the staging branch from JIRA issues of a fix version and tag the release"
)]
struct Args {
    #[arg(long, help = "Delete local issue branches after the merge report")]
    delete_local_branches: bool,

    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE, help = "Configuration file path")]
    config: PathBuf,

    #[arg(long, default_value = DEFAULT_MAINLINE, help = "Branch staging is rebuilt from")]
    mainline: String,

    #[arg(long, default_value = DEFAULT_STAGING, help = "Integration branch to rebuild")]
    staging: String,

    #[arg(long, default_value = DEFAULT_REMOTE, help = "Remote to fetch from and push to")]
    remote: String,

    #[arg(short, long, help = "Only print prompts and errors")]
    quiet: bool,

    #[arg(long, help = "Disable colored output")]
    no_color: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let reporter = Reporter::new(!args.quiet, !args.no_color);

    let repo = match Git2Repository::open(".") {
        Ok(repo) => repo,
        Err(e) => {
            reporter.error(&format!("Git repository error: {}", e));
            std::process::exit(1);
        }
    };
    let tracker = JiraTracker::new()?;
    let prompt = TerminalPrompt;

    let ctx = ReleaseContext::new(&repo, &tracker, &prompt, args.config)
        .with_reporter(reporter)
        .with_layout(BranchLayout::new(args.mainline, args.staging, args.remote));
    let options = ReleaseOptions {
        delete_local_branches: args.delete_local_branches,
    };

    match run_release(&ctx, &options) {
        Ok(outcome) => {
            reporter.success(&format!(
                "Released {} (pushed {})",
                outcome.release.candidate_tag(),
                outcome.pushed_tags.join(", ")
            ));
            Ok(())
        }
        Err(e) => {
            reporter.error(&e.to_string());
            std::process::exit(1);
        }
    }
}
