//! Version bump commits and release tags.

use crate::config::PROJECT_SECTION;
use crate::context::ReleaseContext;
use crate::domain::{MessageTemplate, ReleaseVersion, TagKind};
use crate::error::{ReleaseError, Result};
use crate::ui;

pub const PROMOTION_QUESTION: &str = "Do you want to push main version: [Y/N] ";

/// Aborts if either tag this release would create already exists.
///
/// Runs before any mutation so a collision never leaves partial state.
pub fn check_tags(ctx: &ReleaseContext<'_>, release: &ReleaseVersion) -> Result<()> {
    let wanted = release.tag_names();
    let existing = ctx.repo.list_tags()?;

    match existing.into_iter().find(|tag| wanted.contains(tag)) {
        Some(tag) => Err(ReleaseError::TagCollision { tag }),
        None => Ok(()),
    }
}

/// Records the new version in `[PROJECT]`, commits the configuration file and
/// pushes staging.
pub fn create_version(ctx: &ReleaseContext<'_>, release: &ReleaseVersion) -> Result<()> {
    let mut config = ctx.load_config()?;
    config.set(PROJECT_SECTION, "rc_version", release.rc_version.as_str());
    config.set(PROJECT_SECTION, "version", release.version.as_str());
    config.save()?;

    let message = MessageTemplate::new(config.get(PROJECT_SECTION, "bump_message")?)
        .render(&[release.version.as_str(), release.rc_version.as_str()])?;
    ctx.repo.commit_paths(&[config.path()], &message)?;
    ctx.reporter.success(&format!(
        "Bumped version to {} rc{}",
        release.version, release.rc_version
    ));

    ctx.repo
        .push_branch(&ctx.layout.remote, &ctx.layout.staging)?;
    ctx.reporter
        .success(&format!("Pushed {}", ctx.layout.staging));

    Ok(())
}

/// Creates the candidate or final tag on `HEAD` with the configured message.
///
/// # Returns
/// The tag name.
pub fn create_tag(ctx: &ReleaseContext<'_>, release: &ReleaseVersion, kind: TagKind) -> Result<String> {
    let tag = release.tag(kind);
    let config = ctx.load_config()?;
    let message =
        MessageTemplate::new(config.get(PROJECT_SECTION, "tag_message")?).render(&[tag.as_str()])?;

    ctx.repo.create_tag(&tag, &message)?;
    ctx.reporter.success(&format!("Created tag: {}", tag));

    Ok(tag)
}

/// Asks whether to promote, then pushes.
///
/// On a "Y" answer the final tag is created and pushed first. The candidate
/// tag is pushed whatever the answer.
///
/// # Returns
/// The pushed tag names, in push order.
pub fn push_tag(ctx: &ReleaseContext<'_>, release: &ReleaseVersion) -> Result<Vec<String>> {
    let mut pushed = Vec::new();
    let remote = &ctx.layout.remote;

    let answer = ctx.prompt.ask(PROMOTION_QUESTION)?;
    if ui::is_affirmative(&answer) {
        let tag = create_tag(ctx, release, TagKind::Final)?;
        ctx.repo.push_tags(remote, &[tag.as_str()])?;
        ctx.reporter.success(&format!("Pushed {}", tag));
        pushed.push(tag);
    }

    let candidate = release.candidate_tag();
    ctx.repo.push_tags(remote, &[candidate.as_str()])?;
    ctx.reporter.success(&format!("Pushed {}", candidate));
    pushed.push(candidate);

    Ok(pushed)
}
