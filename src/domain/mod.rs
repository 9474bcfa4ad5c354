//! Domain logic - pure naming and formatting rules independent of git or JIRA

pub mod branch;
pub mod tag;
pub mod template;

pub use branch::BranchLayout;
pub use tag::{ReleaseVersion, TagKind};
pub use template::MessageTemplate;
