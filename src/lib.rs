pub mod boundary;
pub mod cli;
pub mod config;
pub mod context;
pub mod domain;
pub mod error;
pub mod git;
pub mod reconcile;
pub mod report;
pub mod tracker;
pub mod ui;
pub mod version;

pub use cli::{run_release, ReleaseOptions, ReleaseOutcome};
pub use context::ReleaseContext;
pub use error::{ReleaseError, Result};
