//! Command-line surface: argument types and the release workflow.

pub mod orchestration;

pub use orchestration::{run_release, ReleaseOptions, ReleaseOutcome};
