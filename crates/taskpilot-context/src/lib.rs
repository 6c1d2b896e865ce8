//! Context gathering: read-only scans of a target directory for planning prompts.
#![cfg_attr(
    test,
    allow(
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::missing_panics_doc,
        reason = "Test allows"
    )
)]

mod fs_utils;
mod gatherer;

pub use fs_utils::IGNORED_DIRS;
pub use gatherer::ContextGatherer;
