//! Core types for tasks, context snapshots, plans, and results.
//!
//! Each type is produced once by one pipeline stage and handed on to the next;
//! only the phase executor mutates a plan, and only phase statuses.

mod descriptor;
mod plan;
mod result;
mod snapshot;

// Re-export all public types
pub use descriptor::*;
pub use plan::*;
pub use result::*;
pub use snapshot::*;
