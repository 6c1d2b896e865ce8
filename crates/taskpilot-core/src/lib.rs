//! Core types and traits for the taskpilot pipeline.
//!
//! This crate provides the data model shared by every stage (task descriptors,
//! context snapshots, plans, results), the error taxonomy, configuration, the
//! embedded prompts, and the traits other crates implement.
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

/// Configuration loading and defaults.
pub mod config;
/// Error types and result definitions.
pub mod error;
/// Embedded prompt templates.
pub mod prompts;
/// Poison-tolerant locking.
pub mod sync;
/// Task, snapshot, plan, and result types.
pub mod task;
/// Trait definitions for model providers and context sources.
pub mod traits;
/// Provider request and response types.
pub mod types;

pub use config::{
    ContextConfig, ExecutionConfig, PilotConfig, PlanningConfig, ProviderConfig, ProviderKind,
};
pub use error::{Error, Result};
pub use sync::IgnoreLock;
pub use task::{
    Action, ContextSnapshot, ExecutionOutcome, ExecutionPlan, ExecutionResult, Phase, PhaseStatus,
    PlanId, PlanSource, Priority, TaskDescriptor,
};
pub use traits::{ContextSource, ModelProvider};
pub use types::{Context, Query, Response, TokenUsage};
