//! Structured form of a parsed natural-language instruction

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Kind of work an instruction asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Restructure files and directories
    Organize,
    /// Restructure code without changing behavior
    Refactor,
    /// Move dependencies or toolchains to newer versions
    Upgrade,
    /// Inspect and summarize
    Analyze,
    /// Add or run tests
    Test,
    /// Write or improve documentation
    Document,
    /// Repair a defect
    Fix,
    /// Improve performance or resource use
    Optimize,
    /// Harden against security issues
    Secure,
}

impl Action {
    /// Every action, in vocabulary order.
    pub const ALL: [Self; 9] = [
        Self::Organize,
        Self::Refactor,
        Self::Upgrade,
        Self::Analyze,
        Self::Test,
        Self::Document,
        Self::Fix,
        Self::Optimize,
        Self::Secure,
    ];

    /// The imperative verb for this action.
    #[must_use]
    pub const fn verb(self) -> &'static str {
        match self {
            Self::Organize => "organize",
            Self::Refactor => "refactor",
            Self::Upgrade => "upgrade",
            Self::Analyze => "analyze",
            Self::Test => "test",
            Self::Document => "document",
            Self::Fix => "fix",
            Self::Optimize => "optimize",
            Self::Secure => "secure",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Organize => write!(formatter, "Organize"),
            Self::Refactor => write!(formatter, "Refactor"),
            Self::Upgrade => write!(formatter, "Upgrade"),
            Self::Analyze => write!(formatter, "Analyze"),
            Self::Test => write!(formatter, "Test"),
            Self::Document => write!(formatter, "Document"),
            Self::Fix => write!(formatter, "Fix"),
            Self::Optimize => write!(formatter, "Optimize"),
            Self::Secure => write!(formatter, "Secure"),
        }
    }
}

/// Scheduling priority inferred from the instruction wording.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Can wait
    Low,
    /// No urgency markers present
    #[default]
    Normal,
    /// Marked urgent or critical
    High,
}

impl fmt::Display for Priority {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(formatter, "low"),
            Self::Normal => write!(formatter, "normal"),
            Self::High => write!(formatter, "high"),
        }
    }
}

/// Immutable description of what the user asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDescriptor {
    /// Requested action
    pub action: Action,
    /// Target path, relative to the project root unless absolute
    pub target: PathBuf,
    /// Free-text goal
    pub goal: String,
    /// Constraints in order of appearance
    pub constraints: Vec<String>,
    /// Inferred priority
    pub priority: Priority,
}
