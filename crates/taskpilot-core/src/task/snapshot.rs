//! Read-only summary of a scanned directory

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// Snapshot of a target directory, built once by a context source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextSnapshot {
    /// Scanned root
    pub target: PathBuf,
    /// Files relative to `target`, in scan order
    pub file_list: Vec<PathBuf>,
    /// Directories relative to `target`
    pub directories: BTreeSet<PathBuf>,
    /// Short text samples keyed by relative path
    pub excerpts: BTreeMap<PathBuf, String>,
    /// Sub-paths that could not be read
    pub inaccessible: Vec<PathBuf>,
    /// Whether the file budget cut the scan short
    pub truncated: bool,
}

impl ContextSnapshot {
    /// Creates an empty snapshot for `target`.
    pub fn new(target: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
            ..Self::default()
        }
    }

    /// Number of files found.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.file_list.len()
    }

    /// Number of directories found.
    #[must_use]
    pub fn directory_count(&self) -> usize {
        self.directories.len()
    }

    /// Plain-text summary embedded in planning prompts.
    ///
    /// Lists counts, up to `max_paths` file paths and every excerpt.
    #[must_use]
    pub fn summary(&self, max_paths: usize) -> String {
        let mut lines = vec![format!(
            "{} files in {} directories under {}",
            self.file_count(),
            self.directory_count(),
            self.target.display()
        )];
        if self.truncated {
            lines.push("(listing truncated by scan budget)".to_owned());
        }

        if !self.directories.is_empty() {
            let dirs = self
                .directories
                .iter()
                .map(|dir| dir.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            lines.push(format!("Directories: {dirs}"));
        }

        if !self.file_list.is_empty() {
            lines.push("Key files:".to_owned());
            for path in self.file_list.iter().take(max_paths) {
                lines.push(format!("- {}", path.display()));
            }
            let remaining = self.file_list.len().saturating_sub(max_paths);
            if remaining > 0 {
                lines.push(format!("- ... and {remaining} more"));
            }
        }

        for (path, excerpt) in &self.excerpts {
            lines.push(format!("Excerpt from {}:\n{excerpt}", path.display()));
        }

        if !self.inaccessible.is_empty() {
            lines.push(format!("{} paths were not readable", self.inaccessible.len()));
        }

        lines.join("\n")
    }
}
