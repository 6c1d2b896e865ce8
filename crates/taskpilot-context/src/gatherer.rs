//! Read-only directory scanning that produces a `ContextSnapshot`.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use taskpilot_core::{ContextConfig, ContextSnapshot, ContextSource, Error, Result};
use walkdir::WalkDir;

use crate::fs_utils::{is_doc_file, is_ignored, read_excerpt};

/// Scans a target directory within a depth and file budget.
#[derive(Debug, Clone)]
pub struct ContextGatherer {
    /// Maximum directory depth below the target
    max_depth: usize,
    /// Maximum number of files listed
    max_files: usize,
    /// Maximum number of documentation excerpts
    max_excerpts: usize,
    /// Maximum bytes per excerpt
    excerpt_bytes: usize,
}

impl Default for ContextGatherer {
    fn default() -> Self {
        Self::from_config(&ContextConfig::default())
    }
}

impl ContextGatherer {
    /// Create a gatherer with the given scan budget.
    #[must_use]
    pub fn from_config(config: &ContextConfig) -> Self {
        Self {
            max_depth: config.max_depth,
            max_files: config.max_files,
            max_excerpts: config.max_excerpts,
            excerpt_bytes: config.excerpt_bytes,
        }
    }

    /// Override the maximum directory depth.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Override the maximum number of files listed.
    #[must_use]
    pub fn with_max_files(mut self, max_files: usize) -> Self {
        self.max_files = max_files;
        self
    }

    /// Override the excerpt budget; zero excerpts disables reading file contents.
    #[must_use]
    pub fn with_excerpts(mut self, max_excerpts: usize, excerpt_bytes: usize) -> Self {
        self.max_excerpts = max_excerpts;
        self.excerpt_bytes = excerpt_bytes;
        self
    }

    /// Classifies `target`, failing when it is missing or unreadable.
    fn check_root(target: &Path) -> Result<RootKind> {
        let metadata = fs::metadata(target).map_err(|error| root_error(target, error.kind()))?;
        if metadata.is_file() {
            fs::File::open(target).map_err(|error| root_error(target, error.kind()))?;
            return Ok(RootKind::File);
        }
        if !metadata.is_dir() {
            return Err(Error::NotADirectory(target.to_path_buf()));
        }
        fs::read_dir(target).map_err(|error| root_error(target, error.kind()))?;
        Ok(RootKind::Directory)
    }

    /// Snapshot of a single file, rooted at its parent directory.
    ///
    /// The file itself is excerpted regardless of its type.
    fn gather_file(&self, target: &Path) -> Result<ContextSnapshot> {
        let (Some(parent), Some(name)) = (target.parent(), target.file_name()) else {
            return Err(Error::NotADirectory(target.to_path_buf()));
        };
        let parent = if parent.as_os_str().is_empty() {
            Path::new(".")
        } else {
            parent
        };

        let mut snapshot = ContextSnapshot::new(parent);
        let relative = PathBuf::from(name);

        if self.max_excerpts > 0 {
            match read_excerpt(target, self.excerpt_bytes) {
                Ok(Some(text)) => {
                    snapshot.excerpts.insert(relative.clone(), text);
                }
                Ok(None) => {}
                Err(error) => {
                    tracing::warn!("Could not read {}: {error}", target.display());
                    snapshot.inaccessible.push(relative.clone());
                }
            }
        }
        snapshot.file_list.push(relative);

        tracing::info!(
            "Gathered context for file {} under {}",
            target.display(),
            parent.display()
        );

        Ok(snapshot)
    }
}

/// What a scan target turned out to be.
enum RootKind {
    /// A regular file
    File,
    /// A readable directory
    Directory,
}

/// Maps an I/O failure on the scan root to the pipeline error taxonomy.
fn root_error(target: &Path, kind: ErrorKind) -> Error {
    match kind {
        ErrorKind::NotFound => Error::PathNotFound(target.to_path_buf()),
        ErrorKind::PermissionDenied => Error::PermissionDenied(target.to_path_buf()),
        other => Error::Io(other.into()),
    }
}

/// Path of `path` relative to `root`, or `path` itself when it lies elsewhere.
fn relative_to(root: &Path, path: &Path) -> PathBuf {
    path.strip_prefix(root)
        .map_or_else(|_| path.to_path_buf(), Path::to_path_buf)
}

impl ContextSource for ContextGatherer {
    fn gather(&self, target: &Path) -> Result<ContextSnapshot> {
        if matches!(Self::check_root(target)?, RootKind::File) {
            return self.gather_file(target);
        }

        let mut snapshot = ContextSnapshot::new(target);

        let walker = WalkDir::new(target)
            .max_depth(self.max_depth)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !is_ignored(entry));

        for item in walker {
            let entry = match item {
                Ok(entry) => entry,
                Err(error) => {
                    let path = error
                        .path()
                        .map_or_else(|| target.to_path_buf(), Path::to_path_buf);
                    tracing::warn!("Skipping unreadable path {}: {error}", path.display());
                    snapshot.inaccessible.push(relative_to(target, &path));
                    continue;
                }
            };

            if entry.depth() == 0 {
                continue;
            }

            let relative = relative_to(target, entry.path());

            if entry.file_type().is_dir() {
                snapshot.directories.insert(relative);
                continue;
            }

            if snapshot.file_list.len() >= self.max_files {
                tracing::debug!(
                    "File budget of {} reached, truncating scan of {}",
                    self.max_files,
                    target.display()
                );
                snapshot.truncated = true;
                break;
            }

            if snapshot.excerpts.len() < self.max_excerpts && is_doc_file(entry.path()) {
                match read_excerpt(entry.path(), self.excerpt_bytes) {
                    Ok(Some(text)) => {
                        snapshot.excerpts.insert(relative.clone(), text);
                    }
                    Ok(None) => {}
                    Err(error) => {
                        tracing::warn!("Could not read {}: {error}", entry.path().display());
                        snapshot.inaccessible.push(relative.clone());
                    }
                }
            }

            snapshot.file_list.push(relative);
        }

        tracing::info!(
            "Gathered context for {}: {} files, {} directories, {} excerpts, {} inaccessible",
            target.display(),
            snapshot.file_count(),
            snapshot.directory_count(),
            snapshot.excerpts.len(),
            snapshot.inaccessible.len()
        );

        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent");
        }
        fs::write(path, content).expect("write file");
    }

    #[test]
    fn test_missing_root_is_path_not_found() {
        let temp = TempDir::new().expect("temp dir");
        let missing = temp.path().join("nope");
        let result = ContextGatherer::default().gather(&missing);
        assert!(matches!(result, Err(Error::PathNotFound(path)) if path == missing));
    }

    #[test]
    fn test_file_root_is_rooted_at_parent() {
        let temp = TempDir::new().expect("temp dir");
        write(temp.path(), "src/parser.rs", "fn parse() {}");
        write(temp.path(), "src/other.rs", "");

        let snapshot = ContextGatherer::default()
            .gather(&temp.path().join("src/parser.rs"))
            .expect("gather file");

        assert_eq!(snapshot.target, temp.path().join("src"));
        assert_eq!(snapshot.file_list, vec![PathBuf::from("parser.rs")]);
        assert!(snapshot.directories.is_empty());
        assert_eq!(
            snapshot.excerpts.get(&PathBuf::from("parser.rs")).map(String::as_str),
            Some("fn parse() {}")
        );
    }

    #[test]
    fn test_respects_max_depth() {
        let temp = TempDir::new().expect("temp dir");
        write(temp.path(), "top.rs", "");
        write(temp.path(), "a/one.rs", "");
        write(temp.path(), "a/b/two.rs", "");

        let snapshot = ContextGatherer::default()
            .with_max_depth(2)
            .gather(temp.path())
            .expect("gather");

        assert_eq!(
            snapshot.file_list,
            vec![PathBuf::from("a/one.rs"), PathBuf::from("top.rs")]
        );
        assert!(snapshot.directories.contains(&PathBuf::from("a/b")));
    }

    #[test]
    fn test_file_budget_sets_truncated() {
        let temp = TempDir::new().expect("temp dir");
        for index in 0..5 {
            write(temp.path(), &format!("file{index}.rs"), "");
        }

        let snapshot = ContextGatherer::default()
            .with_max_files(3)
            .gather(temp.path())
            .expect("gather");

        assert_eq!(snapshot.file_count(), 3);
        assert!(snapshot.truncated);
    }

    #[test]
    fn test_excerpt_budget() {
        let temp = TempDir::new().expect("temp dir");
        write(temp.path(), "README.md", "# Title\nLong readme body");
        write(temp.path(), "docs/guide.md", "Guide");
        write(temp.path(), "src/main.rs", "fn main() {}");

        let snapshot = ContextGatherer::default()
            .with_excerpts(1, 7)
            .gather(temp.path())
            .expect("gather");

        assert_eq!(snapshot.excerpts.len(), 1);
        assert_eq!(
            snapshot.excerpts.get(&PathBuf::from("README.md")).map(String::as_str),
            Some("# Title")
        );
    }
}
