//! Sequential phase execution with dry-run support.
//!
//! Each phase is mapped by keyword to a local action: moving a file, creating
//! a directory, or nothing beyond recording its description. Operands must be
//! quoted or look like paths, so prose such as "organize files into folders"
//! stays a description-only step. A failed phase is recorded and the next
//! phase still runs.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use regex::{Captures, Regex};
use taskpilot_core::{Error, ExecutionOutcome, ExecutionPlan, Phase};

/// Quoted operand or a bare token
const OPERAND: &str = r#"(`[^`]+`|"[^"]+"|'[^']+'|\S+)"#;

static MOVE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        r"(?i)\b(?:move|relocate|organi[sz]e)\s+(?:the\s+)?(?:file\s+|directory\s+|folder\s+)?{OPERAND}\s+(?:to|into|->|→)\s+{OPERAND}"
    );
    match Regex::new(&pattern) {
        Ok(regex) => regex,
        Err(err) => panic!("Move regex is invalid: {err}"),
    }
});

static ARROW_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(r"{OPERAND}\s*(?:->|→)\s*{OPERAND}");
    match Regex::new(&pattern) {
        Ok(regex) => regex,
        Err(err) => panic!("Arrow regex is invalid: {err}"),
    }
});

static MOVE_KEYWORD_REGEX: LazyLock<Regex> =
    LazyLock::new(|| match Regex::new(r"(?i)\b(?:move|relocate|organi[sz]e)") {
        Ok(regex) => regex,
        Err(err) => panic!("Move keyword regex is invalid: {err}"),
    });

static MKDIR_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        r"(?i)\b(?:create\s+(?:an?\s+|the\s+)?(?:new\s+)?(?:directory|folder|dir)|mkdir|make\s+(?:a\s+)?directory)\s+(?:called\s+|named\s+)?{OPERAND}"
    );
    match Regex::new(&pattern) {
        Ok(regex) => regex,
        Err(err) => panic!("Mkdir regex is invalid: {err}"),
    }
});

/// Local side effect a phase maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhaseAction {
    /// Move `from` to `to`, both relative to the root
    Move {
        /// Source path
        from: String,
        /// Destination path; an existing directory means "move into it"
        to: String,
    },
    /// Create a directory, relative to the root
    CreateDir {
        /// Directory path
        path: String,
    },
    /// No local effect
    Describe,
}

impl PhaseAction {
    /// Maps a phase to its local action, checking the description before the name.
    pub fn classify(phase: &Phase) -> Self {
        Self::from_text(&phase.description)
            .or_else(|| Self::from_text(&phase.name))
            .unwrap_or(Self::Describe)
    }

    fn from_text(text: &str) -> Option<Self> {
        let direct = MOVE_REGEX.captures(text).and_then(|captures| operand_pair(&captures));
        let arrow = || {
            MOVE_KEYWORD_REGEX
                .is_match(text)
                .then(|| ARROW_REGEX.captures(text))
                .flatten()
                .and_then(|captures| operand_pair(&captures))
        };
        if let Some((from, to)) = direct.or_else(arrow) {
            return Some(Self::Move { from, to });
        }

        MKDIR_REGEX
            .captures(text)
            .and_then(|captures| captures.get(1).and_then(|raw| operand(raw.as_str())))
            .map(|path| Self::CreateDir { path })
    }
}

fn operand_pair(captures: &Captures<'_>) -> Option<(String, String)> {
    let from = operand(captures.get(1)?.as_str())?;
    let to = operand(captures.get(2)?.as_str())?;
    Some((from, to))
}

/// Unquotes an operand; bare tokens only count when they look like paths.
fn operand(raw: &str) -> Option<String> {
    for quote in ['`', '"', '\''] {
        if let Some(inner) = raw
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            let inner = inner.trim();
            return (!inner.is_empty()).then(|| inner.to_owned());
        }
    }

    let bare = raw.trim_end_matches([',', '.', ';', ':', ')']);
    let path_like = bare.contains('/') || bare.contains('\\') || bare.contains('.');
    (path_like && !bare.is_empty()).then(|| bare.to_owned())
}

/// Resolves `relative` under `root`, refusing anything that would leave it.
fn confine(root: &Path, relative: &str) -> Result<PathBuf, String> {
    let path = Path::new(relative);
    let escapes = path.components().any(|component| {
        matches!(
            component,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    });
    if escapes {
        return Err(format!("path '{relative}' is outside the target directory"));
    }
    Ok(root.join(path))
}

/// Runs a plan's phases in order against a root directory.
#[derive(Debug, Clone)]
pub struct PhaseExecutor {
    /// Directory every phase path is resolved against
    root: PathBuf,
}

impl PhaseExecutor {
    /// Create an executor rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of this executor.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Executes every phase in order, updating statuses in place.
    ///
    /// With `dry_run` no filesystem mutation happens and every phase completes
    /// with a description of what it would do. Phases that already finished
    /// are not run again.
    pub fn execute(&self, plan: &mut ExecutionPlan, dry_run: bool) -> ExecutionOutcome {
        let mut outcome = ExecutionOutcome::default();
        let total = plan.phases.len();

        for (index, phase) in plan.phases.iter_mut().enumerate() {
            if phase.status.is_terminal() {
                tracing::debug!("Phase '{}' already {}, skipping", phase.name, phase.status);
                continue;
            }
            phase.start();
            let action = PhaseAction::classify(phase);
            tracing::info!(
                "Phase {}/{total} '{}' started ({action:?}, dry_run={dry_run})",
                index + 1,
                phase.name
            );

            let result = if dry_run {
                Ok(Self::describe(&action, phase))
            } else {
                self.apply(&action, phase)
            };

            match result {
                Ok(output) => {
                    tracing::debug!("Phase '{}' completed: {output}", phase.name);
                    phase.complete(output);
                }
                Err(reason) => {
                    let error = Error::PhaseExecution {
                        phase: phase.name.clone(),
                        reason,
                    }
                    .to_string();
                    tracing::warn!("{error}");
                    outcome.errors.push(error.clone());
                    phase.fail(error);
                }
            }

            outcome.completed_phases.push(phase.clone());
        }

        outcome
    }

    /// What a phase would do, without doing it.
    fn describe(action: &PhaseAction, phase: &Phase) -> String {
        match action {
            PhaseAction::Move { from, to } => format!("Would move {from} to {to}"),
            PhaseAction::CreateDir { path } => format!("Would create directory {path}"),
            PhaseAction::Describe => format!("Would perform: {}", phase.description),
        }
    }

    fn apply(&self, action: &PhaseAction, phase: &Phase) -> Result<String, String> {
        match action {
            PhaseAction::Move { from, to } => self.move_path(from, to),
            PhaseAction::CreateDir { path } => self.create_dir(path),
            PhaseAction::Describe => Ok(format!("No local action required: {}", phase.description)),
        }
    }

    fn move_path(&self, from: &str, to: &str) -> Result<String, String> {
        let source = confine(&self.root, from)?;
        let mut destination = confine(&self.root, to)?;

        if fs::symlink_metadata(&source).is_err() {
            return Err(format!("source '{from}' does not exist"));
        }

        let into_directory = destination.is_dir() || to.ends_with('/') || to.ends_with('\\');
        if into_directory {
            fs::create_dir_all(&destination)
                .map_err(|err| format!("cannot create '{to}': {err}"))?;
            let Some(file_name) = source.file_name() else {
                return Err(format!("source '{from}' has no file name"));
            };
            destination = destination.join(file_name);
        }

        if fs::symlink_metadata(&destination).is_ok() {
            return Err(format!(
                "destination '{}' already exists",
                relative_display(&self.root, &destination)
            ));
        }

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)
                .map_err(|err| format!("cannot create parent of '{to}': {err}"))?;
        }

        fs::rename(&source, &destination)
            .map_err(|err| format!("cannot move '{from}' to '{to}': {err}"))?;

        Ok(format!(
            "Moved {from} to {}",
            relative_display(&self.root, &destination)
        ))
    }

    fn create_dir(&self, relative: &str) -> Result<String, String> {
        let path = confine(&self.root, relative)?;
        if path.is_dir() {
            return Ok(format!("Directory {relative} already exists"));
        }
        if path.exists() {
            return Err(format!("'{relative}' exists and is not a directory"));
        }
        fs::create_dir_all(&path).map_err(|err| format!("cannot create '{relative}': {err}"))?;
        Ok(format!("Created directory {relative}"))
    }
}

fn relative_display(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskpilot_core::{PhaseStatus, PlanSource};
    use tempfile::TempDir;

    fn plan(phases: &[(&str, &str)]) -> ExecutionPlan {
        ExecutionPlan::new(
            phases
                .iter()
                .map(|(name, description)| Phase::new(*name, *description))
                .collect(),
            PlanSource::RuleBased,
        )
    }

    #[test]
    fn test_classify_move_and_mkdir() {
        let cases = [
            (
                "Move `main.py` to `src/main.py`",
                PhaseAction::Move {
                    from: "main.py".to_owned(),
                    to: "src/main.py".to_owned(),
                },
            ),
            (
                "Organize notes.txt into docs/",
                PhaseAction::Move {
                    from: "notes.txt".to_owned(),
                    to: "docs/".to_owned(),
                },
            ),
            (
                "Relocate: \"a b.txt\" -> \"archive/a b.txt\"",
                PhaseAction::Move {
                    from: "a b.txt".to_owned(),
                    to: "archive/a b.txt".to_owned(),
                },
            ),
            (
                "Create a new directory named `docs`",
                PhaseAction::CreateDir {
                    path: "docs".to_owned(),
                },
            ),
            ("mkdir build/out", PhaseAction::CreateDir {
                path: "build/out".to_owned(),
            }),
            ("Organize files into directories", PhaseAction::Describe),
            ("Review the code", PhaseAction::Describe),
        ];
        for (description, expected) in cases {
            let phase = Phase::new("Step", description);
            assert_eq!(PhaseAction::classify(&phase), expected, "{description}");
        }
    }

    #[test]
    fn test_classify_falls_back_to_name() {
        let phase = Phase::new("Create directory `docs`", "Set up documentation");
        assert_eq!(
            PhaseAction::classify(&phase),
            PhaseAction::CreateDir {
                path: "docs".to_owned()
            }
        );
    }

    #[test]
    fn test_confine_rejects_escapes() {
        let root = Path::new("/work");
        assert!(confine(root, "../etc").is_err());
        assert!(confine(root, "/etc/passwd").is_err());
        assert!(confine(root, "a/../../b").is_err());
        assert_eq!(confine(root, "src/a.rs"), Ok(PathBuf::from("/work/src/a.rs")));
    }

    #[test]
    fn test_dry_run_describes_without_mutation() {
        let temp = TempDir::new().expect("temp dir");
        fs::write(temp.path().join("a.txt"), "a").expect("write");
        let mut plan = plan(&[
            ("Move", "Move `a.txt` to `docs/a.txt`"),
            ("Create", "Create directory `build`"),
            ("Review", "Review the layout"),
        ]);

        let outcome = PhaseExecutor::new(temp.path()).execute(&mut plan, true);

        assert!(outcome.errors.is_empty());
        let outputs: Vec<&str> = outcome
            .completed_phases
            .iter()
            .filter_map(|phase| phase.output.as_deref())
            .collect();
        assert_eq!(
            outputs,
            [
                "Would move a.txt to docs/a.txt",
                "Would create directory build",
                "Would perform: Review the layout",
            ]
        );
        assert!(temp.path().join("a.txt").exists());
        assert!(!temp.path().join("docs").exists());
        assert!(!temp.path().join("build").exists());
        assert!(
            plan.phases
                .iter()
                .all(|phase| phase.status == PhaseStatus::Completed)
        );
    }

    #[test]
    fn test_real_run_moves_and_creates() {
        let temp = TempDir::new().expect("temp dir");
        fs::write(temp.path().join("a.txt"), "a").expect("write");
        fs::write(temp.path().join("b.txt"), "b").expect("write");
        let mut plan = plan(&[
            ("Create", "Create directory `docs`"),
            ("Move a", "Move `a.txt` to `docs/`"),
            ("Move b", "Move `b.txt` to `notes/b.md`"),
            ("Create again", "Create directory `docs`"),
        ]);

        let outcome = PhaseExecutor::new(temp.path()).execute(&mut plan, false);

        assert!(outcome.errors.is_empty(), "{:?}", outcome.errors);
        assert!(temp.path().join("docs/a.txt").is_file());
        assert!(temp.path().join("notes/b.md").is_file());
        assert!(!temp.path().join("a.txt").exists());
        assert_eq!(
            plan.phases[1].output.as_deref(),
            Some("Moved a.txt to docs/a.txt")
        );
        assert_eq!(
            plan.phases[3].output.as_deref(),
            Some("Directory docs already exists")
        );
    }

    #[test]
    fn test_failure_does_not_stop_later_phases() {
        let temp = TempDir::new().expect("temp dir");
        let mut plan = plan(&[
            ("Move", "Move `missing.txt` to `docs/missing.txt`"),
            ("Create", "Create directory `docs`"),
        ]);

        let outcome = PhaseExecutor::new(temp.path()).execute(&mut plan, false);

        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].starts_with("Phase 'Move' failed: source 'missing.txt'"));
        assert_eq!(plan.phases[0].status, PhaseStatus::Failed);
        assert_eq!(plan.phases[1].status, PhaseStatus::Completed);
        assert!(temp.path().join("docs").is_dir());
        assert_eq!(outcome.completed_phases.len(), 2);
    }

    #[test]
    fn test_move_refuses_overwrite_and_escape() {
        let temp = TempDir::new().expect("temp dir");
        fs::write(temp.path().join("a.txt"), "a").expect("write");
        fs::write(temp.path().join("b.txt"), "b").expect("write");
        let mut plan = plan(&[
            ("Overwrite", "Move `a.txt` to `b.txt`"),
            ("Escape", "Move `a.txt` to `../a.txt`"),
        ]);

        let outcome = PhaseExecutor::new(temp.path()).execute(&mut plan, false);

        assert_eq!(outcome.errors.len(), 2);
        assert_eq!(
            fs::read_to_string(temp.path().join("b.txt")).expect("read"),
            "b"
        );
        assert!(temp.path().join("a.txt").exists());
    }

    #[test]
    fn test_finished_phases_are_not_rerun() {
        let temp = TempDir::new().expect("temp dir");
        fs::write(temp.path().join("a.txt"), "a").expect("write");
        let mut plan = plan(&[
            ("Move", "Move `a.txt` to `docs/a.txt`"),
            ("Create", "Create directory `build`"),
        ]);
        let executor = PhaseExecutor::new(temp.path());
        assert_eq!(executor.root(), temp.path());

        let first = executor.execute(&mut plan, false);
        assert!(first.errors.is_empty(), "{:?}", first.errors);

        let second = executor.execute(&mut plan, false);
        assert!(second.completed_phases.is_empty());
        assert!(second.errors.is_empty());
        assert_eq!(
            plan.phases[0].output.as_deref(),
            Some("Moved a.txt to docs/a.txt")
        );
    }

    #[test]
    fn test_empty_plan() {
        let temp = TempDir::new().expect("temp dir");
        let mut plan = plan(&[]);
        let outcome = PhaseExecutor::new(temp.path()).execute(&mut plan, false);
        assert!(outcome.completed_phases.is_empty());
        assert!(outcome.errors.is_empty());
    }
}
