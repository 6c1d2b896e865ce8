use std::fs::File;
use std::io::{Read as _, Result as IoResult};
use std::path::Path;
use std::str;

use walkdir::DirEntry;

/// Directories ignored during project scan.
pub const IGNORED_DIRS: &[&str] = &[
    "target",
    "node_modules",
    "dist",
    "build",
    "__pycache__",
    "venv",
    ".venv",
    ".git",
    ".idea",
    ".vscode",
    ".mypy_cache",
    ".pytest_cache",
];

/// File names worth excerpting regardless of extension.
const DOC_FILE_NAMES: &[&str] = &["Cargo.toml", "package.json", "pyproject.toml"];

/// Extensions of documentation files worth excerpting.
const DOC_EXTENSIONS: &[&str] = &["md", "txt", "rst"];

/// Check if a directory entry should be ignored
pub fn is_ignored(entry: &DirEntry) -> bool {
    // Don't filter the root directory itself (depth 0)
    if entry.depth() == 0 {
        return false;
    }

    let file_name = entry.file_name().to_string_lossy();

    if file_name.starts_with('.') {
        return true;
    }

    entry.file_type().is_dir() && IGNORED_DIRS.contains(&file_name.as_ref())
}

/// Whether a file is documentation or a project manifest.
pub fn is_doc_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
        return false;
    };

    if DOC_FILE_NAMES.contains(&name) || name.to_ascii_uppercase().starts_with("README") {
        return true;
    }

    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            DOC_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
}

/// Reads at most `max_bytes` of text from the start of `path`.
///
/// Returns `Ok(None)` for empty or binary files. A multi-byte character cut by
/// the byte budget is dropped.
///
/// # Errors
/// Returns an error if the file cannot be opened or read.
pub fn read_excerpt(path: &Path, max_bytes: usize) -> IoResult<Option<String>> {
    let mut buffer = Vec::with_capacity(max_bytes);
    File::open(path)?
        .take(max_bytes as u64)
        .read_to_end(&mut buffer)?;

    if buffer.contains(&0) {
        return Ok(None);
    }

    let text = match str::from_utf8(&buffer) {
        Ok(text) => text,
        Err(error) if error.error_len().is_none() => {
            str::from_utf8(&buffer[..error.valid_up_to()]).unwrap_or_default()
        }
        Err(_) => return Ok(None),
    };

    let trimmed = text.trim();
    Ok((!trimmed.is_empty()).then(|| trimmed.to_owned()))
}
