use std::path::{Path, PathBuf};

use glob::glob;
use walkdir::WalkDir;

use super::LoaderError;

/// Expands the glob patterns into a sorted, de-duplicated list of files.
/// Matched directories are walked recursively.
pub(super) fn resolve_input_to_files(patterns: &[String]) -> Result<Vec<PathBuf>, LoaderError> {
    let mut files = Vec::new();

    for pattern in patterns {
        for entry in glob(pattern)? {
            let path = entry.map_err(|e| LoaderError::Io(e.into()))?;
            if path.is_dir() {
                for entry in WalkDir::new(&path) {
                    let entry = entry?;
                    if entry.file_type().is_file() {
                        files.push(entry.path().to_path_buf());
                    }
                }
            } else if path.is_file() {
                files.push(path);
            }
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

pub(super) fn parse_file(file_path: &Path) -> Result<String, LoaderError> {
    Ok(std::fs::read_to_string(file_path)?)
}
