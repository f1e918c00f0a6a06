//! Discovers participant identities from a models directory.

use glob::{MatchOptions, PatternError};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] PatternError),
    #[error("Failed to read entry: {0}")]
    Entry(#[from] glob::GlobError),
    #[error("Models directory not found: {0}")]
    MissingDirectory(String),
}

/// Lists entry names under `dir` matching `pattern`, sorted by name.
///
/// Hidden entries are skipped unless the pattern names them explicitly.
/// An empty directory yields an empty list.
pub fn list_names(dir: &Path, pattern: &str) -> Result<Vec<String>, DiscoveryError> {
    if !dir.is_dir() {
        return Err(DiscoveryError::MissingDirectory(dir.display().to_string()));
    }

    let options = MatchOptions {
        require_literal_leading_dot: true,
        ..MatchOptions::new()
    };
    // Only the user's pattern is glob syntax; the directory is matched literally.
    let full = Path::new(&glob::Pattern::escape(&dir.to_string_lossy())).join(pattern);
    let mut names = Vec::new();
    for entry in glob::glob_with(&full.to_string_lossy(), options)? {
        let path = entry?;
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            names.push(name.to_string());
        }
    }
    names.sort();
    names.dedup();
    Ok(names)
}
