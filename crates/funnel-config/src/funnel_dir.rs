//! Discovery and management of the `.funnel/` directory.
//!
//! The `.funnel/` directory is the root of a funnel project's metadata. This
//! module provides functions to find it by walking up the directory tree,
//! and to create it when initializing a new project.

use crate::config::ConfigError;
use std::path::{Path, PathBuf};

/// The name of the funnel metadata directory.
const FUNNEL_DIR_NAME: &str = ".funnel";

/// The name of the environment variable that can override the funnel directory.
const FUNNEL_DIR_ENV: &str = "FUNNEL_DIR";

/// Walk up the directory tree from `start` looking for a `.funnel/` directory.
///
/// Returns the path to the `.funnel/` directory if found, or `None` if the
/// filesystem root is reached without finding one. The `FUNNEL_DIR`
/// environment variable is checked first (highest priority).
pub fn find_funnel_dir(start: &Path) -> Option<PathBuf> {
    // 1. Check FUNNEL_DIR environment variable (highest priority).
    if let Ok(env_dir) = std::env::var(FUNNEL_DIR_ENV) {
        let env_path = PathBuf::from(&env_dir);
        if env_path.is_dir() {
            return Some(env_path);
        }
    }

    // 2. Walk up from `start` looking for .funnel/.
    // Canonicalize the start path so we get absolute paths.
    let start = match start.canonicalize() {
        Ok(p) => p,
        Err(_) => return None,
    };

    let mut current = start.as_path();
    loop {
        let candidate = current.join(FUNNEL_DIR_NAME);
        if candidate.is_dir() {
            return Some(candidate);
        }

        match current.parent() {
            Some(parent) if parent != current => {
                current = parent;
            }
            _ => break, // Reached filesystem root.
        }
    }

    None
}

/// Walk up the directory tree looking for `.funnel/`, returning an error if
/// not found.
///
/// # Errors
///
/// Returns [`ConfigError::FunnelDirNotFound`] if no `.funnel/` directory is
/// found.
pub fn find_funnel_dir_or_error(start: &Path) -> Result<PathBuf, ConfigError> {
    find_funnel_dir(start).ok_or(ConfigError::FunnelDirNotFound)
}

/// Ensure a `.funnel/` directory exists at the given path.
///
/// If `path` itself is not called `.funnel`, the function creates a
/// `.funnel/` subdirectory under it. The directory (and any necessary
/// parents) is created if it does not exist.
///
/// Returns the path to the `.funnel/` directory.
///
/// # Errors
///
/// Returns [`ConfigError::ReadError`] if directory creation fails.
pub fn ensure_funnel_dir(path: &Path) -> Result<PathBuf, ConfigError> {
    let funnel_dir = if path.ends_with(FUNNEL_DIR_NAME) {
        path.to_path_buf()
    } else {
        path.join(FUNNEL_DIR_NAME)
    };

    std::fs::create_dir_all(&funnel_dir)?;
    Ok(funnel_dir)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_funnel_dir_in_temp() {
        let dir = tempfile::tempdir().unwrap();
        let funnel = dir.path().join(".funnel");
        std::fs::create_dir(&funnel).unwrap();

        let found = find_funnel_dir(dir.path());
        assert!(found.is_some());
        // Canonicalize both for comparison (handles symlinks, /tmp vs /private/tmp).
        let found = found.unwrap().canonicalize().unwrap();
        let expected = funnel.canonicalize().unwrap();
        assert_eq!(found, expected);
    }

    #[test]
    fn test_find_funnel_dir_in_child() {
        let dir = tempfile::tempdir().unwrap();
        let funnel = dir.path().join(".funnel");
        std::fs::create_dir(&funnel).unwrap();

        let child = dir.path().join("team").join("deep");
        std::fs::create_dir_all(&child).unwrap();

        let found = find_funnel_dir(&child);
        assert!(found.is_some());
        let found = found.unwrap().canonicalize().unwrap();
        let expected = funnel.canonicalize().unwrap();
        assert_eq!(found, expected);
    }

    #[test]
    fn test_find_funnel_dir_or_error() {
        let dir = tempfile::tempdir().unwrap();
        let funnel = dir.path().join(".funnel");
        std::fs::create_dir(&funnel).unwrap();

        let result = find_funnel_dir_or_error(dir.path());
        assert!(result.is_ok());
    }

    #[test]
    fn test_ensure_funnel_dir_creates() {
        let dir = tempfile::tempdir().unwrap();
        let result = ensure_funnel_dir(dir.path()).unwrap();
        assert!(result.is_dir());
        assert!(result.ends_with(".funnel"));
    }

    #[test]
    fn test_ensure_funnel_dir_already_named() {
        let dir = tempfile::tempdir().unwrap();
        let funnel = dir.path().join(".funnel");
        let result = ensure_funnel_dir(&funnel).unwrap();
        assert!(result.is_dir());
        assert_eq!(result, funnel);
    }

    #[test]
    fn test_ensure_funnel_dir_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let result1 = ensure_funnel_dir(dir.path()).unwrap();
        let result2 = ensure_funnel_dir(dir.path()).unwrap();
        assert_eq!(result1, result2);
    }
}
