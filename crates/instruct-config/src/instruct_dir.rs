//! Discovery and management of the `.instruct/` directory.
//!
//! The `.instruct/` directory marks the root of a project that keeps
//! decision tables. It is found by walking up from the working directory.

use std::path::{Path, PathBuf};

use crate::config::ConfigError;

/// The name of the project metadata directory.
pub const INSTRUCT_DIR_NAME: &str = ".instruct";

/// Environment variable that overrides discovery.
pub const INSTRUCT_DIR_ENV: &str = "INSTRUCT_DIR";

/// Walk up the directory tree from `start` looking for `.instruct/`.
///
/// The `INSTRUCT_DIR` environment variable, when it names an existing
/// directory, takes priority.
pub fn find_instruct_dir(start: &Path) -> Option<PathBuf> {
    if let Ok(env_dir) = std::env::var(INSTRUCT_DIR_ENV) {
        let env_path = PathBuf::from(env_dir);
        if env_path.is_dir() {
            return Some(env_path);
        }
    }
    find_instruct_dir_from(start)
}

/// The walk-up half of [`find_instruct_dir`], ignoring the environment.
pub fn find_instruct_dir_from(start: &Path) -> Option<PathBuf> {
    let start = start.canonicalize().ok()?;
    start
        .ancestors()
        .map(|dir| dir.join(INSTRUCT_DIR_NAME))
        .find(|candidate| candidate.is_dir())
}

/// Ensure `.instruct/` exists under `path` (or at `path` if it already ends
/// in `.instruct`) and return it.
pub fn ensure_instruct_dir(path: &Path) -> Result<PathBuf, ConfigError> {
    let dir = if path.ends_with(INSTRUCT_DIR_NAME) {
        path.to_path_buf()
    } else {
        path.join(INSTRUCT_DIR_NAME)
    };
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// The project root a `.instruct/` directory belongs to.
pub fn project_root(instruct_dir: &Path) -> PathBuf {
    instruct_dir
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| instruct_dir.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_dir_from_nested_child() {
        let dir = tempfile::tempdir().unwrap();
        let instruct = ensure_instruct_dir(dir.path()).unwrap();
        let child = dir.path().join("rules").join("archive");
        std::fs::create_dir_all(&child).unwrap();

        let found = find_instruct_dir_from(&child).unwrap();
        assert_eq!(found, instruct.canonicalize().unwrap());
        assert_eq!(
            project_root(&found),
            dir.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn ensure_is_idempotent_and_accepts_the_dir_itself() {
        let dir = tempfile::tempdir().unwrap();
        let first = ensure_instruct_dir(dir.path()).unwrap();
        let second = ensure_instruct_dir(&first).unwrap();
        assert_eq!(first, second);
        assert!(first.is_dir());
    }

    #[test]
    fn missing_start_dir_finds_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_instruct_dir_from(&dir.path().join("gone")).is_none());
    }
}
