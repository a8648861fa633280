//! Path management for learnstack configuration files.

use std::path::PathBuf;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// The platform config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Resolves where learnstack keeps its files.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/learnstack/        # Config directory (platform dependent)
/// ├── config.toml              # Client configuration
/// └── history.txt              # REPL line history
/// ```
pub struct LearnstackPaths;

impl LearnstackPaths {
    const APP_DIR: &'static str = "learnstack";

    /// Returns the learnstack configuration directory.
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(Self::APP_DIR))
            .ok_or(PathError::ConfigDirNotFound)
    }

    /// Returns the path to `config.toml`.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the path to the REPL history file.
    pub fn history_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("history.txt"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_files_live_in_config_dir() {
        // Headless CI may have no config dir at all; only check consistency.
        if let Ok(dir) = LearnstackPaths::config_dir() {
            assert!(dir.ends_with("learnstack"));
            assert_eq!(LearnstackPaths::config_file().unwrap(), dir.join("config.toml"));
            assert_eq!(LearnstackPaths::history_file().unwrap(), dir.join("history.txt"));
        }
    }
}
