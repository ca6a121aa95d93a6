use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

use super::error::{ClipError, Result};

/// Outcome of removing a directory tree. Removal problems never abort a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Removal {
    Deleted,
    NotFound,
    Failed(String),
}

/// The working directory videos are downloaded into and the directory clips are written to
#[derive(Debug, Clone)]
pub struct Workspace {
    temp_dir: PathBuf,
    output_dir: PathBuf,
}

impl Workspace {
    pub fn new(temp_dir: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            temp_dir,
            output_dir,
        }
    }

    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Create both directories if they are missing
    pub fn ensure(&self) -> Result<()> {
        ensure_directories(&[&self.temp_dir, &self.output_dir])
    }

    /// Remove the working directory and the downloaded video inside it
    pub fn cleanup(&self) -> Removal {
        delete_tree(&self.temp_dir)
    }
}

/// Create each path along with missing ancestors
pub fn ensure_directories(paths: &[&Path]) -> Result<()> {
    for path in paths {
        if !path.exists() {
            debug!("Creating directory {}", path.display());
        }
        fs::create_dir_all(path).map_err(|e| ClipError::filesystem(*path, e))?;
    }
    Ok(())
}

/// Remove `path` and everything below it
pub fn delete_tree(path: &Path) -> Removal {
    if !path.exists() {
        return Removal::NotFound;
    }

    match fs::remove_dir_all(path) {
        Ok(()) => Removal::Deleted,
        Err(e) => {
            warn!("Failed to delete {}: {}", path.display(), e);
            Removal::Failed(e.to_string())
        }
    }
}
