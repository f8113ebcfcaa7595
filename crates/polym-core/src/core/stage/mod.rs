//! Isolated stage directories for polymerization steps and simulation passes.
//!
//! Each bond attempt, perturbation pass, and equilibration runs inside its own
//! directory, created fresh and never reused: a name collision is always an
//! error, since a pre-existing stage implies a dirty workspace from an earlier
//! crash or a concurrent run. Inputs are copied in under canonical names and
//! outputs are copied back out to the parent scope before the directory is
//! handed to the [`StageRegistry`] for cleanup.

mod registry;

pub use registry::StageRegistry;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StageError {
    #[error("Stage directory '{path}' already exists", path = path.display())]
    Collision { path: PathBuf },

    #[error("Failed to create stage directory '{path}': {source}", path = path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to stage '{source_path}' as '{name}': {source}", source_path = source_path.display())]
    StageIn {
        source_path: PathBuf,
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("Cannot stage '{path}': not a file name", path = path.display())]
    InvalidSource { path: PathBuf },

    #[error("Failed to propagate '{name}' to '{dest}': {source}", dest = dest.display())]
    Propagate {
        name: String,
        dest: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to remove stage directory '{path}': {source}", path = path.display())]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Directory name for the bond step with the given index.
pub fn step_name(bond: u32) -> String {
    format!("step_{:03}", bond)
}

/// Directory name for the equilibration stage tied to a bond step.
pub fn cycle_md_name(bond: u32) -> String {
    format!("step_{:03}_md", bond)
}

/// Directory name for the perturbation pass with the given attempt index.
pub fn perturbation_name(attempt: u32) -> String {
    format!("md_{:03}", attempt)
}

/// An isolated working directory for one step, attempt, or simulation pass.
///
/// The directory is created by [`StageDir::create`] and owned by exactly one
/// logical operation; removal is the job of the [`StageRegistry`] the caller
/// tracked it with.
#[derive(Debug)]
pub struct StageDir {
    path: PathBuf,
}

impl StageDir {
    /// Creates the stage directory `parent/name`.
    ///
    /// Fails with [`StageError::Collision`] if the path already exists; a
    /// stale stage is never silently reused or merged.
    pub fn create(parent: &Path, name: &str) -> Result<Self, StageError> {
        let path = parent.join(name);
        if path.exists() {
            return Err(StageError::Collision { path });
        }
        fs::create_dir(&path).map_err(|source| StageError::Create {
            path: path.clone(),
            source,
        })?;
        debug!(stage = %path.display(), "Created stage directory.");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the artifact `name` inside this stage.
    pub fn file(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }

    pub fn has_file(&self, name: &str) -> bool {
        self.file(name).is_file()
    }

    /// Copies `source` into the stage under the canonical artifact name
    /// `name`, returning the staged path.
    pub fn stage_as(&self, source: &Path, name: &str) -> Result<PathBuf, StageError> {
        let dest = self.file(name);
        fs::copy(source, &dest).map_err(|e| StageError::StageIn {
            source_path: source.to_path_buf(),
            name: name.to_string(),
            source: e,
        })?;
        debug!(from = %source.display(), as_name = name, "Staged input artifact.");
        Ok(dest)
    }

    /// Copies `source` into the stage keeping its own file name, returning
    /// that name. Used for engine instruction scripts, which the engine is
    /// pointed at by bare name from inside the stage.
    pub fn stage_keeping_name(&self, source: &Path) -> Result<String, StageError> {
        let name = source
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| StageError::InvalidSource {
                path: source.to_path_buf(),
            })?
            .to_string();
        self.stage_as(source, &name)?;
        Ok(name)
    }

    /// Copies the stage artifact `name` out to `dest`, overwriting any
    /// previous version of the destination file.
    pub fn propagate(&self, name: &str, dest: &Path) -> Result<(), StageError> {
        fs::copy(self.file(name), dest).map_err(|e| StageError::Propagate {
            name: name.to_string(),
            dest: dest.to_path_buf(),
            source: e,
        })?;
        debug!(artifact = name, to = %dest.display(), "Propagated output artifact.");
        Ok(())
    }
}
