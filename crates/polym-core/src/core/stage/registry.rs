use super::{StageDir, StageError};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// Bookkeeping for the stage directories created within one logical scope.
///
/// Every directory a scope creates is recorded here, and [`sweep`] disposes
/// of all of them in one step: removal when intermediates are discarded,
/// retention when they are kept. Cleanup is driven by this record rather than
/// by directory-name patterns, so a scope can only ever delete what it
/// created itself.
///
/// [`sweep`]: StageRegistry::sweep
#[derive(Debug)]
pub struct StageRegistry {
    keep: bool,
    tracked: Vec<PathBuf>,
}

impl StageRegistry {
    pub fn new(keep: bool) -> Self {
        Self {
            keep,
            tracked: Vec::new(),
        }
    }

    /// Records a stage directory for disposal at the next sweep.
    pub fn track(&mut self, stage: &StageDir) {
        self.tracked.push(stage.path().to_path_buf());
    }

    /// Disposes of every tracked directory and clears the record.
    ///
    /// With `keep` set the directories are retained on disk; otherwise each
    /// is removed recursively (a step directory may still contain
    /// perturbation stages from an exhausted attempt run).
    pub fn sweep(&mut self) -> Result<(), StageError> {
        let tracked = std::mem::take(&mut self.tracked);
        if self.keep {
            debug!(count = tracked.len(), "Retaining intermediate stage directories.");
            return Ok(());
        }
        for path in tracked {
            if path.exists() {
                fs::remove_dir_all(&path).map_err(|source| StageError::Remove {
                    path: path.clone(),
                    source,
                })?;
                debug!(stage = %path.display(), "Removed stage directory.");
            }
        }
        Ok(())
    }

    #[cfg(test)]
    fn tracked_count(&self) -> usize {
        self.tracked.len()
    }
}
