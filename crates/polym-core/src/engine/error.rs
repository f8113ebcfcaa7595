use crate::core::exec::ExecError;
use crate::core::stage::StageError;
use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Stage(#[from] StageError),

    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error("{tool} failed with unexpected {status}")]
    ToolFailed {
        tool: &'static str,
        status: ExitStatus,
    },

    #[error("{tool} did not produce '{path}'", path = path.display())]
    MissingArtifact {
        tool: &'static str,
        path: PathBuf,
    },

    #[error("Workspace bookkeeping failed for '{path}': {source}", path = path.display())]
    Workspace {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
