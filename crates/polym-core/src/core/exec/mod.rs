//! Synchronous invocation of external executables.
//!
//! Tool command lines arrive from configuration as plain strings (e.g.
//! `"mpirun -np 8 lmp_mpi"`), are split on whitespace into a
//! [`CommandTemplate`], and are run to completion with per-invocation
//! arguments appended. The raw [`ExitStatus`] is returned untouched;
//! interpreting it into a typed outcome is the job of `engine::tools`.

use std::ffi::OsStr;
use std::fmt;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("Command template is empty")]
    EmptyTemplate,

    #[error("Failed to launch '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to open log file '{path}': {source}", path = path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A parsed external command line: program plus fixed leading arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    program: String,
    args: Vec<String>,
}

impl CommandTemplate {
    /// Splits a configured command line on whitespace.
    pub fn parse(line: &str) -> Result<Self, ExecError> {
        let mut parts = line.split_whitespace();
        let program = parts.next().ok_or(ExecError::EmptyTemplate)?.to_string();
        let args = parts.map(str::to_string).collect();
        Ok(Self { program, args })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Runs the command to completion in `dir` with `extra` arguments
    /// appended, inheriting the parent's standard streams.
    pub fn invoke_in<I, S>(&self, dir: &Path, extra: I) -> Result<ExitStatus, ExecError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        debug!(command = %self, dir = %dir.display(), "Invoking external tool.");
        self.command(dir, extra)
            .status()
            .map_err(|source| self.spawn_error(source))
    }

    /// Like [`invoke_in`], but with stdout redirected to `log` so a
    /// long-running tool does not interleave with controller output.
    ///
    /// [`invoke_in`]: CommandTemplate::invoke_in
    pub fn invoke_logged<I, S>(
        &self,
        dir: &Path,
        extra: I,
        log: &Path,
    ) -> Result<ExitStatus, ExecError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let file = File::create(log).map_err(|source| ExecError::LogFile {
            path: log.to_path_buf(),
            source,
        })?;
        debug!(command = %self, dir = %dir.display(), log = %log.display(), "Invoking external tool.");
        self.command(dir, extra)
            .stdout(Stdio::from(file))
            .status()
            .map_err(|source| self.spawn_error(source))
    }

    fn command<I, S>(&self, dir: &Path, extra: I) -> Command
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).args(extra).current_dir(dir);
        cmd
    }

    fn spawn_error(&self, source: io::Error) -> ExecError {
        ExecError::Spawn {
            program: self.program.clone(),
            source,
        }
    }
}

impl fmt::Display for CommandTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn parse_splits_program_and_arguments() {
        let tpl = CommandTemplate::parse("mpirun -np 8 lmp_mpi").unwrap();
        assert_eq!(tpl.program(), "mpirun");
        assert_eq!(tpl.to_string(), "mpirun -np 8 lmp_mpi");
    }

    #[test]
    fn parse_rejects_blank_input() {
        assert!(matches!(
            CommandTemplate::parse("   "),
            Err(ExecError::EmptyTemplate)
        ));
    }

    #[cfg(unix)]
    #[test]
    fn invoke_in_reports_the_exit_status() {
        let tmp = tempdir().unwrap();
        let tpl = CommandTemplate::parse("sh -c").unwrap();

        let ok = tpl.invoke_in(tmp.path(), ["exit 0"]).unwrap();
        assert!(ok.success());

        let failed = tpl.invoke_in(tmp.path(), ["exit 3"]).unwrap();
        assert_eq!(failed.code(), Some(3));
    }

    #[cfg(unix)]
    #[test]
    fn invoke_in_runs_in_the_given_directory() {
        let tmp = tempdir().unwrap();
        let tpl = CommandTemplate::parse("sh -c").unwrap();

        tpl.invoke_in(tmp.path(), ["touch marker"]).unwrap();
        assert!(tmp.path().join("marker").is_file());
    }

    #[cfg(unix)]
    #[test]
    fn invoke_logged_captures_stdout() {
        let tmp = tempdir().unwrap();
        let log = tmp.path().join("out");
        let tpl = CommandTemplate::parse("sh -c").unwrap();

        tpl.invoke_logged(tmp.path(), ["echo engine output"], &log)
            .unwrap();
        let captured = std::fs::read_to_string(&log).unwrap();
        assert_eq!(captured.trim(), "engine output");
    }

    #[test]
    fn invoking_a_missing_program_is_a_spawn_error() {
        let tmp = tempdir().unwrap();
        let tpl = CommandTemplate::parse("definitely-not-a-real-binary").unwrap();

        let result = tpl.invoke_in(tmp.path(), Vec::<&str>::new());
        assert!(matches!(result, Err(ExecError::Spawn { .. })));
    }
}
