use super::error::EngineError;
use crate::core::artifacts;
use crate::core::exec::CommandTemplate;
use crate::core::stage::StageDir;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Outcome of one bonding attempt, as reported by the topology tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopologyOutcome {
    /// A bond was written to the stage's structure artifact.
    BondFormed,
    /// No eligible atom pair was found; the attempt may be retried.
    NoCandidate,
}

/// Which equilibration protocol a cycle runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EquilibrationKind {
    /// Type-1 protocol, run on most cycles.
    Standard,
    /// Type-2 protocol, run every Nth cycle.
    Extended,
}

/// The common `-i <in> -t <types> -s <instruction> -o <out>` argument
/// contract shared by the topology and conversion tools.
fn contract_args(input: &Path, types: &Path, instruction: &Path, output: &Path) -> Vec<OsString> {
    [
        OsStr::new("-i"),
        input.as_os_str(),
        OsStr::new("-t"),
        types.as_os_str(),
        OsStr::new("-s"),
        instruction.as_os_str(),
        OsStr::new("-o"),
        output.as_os_str(),
    ]
    .iter()
    .map(|s| s.to_os_string())
    .collect()
}

/// Front for the bond-formation/topology tool.
///
/// The tool's exit status carries its outcome: zero means a bond was written
/// (the output artifact is still asserted; its absence is a broken tool
/// contract, not a retry case), the designated no-candidate status means no
/// eligible pair exists, and anything else is fatal.
pub struct TopologyTool<'a> {
    command: &'a CommandTemplate,
    types_path: &'a Path,
    instruction_path: &'a Path,
    no_candidate_status: i32,
}

impl<'a> TopologyTool<'a> {
    pub fn new(
        command: &'a CommandTemplate,
        types_path: &'a Path,
        instruction_path: &'a Path,
        no_candidate_status: i32,
    ) -> Self {
        Self {
            command,
            types_path,
            instruction_path,
            no_candidate_status,
        }
    }

    pub fn attempt_bond(&self, stage: &StageDir) -> Result<TopologyOutcome, EngineError> {
        let output = stage.file(artifacts::STAGE_STRUCTURE);
        let args = contract_args(
            &stage.file(artifacts::BOND_INPUT),
            self.types_path,
            self.instruction_path,
            &output,
        );
        let status = self.command.invoke_in(stage.path(), args)?;

        match status.code() {
            Some(0) => {
                if !stage.has_file(artifacts::STAGE_STRUCTURE) {
                    return Err(EngineError::MissingArtifact {
                        tool: "Bonding tool",
                        path: output,
                    });
                }
                Ok(TopologyOutcome::BondFormed)
            }
            Some(code) if code == self.no_candidate_status => {
                debug!(code, "Bonding tool found no eligible pair.");
                Ok(TopologyOutcome::NoCandidate)
            }
            _ => Err(EngineError::ToolFailed {
                tool: "Bonding tool",
                status,
            }),
        }
    }
}

/// Front for the molecular simulation engine.
///
/// Success is decided solely by the presence of the expected output artifact:
/// engines can exit zero while failing to converge, so the exit status is
/// advisory at best. Stdout is captured to the stage's log artifact.
pub struct SimulationEngine<'a> {
    command: &'a CommandTemplate,
}

impl<'a> SimulationEngine<'a> {
    pub fn new(command: &'a CommandTemplate) -> Self {
        Self { command }
    }

    /// Runs an energy-minimization pass in `stage`.
    pub fn minimize(&self, stage: &StageDir, script: &Path) -> Result<(), EngineError> {
        self.run(stage, script, artifacts::MINIMIZED, "Energy minimization")
    }

    /// Runs a molecular-dynamics pass (perturbation or equilibration) in
    /// `stage`.
    pub fn dynamics(&self, stage: &StageDir, script: &Path) -> Result<(), EngineError> {
        self.run(stage, script, artifacts::DYNAMICS, "Molecular dynamics")
    }

    fn run(
        &self,
        stage: &StageDir,
        script: &Path,
        expected: &'static str,
        tool: &'static str,
    ) -> Result<(), EngineError> {
        let script_name = stage.stage_keeping_name(script)?;
        let status = self.command.invoke_logged(
            stage.path(),
            [OsStr::new("-i"), OsStr::new(&script_name)],
            &stage.file(artifacts::ENGINE_LOG),
        )?;
        if !status.success() {
            warn!(%status, script = %script_name, "Simulation engine exited abnormally; checking output artifact.");
        }
        if !stage.has_file(expected) {
            return Err(EngineError::MissingArtifact {
                tool,
                path: stage.file(expected),
            });
        }
        Ok(())
    }
}

/// Front for the optional initialization/finalization structure converters.
///
/// When no command is configured the conversion degrades to a plain copy.
/// A configured tool must exit zero *and* leave the output artifact behind.
pub struct ConversionTool<'a> {
    command: Option<&'a CommandTemplate>,
    types_path: &'a Path,
    instruction_path: &'a Path,
}

impl<'a> ConversionTool<'a> {
    pub fn new(
        command: Option<&'a CommandTemplate>,
        types_path: &'a Path,
        instruction_path: &'a Path,
    ) -> Self {
        Self {
            command,
            types_path,
            instruction_path,
        }
    }

    pub fn convert(
        &self,
        workdir: &Path,
        input: &Path,
        output: &Path,
        tool: &'static str,
    ) -> Result<(), EngineError> {
        match self.command {
            Some(command) => {
                let args = contract_args(input, self.types_path, self.instruction_path, output);
                let status = command.invoke_in(workdir, args)?;
                if !status.success() {
                    return Err(EngineError::ToolFailed { tool, status });
                }
            }
            None => {
                debug!(tool, "No converter configured; copying structure as-is.");
                fs::copy(input, output).map_err(|source| EngineError::Workspace {
                    path: output.to_path_buf(),
                    source,
                })?;
            }
        }
        if !output.is_file() {
            return Err(EngineError::MissingArtifact {
                tool,
                path: output.to_path_buf(),
            });
        }
        Ok(())
    }
}
