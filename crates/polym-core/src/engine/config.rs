use crate::core::exec::CommandTemplate;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter {
        name: &'static str,
        reason: &'static str,
    },
}

/// How many bonds to make and how the loop is paced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleConfig {
    /// Total number of bonds to form before the run completes.
    pub target_bonds: u32,
    /// Bonds between full equilibration passes.
    pub bonds_per_cycle: u32,
    /// Every Nth equilibration cycle runs the extended protocol.
    pub extended_md_frequency: u32,
    /// Perturbation retries allowed per bond. The bonding tool may be
    /// invoked up to `max_attempts + 1` times before a bond is declared
    /// exhausted.
    pub max_attempts: u32,
}

/// Where the run lives on disk and what it starts from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceConfig {
    /// Root directory holding the rolling intermediate state and all stage
    /// directories.
    pub root: PathBuf,
    /// Starting structure file.
    pub structure_path: PathBuf,
    /// Atom-type mapping table handed to the bonding and conversion tools.
    pub types_path: PathBuf,
    /// Retain every stage directory instead of sweeping them.
    pub keep_intermediates: bool,
}

/// External executables and their outcome conventions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolingConfig {
    /// Bond-formation/topology tool.
    pub topology: CommandTemplate,
    /// Optional structure converter run at initialization; a plain copy is
    /// performed when absent.
    pub initializer: Option<CommandTemplate>,
    /// Optional structure converter run at finalization; a plain copy is
    /// performed when absent.
    pub finalizer: Option<CommandTemplate>,
    /// Molecular simulation engine.
    pub engine: CommandTemplate,
    /// Exit status with which the topology tool reports that no eligible
    /// atom pair was found.
    pub no_candidate_status: i32,
}

/// Instruction files handed to the external tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptsConfig {
    /// Bonding instruction file, also passed to the conversion tools.
    pub bonding: PathBuf,
    /// Energy-minimization script.
    pub minimization: PathBuf,
    /// Short agitation script run between failed bonding attempts.
    pub perturbation: PathBuf,
    /// Standard equilibration script (type 1).
    pub equilibration: PathBuf,
    /// Extended equilibration script (type 2).
    pub extended_equilibration: PathBuf,
}

/// Immutable parameters for one polymerization run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolymerizationConfig {
    pub schedule: ScheduleConfig,
    pub workspace: WorkspaceConfig,
    pub tooling: ToolingConfig,
    pub scripts: ScriptsConfig,
}

#[derive(Default)]
pub struct PolymerizationConfigBuilder {
    target_bonds: Option<u32>,
    bonds_per_cycle: Option<u32>,
    extended_md_frequency: Option<u32>,
    max_attempts: Option<u32>,
    root: Option<PathBuf>,
    structure_path: Option<PathBuf>,
    types_path: Option<PathBuf>,
    keep_intermediates: Option<bool>,
    topology: Option<CommandTemplate>,
    initializer: Option<CommandTemplate>,
    finalizer: Option<CommandTemplate>,
    engine: Option<CommandTemplate>,
    no_candidate_status: Option<i32>,
    bonding_script: Option<PathBuf>,
    minimization_script: Option<PathBuf>,
    perturbation_script: Option<PathBuf>,
    equilibration_script: Option<PathBuf>,
    extended_equilibration_script: Option<PathBuf>,
}

impl PolymerizationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target_bonds(mut self, n: u32) -> Self {
        self.target_bonds = Some(n);
        self
    }
    pub fn bonds_per_cycle(mut self, n: u32) -> Self {
        self.bonds_per_cycle = Some(n);
        self
    }
    pub fn extended_md_frequency(mut self, n: u32) -> Self {
        self.extended_md_frequency = Some(n);
        self
    }
    pub fn max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = Some(n);
        self
    }
    pub fn root(mut self, path: PathBuf) -> Self {
        self.root = Some(path);
        self
    }
    pub fn structure_path(mut self, path: PathBuf) -> Self {
        self.structure_path = Some(path);
        self
    }
    pub fn types_path(mut self, path: PathBuf) -> Self {
        self.types_path = Some(path);
        self
    }
    pub fn keep_intermediates(mut self, keep: bool) -> Self {
        self.keep_intermediates = Some(keep);
        self
    }
    pub fn topology(mut self, command: CommandTemplate) -> Self {
        self.topology = Some(command);
        self
    }
    pub fn initializer(mut self, command: Option<CommandTemplate>) -> Self {
        self.initializer = command;
        self
    }
    pub fn finalizer(mut self, command: Option<CommandTemplate>) -> Self {
        self.finalizer = command;
        self
    }
    pub fn engine(mut self, command: CommandTemplate) -> Self {
        self.engine = Some(command);
        self
    }
    pub fn no_candidate_status(mut self, status: i32) -> Self {
        self.no_candidate_status = Some(status);
        self
    }
    pub fn bonding_script(mut self, path: PathBuf) -> Self {
        self.bonding_script = Some(path);
        self
    }
    pub fn minimization_script(mut self, path: PathBuf) -> Self {
        self.minimization_script = Some(path);
        self
    }
    pub fn perturbation_script(mut self, path: PathBuf) -> Self {
        self.perturbation_script = Some(path);
        self
    }
    pub fn equilibration_script(mut self, path: PathBuf) -> Self {
        self.equilibration_script = Some(path);
        self
    }
    pub fn extended_equilibration_script(mut self, path: PathBuf) -> Self {
        self.extended_equilibration_script = Some(path);
        self
    }

    pub fn build(self) -> Result<PolymerizationConfig, ConfigError> {
        let schedule = ScheduleConfig {
            target_bonds: self
                .target_bonds
                .ok_or(ConfigError::MissingParameter("target_bonds"))?,
            bonds_per_cycle: self
                .bonds_per_cycle
                .ok_or(ConfigError::MissingParameter("bonds_per_cycle"))?,
            extended_md_frequency: self
                .extended_md_frequency
                .ok_or(ConfigError::MissingParameter("extended_md_frequency"))?,
            max_attempts: self
                .max_attempts
                .ok_or(ConfigError::MissingParameter("max_attempts"))?,
        };
        if schedule.bonds_per_cycle == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "bonds_per_cycle",
                reason: "must be at least 1",
            });
        }
        if schedule.extended_md_frequency == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "extended_md_frequency",
                reason: "must be at least 1",
            });
        }

        let workspace = WorkspaceConfig {
            root: self.root.ok_or(ConfigError::MissingParameter("root"))?,
            structure_path: self
                .structure_path
                .ok_or(ConfigError::MissingParameter("structure_path"))?,
            types_path: self
                .types_path
                .ok_or(ConfigError::MissingParameter("types_path"))?,
            keep_intermediates: self.keep_intermediates.unwrap_or(false),
        };
        let tooling = ToolingConfig {
            topology: self
                .topology
                .ok_or(ConfigError::MissingParameter("topology"))?,
            initializer: self.initializer,
            finalizer: self.finalizer,
            engine: self.engine.ok_or(ConfigError::MissingParameter("engine"))?,
            no_candidate_status: self.no_candidate_status.unwrap_or(3),
        };
        let scripts = ScriptsConfig {
            bonding: self
                .bonding_script
                .ok_or(ConfigError::MissingParameter("bonding_script"))?,
            minimization: self
                .minimization_script
                .ok_or(ConfigError::MissingParameter("minimization_script"))?,
            perturbation: self
                .perturbation_script
                .ok_or(ConfigError::MissingParameter("perturbation_script"))?,
            equilibration: self
                .equilibration_script
                .ok_or(ConfigError::MissingParameter("equilibration_script"))?,
            extended_equilibration: self
                .extended_equilibration_script
                .ok_or(ConfigError::MissingParameter("extended_equilibration_script"))?,
        };

        Ok(PolymerizationConfig {
            schedule,
            workspace,
            tooling,
            scripts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_builder() -> PolymerizationConfigBuilder {
        PolymerizationConfigBuilder::new()
            .target_bonds(16)
            .bonds_per_cycle(5)
            .extended_md_frequency(3)
            .max_attempts(100)
            .root(PathBuf::from("/work"))
            .structure_path(PathBuf::from("/work/data.lmps"))
            .types_path(PathBuf::from("/work/types.txt"))
            .topology(CommandTemplate::parse("perl polym.pl").unwrap())
            .engine(CommandTemplate::parse("lmp_serial").unwrap())
            .bonding_script(PathBuf::from("/work/scripts/polym.in"))
            .minimization_script(PathBuf::from("/work/scripts/min.in"))
            .perturbation_script(PathBuf::from("/work/scripts/md0.in"))
            .equilibration_script(PathBuf::from("/work/scripts/md1.in"))
            .extended_equilibration_script(PathBuf::from("/work/scripts/md2.in"))
    }

    #[test]
    fn build_succeeds_with_all_required_parameters() {
        let config = full_builder().build().unwrap();
        assert_eq!(config.schedule.target_bonds, 16);
        assert_eq!(config.tooling.no_candidate_status, 3);
        assert!(!config.workspace.keep_intermediates);
        assert!(config.tooling.initializer.is_none());
        assert!(config.tooling.finalizer.is_none());
    }

    #[test]
    fn build_reports_the_first_missing_parameter() {
        let result = PolymerizationConfigBuilder::new().build();
        assert_eq!(result, Err(ConfigError::MissingParameter("target_bonds")));
    }

    #[test]
    fn build_rejects_a_zero_cycle_length() {
        let result = full_builder().bonds_per_cycle(0).build();
        assert_eq!(
            result,
            Err(ConfigError::InvalidParameter {
                name: "bonds_per_cycle",
                reason: "must be at least 1",
            })
        );
    }

    #[test]
    fn build_rejects_a_zero_extended_md_frequency() {
        let result = full_builder().extended_md_frequency(0).build();
        assert!(matches!(result, Err(ConfigError::InvalidParameter { .. })));
    }

    #[test]
    fn optional_tools_and_overrides_are_honored() {
        let config = full_builder()
            .initializer(Some(CommandTemplate::parse("perl polym_init.pl").unwrap()))
            .finalizer(Some(CommandTemplate::parse("perl polym_final.pl").unwrap()))
            .no_candidate_status(7)
            .keep_intermediates(true)
            .build()
            .unwrap();

        assert!(config.tooling.initializer.is_some());
        assert!(config.tooling.finalizer.is_some());
        assert_eq!(config.tooling.no_candidate_status, 7);
        assert!(config.workspace.keep_intermediates);
    }
}
