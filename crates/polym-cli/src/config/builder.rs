use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use crate::cli::RunArgs;
use crate::error::{CliError, Result};
use polymatic::core::exec::CommandTemplate;
use polymatic::engine::config::{PolymerizationConfig, PolymerizationConfigBuilder};
use std::path::{Path, PathBuf};

pub fn build_config(args: &RunArgs) -> Result<PolymerizationConfig> {
    let defaults = DefaultsConfig::default();

    let mut file_config = match &args.config {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };

    let schedule = file_config.schedule.take().unwrap_or_default();
    let workspace = file_config.workspace.take().unwrap_or_default();
    let tools = file_config.tools.take().unwrap_or_default();
    let scripts = file_config.scripts.take().unwrap_or_default();

    let root = args
        .workspace
        .clone()
        .or(workspace.root)
        .unwrap_or_else(|| PathBuf::from("."));
    let root = root.canonicalize().map_err(|e| {
        CliError::Config(format!(
            "Workspace root '{}' is not accessible: {}",
            root.display(),
            e
        ))
    })?;

    let target_bonds = args.target_bonds.or(schedule.target_bonds).ok_or_else(|| {
        CliError::Config(
            "target-bonds must be given on the command line or in the [schedule] section"
                .to_string(),
        )
    })?;

    let keep_intermediates = match (
        args.keep.keep_intermediates,
        args.keep.discard_intermediates,
    ) {
        (true, false) => true,
        (false, true) => false,
        _ => workspace
            .keep_intermediates
            .unwrap_or(defaults.keep_intermediates),
    };

    let topology = required_command(
        args.topology_tool.as_deref().or(tools.topology.as_deref()),
        "tools.topology",
    )?;
    let engine = required_command(
        args.engine.as_deref().or(tools.engine.as_deref()),
        "tools.engine",
    )?;
    let initializer = optional_command(tools.initializer.as_deref(), "tools.init")?;
    let finalizer = optional_command(tools.finalizer.as_deref(), "tools.final")?;

    let structure_path = resolve(
        &root,
        workspace
            .structure
            .unwrap_or_else(|| PathBuf::from(&defaults.structure)),
    );
    let types_path = resolve(
        &root,
        workspace
            .types
            .unwrap_or_else(|| PathBuf::from(&defaults.types)),
    );

    let config = PolymerizationConfigBuilder::new()
        .target_bonds(target_bonds)
        .bonds_per_cycle(
            args.bonds_per_cycle
                .or(schedule.bonds_per_cycle)
                .unwrap_or(defaults.bonds_per_cycle),
        )
        .extended_md_frequency(
            args.extended_md_frequency
                .or(schedule.extended_md_frequency)
                .unwrap_or(defaults.extended_md_frequency),
        )
        .max_attempts(
            args.max_attempts
                .or(schedule.max_attempts)
                .unwrap_or(defaults.max_attempts),
        )
        .root(root.clone())
        .structure_path(structure_path)
        .types_path(types_path)
        .keep_intermediates(keep_intermediates)
        .topology(topology)
        .initializer(initializer)
        .finalizer(finalizer)
        .engine(engine)
        .no_candidate_status(
            tools
                .no_candidate_status
                .unwrap_or(defaults.no_candidate_status),
        )
        .bonding_script(resolve(
            &root,
            scripts
                .bonding
                .unwrap_or_else(|| PathBuf::from(&defaults.bonding_script)),
        ))
        .minimization_script(resolve(
            &root,
            scripts
                .minimization
                .unwrap_or_else(|| PathBuf::from(&defaults.minimization_script)),
        ))
        .perturbation_script(resolve(
            &root,
            scripts
                .perturbation
                .unwrap_or_else(|| PathBuf::from(&defaults.perturbation_script)),
        ))
        .equilibration_script(resolve(
            &root,
            scripts
                .equilibration
                .unwrap_or_else(|| PathBuf::from(&defaults.equilibration_script)),
        ))
        .extended_equilibration_script(resolve(
            &root,
            scripts
                .extended_equilibration
                .unwrap_or_else(|| PathBuf::from(&defaults.extended_equilibration_script)),
        ))
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    Ok(config)
}

fn required_command(line: Option<&str>, key: &'static str) -> Result<CommandTemplate> {
    let line = line.ok_or_else(|| CliError::Config(format!("{key} must be configured")))?;
    CommandTemplate::parse(line).map_err(|e| CliError::Config(format!("{key}: {e}")))
}

fn optional_command(line: Option<&str>, key: &'static str) -> Result<Option<CommandTemplate>> {
    line.map(|l| CommandTemplate::parse(l).map_err(|e| CliError::Config(format!("{key}: {e}"))))
        .transpose()
}

fn resolve(root: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        root.join(path)
    }
}
