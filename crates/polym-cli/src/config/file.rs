use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct FileScheduleConfig {
    #[serde(rename = "target-bonds")]
    pub target_bonds: Option<u32>,
    #[serde(rename = "bonds-per-cycle")]
    pub bonds_per_cycle: Option<u32>,
    #[serde(rename = "extended-md-frequency")]
    pub extended_md_frequency: Option<u32>,
    #[serde(rename = "max-attempts")]
    pub max_attempts: Option<u32>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct FileWorkspaceConfig {
    pub root: Option<PathBuf>,
    pub structure: Option<PathBuf>,
    pub types: Option<PathBuf>,
    #[serde(rename = "keep-intermediates")]
    pub keep_intermediates: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct FileToolsConfig {
    pub topology: Option<String>,
    #[serde(rename = "init")]
    pub initializer: Option<String>,
    #[serde(rename = "final")]
    pub finalizer: Option<String>,
    pub engine: Option<String>,
    #[serde(rename = "no-candidate-status")]
    pub no_candidate_status: Option<i32>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct FileScriptsConfig {
    pub bonding: Option<PathBuf>,
    pub minimization: Option<PathBuf>,
    pub perturbation: Option<PathBuf>,
    pub equilibration: Option<PathBuf>,
    #[serde(rename = "extended-equilibration")]
    pub extended_equilibration: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub schedule: Option<FileScheduleConfig>,
    pub workspace: Option<FileWorkspaceConfig>,
    pub tools: Option<FileToolsConfig>,
    pub scripts: Option<FileScriptsConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading run configuration from {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }
}
