pub struct DefaultsConfig {
    pub bonds_per_cycle: u32,
    pub extended_md_frequency: u32,
    pub max_attempts: u32,
    pub keep_intermediates: bool,
    pub no_candidate_status: i32,
    pub structure: String,
    pub types: String,
    pub bonding_script: String,
    pub minimization_script: String,
    pub perturbation_script: String,
    pub equilibration_script: String,
    pub extended_equilibration_script: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            bonds_per_cycle: 5,
            extended_md_frequency: 3,
            max_attempts: 100,
            keep_intermediates: false,
            no_candidate_status: 3,
            structure: "data.lmps".to_string(),
            types: "types.txt".to_string(),
            bonding_script: "scripts/polym.in".to_string(),
            minimization_script: "scripts/min.in".to_string(),
            perturbation_script: "scripts/md0.in".to_string(),
            equilibration_script: "scripts/md1.in".to_string(),
            extended_equilibration_script: "scripts/md2.in".to_string(),
        }
    }
}
