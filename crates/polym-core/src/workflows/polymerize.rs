use crate::core::artifacts;
use crate::core::stage::{self, StageDir, StageRegistry};
use crate::engine::config::PolymerizationConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::state::{LoopState, RunOutcome, RunReport};
use crate::engine::step::{self, StepOutcome};
use crate::engine::tools::{ConversionTool, EquilibrationKind, SimulationEngine};
use std::fs;
use std::path::PathBuf;
use tracing::{info, instrument};

/// Runs the full polymerization loop described by `config`.
///
/// The loop grows the network one bond at a time: each bond gets its own
/// stage directory, a bounded attempt cycle, and a relaxation pass that
/// commits the result to the rolling intermediate. Every
/// `bonds_per_cycle`-th bond is followed by a full equilibration, with the
/// extended protocol every `extended_md_frequency`-th cycle. Attempt
/// exhaustion rolls the current bond back and aborts the loop; finalization
/// runs regardless, so an aborted run still yields a usable output
/// structure.
#[instrument(skip_all, name = "polymerization_workflow")]
pub fn run(
    config: &PolymerizationConfig,
    reporter: &ProgressReporter,
) -> Result<RunReport, EngineError> {
    let mut state = LoopState::new();
    let mut steps = StageRegistry::new(config.workspace.keep_intermediates);
    let engine = SimulationEngine::new(&config.tooling.engine);

    // === Phase 0: Initialization ===
    reporter.report(Progress::PhaseStart {
        name: "Initialization",
    });
    info!("Converting the starting structure into the working intermediate.");
    initialize(config)?;
    reporter.report(Progress::PhaseFinish);

    // === Phase 1: Relax the starting structure (step 0) ===
    reporter.report(Progress::StepStart { bond: 0 });
    let step0 = StageDir::create(&config.workspace.root, &stage::step_name(0))?;
    steps.track(&step0);
    step0.stage_as(&intermediate_path(config), artifacts::STAGE_STRUCTURE)?;
    relax_and_commit(&step0, config, &engine, &mut steps)?;

    // === Phase 2: Bond accumulation ===
    let mut outcome = RunOutcome::Completed;
    while state.bonds_made() < config.schedule.target_bonds {
        let bond = state.begin_bond();
        reporter.report(Progress::StepStart { bond });
        info!(bond, "Starting polymerization step.");

        let step_dir = StageDir::create(&config.workspace.root, &stage::step_name(bond))?;
        steps.track(&step_dir);
        step_dir.stage_as(&intermediate_path(config), artifacts::BOND_INPUT)?;

        match step::run_bond_attempts(&step_dir, config, reporter)? {
            StepOutcome::Exhausted => {
                state.rollback_bond();
                reporter.report(Progress::Exhausted { bond });
                steps.sweep()?;
                outcome = RunOutcome::Aborted;
                break;
            }
            StepOutcome::BondFormed { attempts } => {
                reporter.report(Progress::BondFormed { bond, attempts });
            }
        }

        relax_and_commit(&step_dir, config, &engine, &mut steps)?;

        if state.bonds_made() == config.schedule.target_bonds {
            break;
        }

        if state.bonds_made() % config.schedule.bonds_per_cycle == 0 {
            equilibrate(state.bonds_made(), config, &engine, reporter, &mut steps)?;
        }
    }

    // === Phase 3: Finalization ===
    reporter.report(Progress::PhaseStart {
        name: "Finalization",
    });
    let final_structure = finalize(config)?;
    reporter.report(Progress::PhaseFinish);

    info!(
        bonds = state.bonds_made(),
        ?outcome,
        "Polymerization run finished."
    );
    Ok(RunReport {
        outcome,
        bonds_made: state.bonds_made(),
        target_bonds: config.schedule.target_bonds,
        final_structure,
    })
}

fn intermediate_path(config: &PolymerizationConfig) -> PathBuf {
    config.workspace.root.join(artifacts::INTERMEDIATE)
}

/// Produces the working intermediate from the starting structure.
fn initialize(config: &PolymerizationConfig) -> Result<(), EngineError> {
    ConversionTool::new(
        config.tooling.initializer.as_ref(),
        &config.workspace.types_path,
        &config.scripts.bonding,
    )
    .convert(
        &config.workspace.root,
        &config.workspace.structure_path,
        &intermediate_path(config),
        "Initialization",
    )
}

/// Minimizes the stage's structure, commits the result to the rolling
/// intermediate, and sweeps the step stages created so far.
fn relax_and_commit(
    step_dir: &StageDir,
    config: &PolymerizationConfig,
    engine: &SimulationEngine<'_>,
    steps: &mut StageRegistry,
) -> Result<(), EngineError> {
    engine.minimize(step_dir, &config.scripts.minimization)?;
    step_dir.propagate(artifacts::MINIMIZED, &intermediate_path(config))?;
    steps.sweep()?;
    Ok(())
}

/// Runs the cycle equilibration for the given committed-bond count.
fn equilibrate(
    bonds: u32,
    config: &PolymerizationConfig,
    engine: &SimulationEngine<'_>,
    reporter: &ProgressReporter,
    steps: &mut StageRegistry,
) -> Result<(), EngineError> {
    // Exact by construction: only called when bonds divides evenly.
    let cycle = bonds / config.schedule.bonds_per_cycle;
    let kind = if cycle % config.schedule.extended_md_frequency == 0 {
        EquilibrationKind::Extended
    } else {
        EquilibrationKind::Standard
    };
    reporter.report(Progress::EquilibrationStart { kind });
    info!(bonds, cycle, ?kind, "Running equilibration.");

    let md_stage = StageDir::create(&config.workspace.root, &stage::cycle_md_name(bonds))?;
    steps.track(&md_stage);
    md_stage.stage_as(&intermediate_path(config), artifacts::STAGE_STRUCTURE)?;

    let script = match kind {
        EquilibrationKind::Standard => &config.scripts.equilibration,
        EquilibrationKind::Extended => &config.scripts.extended_equilibration,
    };
    engine.dynamics(&md_stage, script)?;
    md_stage.propagate(artifacts::DYNAMICS, &intermediate_path(config))?;
    steps.sweep()?;
    Ok(())
}

/// Converts the intermediate into the final output and retires the
/// intermediate. Runs for completed and aborted runs alike.
fn finalize(config: &PolymerizationConfig) -> Result<PathBuf, EngineError> {
    let intermediate = intermediate_path(config);
    let output = config.workspace.root.join(artifacts::FINAL);
    ConversionTool::new(
        config.tooling.finalizer.as_ref(),
        &config.workspace.types_path,
        &config.scripts.bonding,
    )
    .convert(&config.workspace.root, &intermediate, &output, "Finalization")?;
    fs::remove_file(&intermediate).map_err(|source| EngineError::Workspace {
        path: intermediate.clone(),
        source,
    })?;
    Ok(output)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::core::exec::CommandTemplate;
    use crate::engine::config::PolymerizationConfigBuilder;
    use std::path::Path;
    use std::sync::Mutex;
    use tempfile::{TempDir, tempdir};

    fn write_tool(dir: &Path, name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    /// Bonding tool that logs every call and obeys the `verdict` file:
    /// 0 copies its input to its output, anything else is its exit status.
    fn default_topology_body() -> &'static str {
        concat!(
            "echo called >> \"$(dirname \"$0\")/topology_calls\"\n",
            "code=$(cat \"$(dirname \"$0\")/verdict\")\n",
            "[ \"$code\" -eq 0 ] && cp \"$2\" \"$8\"\n",
            "exit \"$code\"",
        )
    }

    /// Simulation engine that logs the script it was handed and produces the
    /// artifact that script's pass expects.
    fn default_engine_body() -> &'static str {
        concat!(
            "echo \"$2\" >> \"$(dirname \"$0\")/engine_calls\"\n",
            "case \"$2\" in\n",
            "  min.in) cp data.lmps min.lmps ;;\n",
            "  *) cp data.lmps md.lmps ;;\n",
            "esac",
        )
    }

    struct Workspace {
        tmp: TempDir,
    }

    impl Workspace {
        fn new() -> Self {
            let tmp = tempdir().unwrap();
            let root = tmp.path();
            fs::write(root.join("data.lmps"), b"seed structure").unwrap();
            fs::write(root.join("types.txt"), b"types").unwrap();
            fs::write(root.join("verdict"), "0").unwrap();
            for script in ["polym.in", "min.in", "md0.in", "md1.in", "md2.in"] {
                fs::write(root.join(script), script.as_bytes()).unwrap();
            }
            write_tool(root, "polym.sh", default_topology_body());
            write_tool(root, "engine.sh", default_engine_body());
            Self { tmp }
        }

        fn root(&self) -> &Path {
            self.tmp.path()
        }

        fn builder(&self) -> PolymerizationConfigBuilder {
            let root = self.root();
            PolymerizationConfigBuilder::new()
                .bonds_per_cycle(5)
                .extended_md_frequency(3)
                .max_attempts(100)
                .root(root.to_path_buf())
                .structure_path(root.join("data.lmps"))
                .types_path(root.join("types.txt"))
                .topology(
                    CommandTemplate::parse(root.join("polym.sh").to_str().unwrap()).unwrap(),
                )
                .engine(CommandTemplate::parse(root.join("engine.sh").to_str().unwrap()).unwrap())
                .bonding_script(root.join("polym.in"))
                .minimization_script(root.join("min.in"))
                .perturbation_script(root.join("md0.in"))
                .equilibration_script(root.join("md1.in"))
                .extended_equilibration_script(root.join("md2.in"))
        }

        fn topology_calls(&self) -> usize {
            fs::read_to_string(self.root().join("topology_calls"))
                .map(|s| s.lines().count())
                .unwrap_or(0)
        }

        fn engine_calls(&self) -> Vec<String> {
            fs::read_to_string(self.root().join("engine_calls"))
                .map(|s| s.lines().map(str::to_string).collect())
                .unwrap_or_default()
        }

        fn stage_dirs(&self) -> Vec<String> {
            let mut dirs: Vec<String> = fs::read_dir(self.root())
                .unwrap()
                .filter_map(|e| {
                    let e = e.unwrap();
                    e.file_type().unwrap().is_dir().then(|| {
                        e.file_name().to_string_lossy().into_owned()
                    })
                })
                .collect();
            dirs.sort();
            dirs
        }
    }

    #[test]
    fn completed_run_reaches_the_target_and_cleans_up() {
        let ws = Workspace::new();
        let config = ws.builder().target_bonds(3).build().unwrap();

        let report = run(&config, &ProgressReporter::new()).unwrap();

        assert_eq!(report.outcome, RunOutcome::Completed);
        assert_eq!(report.bonds_made, 3);
        assert_eq!(report.completion_percent(), 100.0);
        assert_eq!(report.final_structure, ws.root().join("final.lmps"));

        // Only the top-level artifacts survive the run.
        assert!(ws.root().join("final.lmps").is_file());
        assert!(!ws.root().join("temp.lmps").exists());
        assert!(ws.stage_dirs().is_empty());

        // One bonding call per bond, one minimization per step including
        // step 0, no equilibration below the cycle length.
        assert_eq!(ws.topology_calls(), 3);
        assert_eq!(ws.engine_calls(), vec!["min.in"; 4]);
        assert_eq!(
            fs::read(ws.root().join("final.lmps")).unwrap(),
            b"seed structure"
        );
    }

    #[test]
    fn committed_bonds_increase_monotonically() {
        let ws = Workspace::new();
        let config = ws.builder().target_bonds(4).build().unwrap();

        let formed = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            if let Progress::BondFormed { bond, .. } = event {
                formed.lock().unwrap().push(bond);
            }
        }));
        run(&config, &reporter).unwrap();
        drop(reporter);

        assert_eq!(formed.into_inner().unwrap(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn cycle_policy_selects_equilibration_types() {
        let ws = Workspace::new();
        let config = ws.builder().target_bonds(16).build().unwrap();

        let report = run(&config, &ProgressReporter::new()).unwrap();
        assert_eq!(report.bonds_made, 16);

        // Cycles end at bonds 5, 10, 15; the third cycle runs the extended
        // protocol, and no equilibration follows the final bond.
        let md_scripts: Vec<String> = ws
            .engine_calls()
            .into_iter()
            .filter(|s| s != "min.in")
            .collect();
        assert_eq!(md_scripts, vec!["md1.in", "md1.in", "md2.in"]);
    }

    #[test]
    fn immediate_exhaustion_aborts_after_one_invocation_and_finalizes() {
        let ws = Workspace::new();
        fs::write(ws.root().join("verdict"), "3").unwrap();
        let config = ws
            .builder()
            .target_bonds(1)
            .max_attempts(0)
            .build()
            .unwrap();

        let report = run(&config, &ProgressReporter::new()).unwrap();

        assert_eq!(report.outcome, RunOutcome::Aborted);
        assert_eq!(report.bonds_made, 0);
        assert_eq!(ws.topology_calls(), 1);

        // Finalization still ran, from the step-0 relaxed structure.
        assert!(ws.root().join("final.lmps").is_file());
        assert_eq!(
            fs::read(ws.root().join("final.lmps")).unwrap(),
            b"seed structure"
        );
        assert!(!ws.root().join("temp.lmps").exists());
        assert!(ws.stage_dirs().is_empty());
    }

    #[test]
    fn exhaustion_mid_run_rolls_back_to_the_last_committed_bond() {
        let ws = Workspace::new();
        // Succeed twice, then never find a pair again.
        write_tool(
            ws.root(),
            "polym.sh",
            concat!(
                "echo called >> \"$(dirname \"$0\")/topology_calls\"\n",
                "n=$(wc -l < \"$(dirname \"$0\")/topology_calls\")\n",
                "[ \"$n\" -le 2 ] && { cp \"$2\" \"$8\"; exit 0; }\n",
                "exit 3",
            ),
        );
        let config = ws
            .builder()
            .target_bonds(4)
            .max_attempts(0)
            .build()
            .unwrap();

        let report = run(&config, &ProgressReporter::new()).unwrap();

        assert_eq!(report.outcome, RunOutcome::Aborted);
        assert_eq!(report.bonds_made, 2);
        assert_eq!(report.completion_percent(), 50.0);
        assert!(ws.root().join("final.lmps").is_file());
        assert!(ws.stage_dirs().is_empty());
    }

    #[test]
    fn keep_intermediates_retains_all_stage_directories() {
        let ws = Workspace::new();
        let config = ws
            .builder()
            .target_bonds(5)
            .keep_intermediates(true)
            .build()
            .unwrap();

        run(&config, &ProgressReporter::new()).unwrap();

        assert_eq!(
            ws.stage_dirs(),
            vec![
                "step_000",
                "step_001",
                "step_002",
                "step_003",
                "step_004",
                "step_005",
            ]
        );
    }

    #[test]
    fn stale_stage_directory_is_a_fatal_collision() {
        let ws = Workspace::new();
        fs::create_dir(ws.root().join("step_001")).unwrap();
        let config = ws.builder().target_bonds(1).build().unwrap();

        let result = run(&config, &ProgressReporter::new());
        assert!(matches!(
            result,
            Err(EngineError::Stage(
                crate::core::stage::StageError::Collision { .. }
            ))
        ));
    }

    #[test]
    fn conversion_tools_wrap_the_run_when_configured() {
        let ws = Workspace::new();
        let init = write_tool(
            ws.root(),
            "init.sh",
            "cp \"$2\" \"$8\"\necho init >> \"$(dirname \"$0\")/conversions\"",
        );
        let finalizer = write_tool(
            ws.root(),
            "final.sh",
            "cp \"$2\" \"$8\"\necho final >> \"$(dirname \"$0\")/conversions\"",
        );
        let config = ws
            .builder()
            .target_bonds(1)
            .initializer(Some(
                CommandTemplate::parse(init.to_str().unwrap()).unwrap(),
            ))
            .finalizer(Some(
                CommandTemplate::parse(finalizer.to_str().unwrap()).unwrap(),
            ))
            .build()
            .unwrap();

        run(&config, &ProgressReporter::new()).unwrap();

        let conversions = fs::read_to_string(ws.root().join("conversions")).unwrap();
        assert_eq!(conversions, "init\nfinal\n");
        assert!(ws.root().join("final.lmps").is_file());
    }

    #[test]
    fn failing_initializer_aborts_the_whole_run() {
        let ws = Workspace::new();
        let init = write_tool(ws.root(), "init.sh", "exit 1");
        let config = ws
            .builder()
            .target_bonds(1)
            .initializer(Some(
                CommandTemplate::parse(init.to_str().unwrap()).unwrap(),
            ))
            .build()
            .unwrap();

        let result = run(&config, &ProgressReporter::new());
        assert!(matches!(result, Err(EngineError::ToolFailed { .. })));
        // The run never reached step 0.
        assert!(!ws.root().join("step_000").exists());
    }
}
