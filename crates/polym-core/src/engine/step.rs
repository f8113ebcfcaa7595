use super::config::PolymerizationConfig;
use super::error::EngineError;
use super::progress::{Progress, ProgressReporter};
use super::tools::{SimulationEngine, TopologyOutcome, TopologyTool};
use crate::core::artifacts;
use crate::core::stage::{self, StageDir, StageRegistry};
use tracing::{debug, info};

/// Result of one bond-formation attempt cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The bond was formed within the attempt budget.
    BondFormed {
        /// Invocations of the bonding tool this bond needed.
        attempts: u32,
    },
    /// No eligible pair was found within the attempt budget; the caller
    /// rolls the bond back.
    Exhausted,
}

/// Runs the bounded attempt cycle for one bond inside `step`.
///
/// Each attempt invokes the bonding tool on the step's working structure.
/// When no eligible pair exists, a short perturbation pass reshuffles the
/// local geometry and the attempt is retried, until the attempt counter
/// exceeds the configured maximum. The boundary is strictly-greater-than, so
/// the bonding tool runs at most `max_attempts + 1` times per bond.
///
/// Fatal tool conditions propagate as errors; exhaustion is an ordinary
/// outcome.
pub fn run_bond_attempts(
    step: &StageDir,
    config: &PolymerizationConfig,
    reporter: &ProgressReporter,
) -> Result<StepOutcome, EngineError> {
    let topology = TopologyTool::new(
        &config.tooling.topology,
        &config.workspace.types_path,
        &config.scripts.bonding,
        config.tooling.no_candidate_status,
    );
    let engine = SimulationEngine::new(&config.tooling.engine);
    let mut retries = StageRegistry::new(config.workspace.keep_intermediates);

    let mut attempts: u32 = 1;
    loop {
        match topology.attempt_bond(step)? {
            TopologyOutcome::BondFormed => {
                info!(attempts, "Bond formed.");
                return Ok(StepOutcome::BondFormed { attempts });
            }
            TopologyOutcome::NoCandidate => {
                if attempts > config.schedule.max_attempts {
                    info!(attempts, "No eligible pair within the attempt budget.");
                    return Ok(StepOutcome::Exhausted);
                }
                reporter.report(Progress::PerturbationPass { attempt: attempts });
                perturb(step, attempts, config, &engine, &mut retries)?;
                attempts += 1;
            }
        }
    }
}

/// Runs one perturbation pass and folds its output back into the step's
/// working structure.
fn perturb(
    step: &StageDir,
    attempt: u32,
    config: &PolymerizationConfig,
    engine: &SimulationEngine<'_>,
    retries: &mut StageRegistry,
) -> Result<(), EngineError> {
    debug!(attempt, "Perturbing structure before retry.");
    let pass = StageDir::create(step.path(), &stage::perturbation_name(attempt))?;
    retries.track(&pass);

    pass.stage_as(
        &step.file(artifacts::BOND_INPUT),
        artifacts::STAGE_STRUCTURE,
    )?;
    engine.dynamics(&pass, &config.scripts.perturbation)?;
    pass.propagate(artifacts::DYNAMICS, &step.file(artifacts::BOND_INPUT))?;

    retries.sweep()?;
    Ok(())
}
