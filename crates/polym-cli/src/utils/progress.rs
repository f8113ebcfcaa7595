use indicatif::{ProgressBar, ProgressStyle};
use polymatic::engine::progress::{Progress, ProgressCallback};
use polymatic::engine::tools::EquilibrationKind;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const SPINNER_TICK_MS: u64 = 80;

/// Drives an indicatif spinner from the core progress events and echoes the
/// per-step lines of the classic loop output.
#[derive(Clone)]
pub struct CliProgressHandler {
    pb: Arc<Mutex<ProgressBar>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        let pb = ProgressBar::new(0)
            .with_style(Self::spinner_style())
            .with_message("Initializing...");
        pb.set_draw_target(indicatif::ProgressDrawTarget::stderr());
        pb.disable_steady_tick();
        pb.finish_and_clear();

        Self {
            pb: Arc::new(Mutex::new(pb)),
        }
    }

    pub fn callback(&self) -> ProgressCallback<'static> {
        let pb_clone = self.pb.clone();

        Box::new(move |progress: Progress| {
            let Ok(pb) = pb_clone.lock() else {
                warn!("Progress bar mutex was poisoned. Cannot update progress.");
                return;
            };

            match progress {
                Progress::PhaseStart { name } => {
                    pb.reset();
                    pb.set_style(Self::spinner_style());
                    pb.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                    pb.set_message(name.to_string());
                }
                Progress::PhaseFinish => {
                    pb.disable_steady_tick();
                    pb.finish_with_message("✓ Done");
                }
                Progress::StepStart { bond } => {
                    pb.reset();
                    pb.set_style(Self::spinner_style());
                    pb.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                    pb.println(format!("Step {}:", bond));
                    pb.set_message(format!("Bond {}", bond));
                }
                Progress::BondFormed { attempts, .. } => {
                    pb.println(format!("  Attempts: {}", attempts));
                }
                Progress::PerturbationPass { attempt } => {
                    pb.set_message(format!("Perturbation pass {}", attempt));
                }
                Progress::Exhausted { .. } => {
                    pb.println("  No pair was found within the maximum number of attempts.");
                }
                Progress::EquilibrationStart { kind } => {
                    let label = match kind {
                        EquilibrationKind::Standard => "Equilibration (type 1)",
                        EquilibrationKind::Extended => "Equilibration (type 2)",
                    };
                    pb.println(format!("{}:", label));
                    pb.set_message(label.to_string());
                }
                Progress::Message(msg) => {
                    if !pb.is_finished() {
                        pb.println(format!("  {}", msg));
                    } else {
                        pb.set_message(msg);
                    }
                }
            }
        })
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .expect("Failed to create spinner style template")
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}
