use crate::cli::RunArgs;
use crate::config;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use polymatic::engine::config::PolymerizationConfig;
use polymatic::engine::progress::ProgressReporter;
use polymatic::engine::state::{RunOutcome, RunReport};
use polymatic::workflows;
use tracing::info;

pub fn run(args: RunArgs) -> Result<()> {
    let config = config::build_config(&args)?;
    info!(
        "Configuration assembled; workspace root is {:?}.",
        config.workspace.root
    );

    print_header(&config);

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.callback());

    info!("Invoking the core polymerization workflow...");
    let report = workflows::polymerize::run(&config, &reporter)?;
    drop(reporter);

    print_footer(&report);
    Ok(())
}

fn print_header(config: &PolymerizationConfig) {
    println!("Polymatic Simulated Polymerization\n");
    println!("Parameters\n----------");
    println!("Target bonds:              {}", config.schedule.target_bonds);
    println!(
        "Bonds per cycle:           {}",
        config.schedule.bonds_per_cycle
    );
    println!(
        "Frequency of extended MD:  {}",
        config.schedule.extended_md_frequency
    );
    println!(
        "Maximum bond attempts:     {}\n",
        config.schedule.max_attempts
    );
    println!("Polymerization Loop\n-------------------");
}

fn print_footer(report: &RunReport) {
    if report.outcome == RunOutcome::Aborted {
        println!("\nStopped early: no eligible pair within the attempt budget.");
    }
    println!("\nSummary\n-------");
    println!("Bonds made:                {}", report.bonds_made);
    println!(
        "Completion percentage:     {:.0}%",
        report.completion_percent()
    );
    println!(
        "Final structure:           {}",
        report.final_structure.display()
    );
}
