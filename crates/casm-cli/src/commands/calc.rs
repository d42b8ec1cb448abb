use crate::config::AppConfig;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use casm::progress::ProgressReporter;
use casm::workflows::calc::{self, Action, CalcOutcome, ReportSummary};
use casm::{Project, Selection};
use tracing::{info, warn};

pub fn run(config: &AppConfig) -> Result<()> {
    if config.action.is_none() {
        warn!("No action given: use one of --setup, --submit, --run or --report.");
        return Ok(());
    }

    info!("Opening CASM project at {:?}", config.project_path);
    let project =
        Project::open(&config.project_path)?.with_executable(config.casm_executable.clone());

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    for line in execute(&project, config, &reporter)? {
        println!("{}", line);
    }
    Ok(())
}

/// Runs the configured action against `project` and returns the lines to print.
fn execute(project: &Project, config: &AppConfig, reporter: &ProgressReporter) -> Result<Vec<String>> {
    let Some(action) = config.action else {
        return Ok(Vec::new());
    };

    let mut selection =
        Selection::new(project, &config.selection).with_config_type(config.config_type);
    info!(
        "Dispatching {:?} for {} {} on '{}'",
        action, config.calc.software, config.calc.method, config.selection
    );

    let outcome = calc::execute(&mut selection, &config.calc, action, reporter)?;
    Ok(match outcome {
        CalcOutcome::Processed(confignames) => vec![format!(
            "✓ {} {} configuration(s) with {} {}.",
            past_tense(action),
            confignames.len(),
            config.calc.software,
            config.calc.method
        )],
        CalcOutcome::Report(summary) => report_lines(&summary),
    })
}

fn past_tense(action: Action) -> &'static str {
    match action {
        Action::Setup => "Set up",
        Action::Submit => "Submitted",
        Action::Run => "Ran",
        Action::Report => "Reported",
    }
}

fn report_lines(summary: &ReportSummary) -> Vec<String> {
    let mut lines = vec![format!(
        "✓ Wrote properties for {} configuration(s).",
        summary.written.len()
    )];
    if !summary.is_complete() {
        lines.push(format!(
            "Warning: {} configuration(s) could not be reported:",
            summary.failures.len()
        ));
        lines.extend(
            summary
                .failures
                .iter()
                .map(|f| format!("  {}: {}", f.configname, f.error)),
        );
    }
    lines
}
