use crate::calc::settings::{DEFAULT_OUTFILENAME, report_outfilename};
use crate::calc::{Calculator, CalculatorPrograms, Method, Software, WrapperCalculator};
use crate::error::{CasmError, Result};
use crate::io::atomic::write_atomically;
use crate::io::pretty::to_pretty_string;
use crate::progress::{Progress, ProgressReporter};
use crate::project::Project;
use crate::project::settings::ClexDescription;
use crate::selection::Selection;
use serde_json::Value;
use std::io::Write;
use std::path::PathBuf;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Setup,
    Submit,
    Run,
    Report,
}

/// Which calculator to drive and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalcConfig {
    pub software: Software,
    pub method: Method,
    pub programs: CalculatorPrograms,
    /// Output file name used for reports when the calctype settings do not name one.
    pub default_outfilename: String,
}

impl CalcConfig {
    pub fn new(software: Software, method: Method) -> Self {
        Self {
            software,
            method,
            programs: CalculatorPrograms::new(),
            default_outfilename: DEFAULT_OUTFILENAME.to_string(),
        }
    }
}

#[derive(Debug)]
pub struct ReportFailure {
    pub configname: String,
    pub error: CasmError,
}

/// The outcome of a report over a selection. Failures are per configuration and
/// never stop the remaining configurations from being reported.
#[derive(Debug, Default)]
pub struct ReportSummary {
    pub written: Vec<PathBuf>,
    pub failures: Vec<ReportFailure>,
}

impl ReportSummary {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug)]
pub enum CalcOutcome {
    /// Confignames handled by setup, submit or run, in order.
    Processed(Vec<String>),
    Report(ReportSummary),
}

/// Performs `action` for every selected configuration of `selection` using the
/// wrapper program configured for the software and method in `config`.
#[instrument(skip_all, name = "calc_workflow", fields(action = ?action, software = %config.software, method = %config.method))]
pub fn execute(
    selection: &mut Selection,
    config: &CalcConfig,
    action: Action,
    reporter: &ProgressReporter,
) -> Result<CalcOutcome> {
    let project = selection.project();
    let calculator =
        WrapperCalculator::for_method(project, &config.programs, config.software, config.method);
    info!(
        "Using '{}' for {} {}",
        calculator.program(),
        config.software,
        config.method
    );

    match action {
        Action::Setup => setup(selection, &calculator, reporter).map(CalcOutcome::Processed),
        Action::Submit => submit(selection, &calculator, reporter).map(CalcOutcome::Processed),
        Action::Run => run(selection, &calculator, reporter).map(CalcOutcome::Processed),
        Action::Report => {
            let outfilename = report_outfilename(
                project,
                project.default_clex(),
                config.software,
                &config.default_outfilename,
            )?;
            report(selection, &calculator, outfilename.as_deref(), reporter)
                .map(CalcOutcome::Report)
        }
    }
}

pub fn setup(
    selection: &mut Selection,
    calculator: &dyn Calculator,
    reporter: &ProgressReporter,
) -> Result<Vec<String>> {
    let project = selection.project();
    let confignames = selection.selected_confignames()?;
    for_each_config("Setup", &confignames, reporter, |configname| {
        calculator.setup(&project.dir().configuration_dir(configname))
    })?;
    Ok(confignames)
}

/// Sets up, then submits every selected configuration.
pub fn submit(
    selection: &mut Selection,
    calculator: &dyn Calculator,
    reporter: &ProgressReporter,
) -> Result<Vec<String>> {
    let project = selection.project();
    let confignames = setup(selection, calculator, reporter)?;
    for_each_config("Submit", &confignames, reporter, |configname| {
        calculator.submit(&project.dir().configuration_dir(configname))
    })?;
    Ok(confignames)
}

/// Sets up, then runs every selected configuration in the foreground.
pub fn run(
    selection: &mut Selection,
    calculator: &dyn Calculator,
    reporter: &ProgressReporter,
) -> Result<Vec<String>> {
    let project = selection.project();
    let confignames = setup(selection, calculator, reporter)?;
    for_each_config("Run", &confignames, reporter, |configname| {
        calculator.run(&project.dir().configuration_dir(configname))
    })?;
    Ok(confignames)
}

fn for_each_config<F>(
    phase: &'static str,
    confignames: &[String],
    reporter: &ProgressReporter,
    mut step: F,
) -> Result<()>
where
    F: FnMut(&str) -> Result<()>,
{
    reporter.report(Progress::PhaseStart { name: phase });
    reporter.report(Progress::TaskStart {
        total_steps: confignames.len() as u64,
    });
    info!("{}: {} configuration(s)", phase, confignames.len());

    let result: Result<()> = confignames.iter().try_for_each(|configname| {
        step(configname.as_str()).inspect_err(|e| {
            reporter.report(Progress::Message(format!("{}: {}", configname, e)));
        })?;
        reporter.report(Progress::TaskIncrement {
            configname: configname.clone(),
        });
        Ok(())
    });

    // The bar is closed on failure too; the caller may exit right after.
    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);
    result
}

/// Extracts the properties of every selected configuration from its `run.final`
/// directory and writes them to `properties.calc.json`.
pub fn report(
    selection: &mut Selection,
    calculator: &dyn Calculator,
    outfilename: Option<&str>,
    reporter: &ProgressReporter,
) -> Result<ReportSummary> {
    let project = selection.project();
    let clex = project.default_clex();
    let confignames = selection.selected_confignames()?;

    reporter.report(Progress::PhaseStart { name: "Report" });
    reporter.report(Progress::TaskStart {
        total_steps: confignames.len() as u64,
    });

    let mut summary = ReportSummary::default();
    for configname in confignames {
        match report_one(project, clex, calculator, &configname, outfilename) {
            Ok(path) => {
                info!("Wrote {:?}", path);
                summary.written.push(path);
            }
            Err(error) => {
                warn!("Could not report properties of {}: {}", configname, error);
                reporter.report(Progress::Message(format!("{}: {}", configname, error)));
                summary.failures.push(ReportFailure {
                    configname: configname.clone(),
                    error,
                });
            }
        }
        reporter.report(Progress::TaskIncrement { configname });
    }

    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);
    Ok(summary)
}

fn report_one(
    project: &Project,
    clex: &ClexDescription,
    calculator: &dyn Calculator,
    configname: &str,
    outfilename: Option<&str>,
) -> Result<PathBuf> {
    let final_dir = project.dir().final_run_dir(configname, clex);
    if !final_dir.is_dir() {
        return Err(CasmError::NoFinalRun { path: final_dir });
    }

    let properties = calculator.properties(&final_dir, outfilename)?;
    let text = to_pretty_string(&Value::Object(properties));

    let output = project.dir().calculated_properties(configname, clex);
    write_atomically(&output, |w| {
        w.write_all(text.as_bytes())
            .map_err(|e| CasmError::io(&output, e))
    })?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::command::CommandOutput;
    use crate::testing::{CONFIGNAMES, MockRunner, TestProject};
    use std::fs;
    use std::sync::Mutex;

    fn selection_file(fixture: &TestProject, flags: [bool; 3]) -> String {
        let records: Vec<Value> = CONFIGNAMES
            .iter()
            .zip(flags)
            .map(|(name, on)| serde_json::json!({"configname": name, "selected": on}))
            .collect();
        let path = fixture.path("calc_sel.json");
        fs::write(&path, Value::Array(records).to_string()).unwrap();
        path.display().to_string()
    }

    fn wrapper_runner() -> MockRunner {
        MockRunner::new(|_, args| {
            if args.iter().any(|a| a == "--properties") {
                Ok(CommandOutput::ok(
                    r#"{"relaxed_energy": -4.25, "relaxed_basis": [[0.0, 0.0, 0.0], [0.5, 0.5, 0.5]]}"#,
                ))
            } else {
                Ok(CommandOutput::ok(""))
            }
        })
    }

    fn flags_of(runner: &MockRunner) -> Vec<(String, String)> {
        runner
            .calls()
            .into_iter()
            .map(|c| {
                let dir = PathBuf::from(&c.args[0]);
                let config = format!(
                    "{}/{}",
                    dir.parent().unwrap().file_name().unwrap().to_string_lossy(),
                    dir.file_name().unwrap().to_string_lossy()
                );
                (config, c.args[1].clone())
            })
            .collect()
    }

    #[test]
    fn setup_visits_only_selected_configurations() {
        let fixture = TestProject::new();
        let runner = wrapper_runner();
        let project = fixture.open_with(runner.clone());
        let path = selection_file(&fixture, [true, false, true]);
        let mut selection = Selection::new(&project, &path);
        let calculator = WrapperCalculator::new(&project, "vasp.relax");

        let done = setup(&mut selection, &calculator, &ProgressReporter::new()).unwrap();

        assert_eq!(done, vec![CONFIGNAMES[0], CONFIGNAMES[2]]);
        assert_eq!(
            flags_of(&runner),
            vec![
                (CONFIGNAMES[0].to_string(), "--setup".to_string()),
                (CONFIGNAMES[2].to_string(), "--setup".to_string()),
            ]
        );
        assert_eq!(
            PathBuf::from(&runner.calls()[0].args[0]),
            fixture.path("training_data").join(CONFIGNAMES[0])
        );
    }

    #[test]
    fn submit_and_run_set_up_first() {
        let fixture = TestProject::new();
        let path = selection_file(&fixture, [false, true, false]);

        let runner = wrapper_runner();
        let project = fixture.open_with(runner.clone());
        let mut selection = Selection::new(&project, &path);
        let calculator = WrapperCalculator::new(&project, "vasp.relax");
        submit(&mut selection, &calculator, &ProgressReporter::new()).unwrap();
        run(&mut selection, &calculator, &ProgressReporter::new()).unwrap();

        let flags: Vec<String> = flags_of(&runner).into_iter().map(|(_, f)| f).collect();
        assert_eq!(flags, vec!["--setup", "--submit", "--setup", "--run"]);
    }

    #[test]
    fn stage_failure_stops_the_batch() {
        let fixture = TestProject::new();
        let runner = MockRunner::new(|_, _| {
            Ok(CommandOutput {
                status: Some(1),
                stdout: String::new(),
                stderr: "missing POSCAR".to_string(),
            })
        });
        let project = fixture.open_with(runner.clone());
        let path = selection_file(&fixture, [true, true, true]);
        let mut selection = Selection::new(&project, &path);
        let calculator = WrapperCalculator::new(&project, "vasp.relax");

        let result = setup(&mut selection, &calculator, &ProgressReporter::new());

        assert!(matches!(result, Err(CasmError::CommandFailed { .. })));
        assert_eq!(runner.calls().len(), 1);
    }

    #[test]
    fn stage_failure_still_finishes_progress() {
        let fixture = TestProject::new();
        let project = fixture.open_with(MockRunner::new(|_, args| {
            if args[0].contains("SCEL2") {
                Ok(CommandOutput {
                    status: Some(1),
                    stdout: String::new(),
                    stderr: "missing POSCAR".to_string(),
                })
            } else {
                Ok(CommandOutput::ok(""))
            }
        }));
        let path = selection_file(&fixture, [true, true, true]);
        let mut selection = Selection::new(&project, &path);
        let calculator = WrapperCalculator::new(&project, "vasp.relax");

        let events = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|e| {
            events.lock().unwrap().push(e);
        }));
        let result = setup(&mut selection, &calculator, &reporter);
        drop(reporter);

        assert!(result.is_err());
        let events = events.into_inner().unwrap();
        assert_eq!(events.len(), 6);
        assert_eq!(
            events[2],
            Progress::TaskIncrement {
                configname: CONFIGNAMES[0].to_string()
            }
        );
        assert!(
            matches!(&events[3], Progress::Message(m) if m.starts_with(CONFIGNAMES[1])),
            "{:?}",
            events[3]
        );
        assert_eq!(
            &events[4..],
            &[Progress::TaskFinish, Progress::PhaseFinish]
        );
    }

    #[test]
    fn report_writes_properties_and_collects_failures() {
        let fixture = TestProject::new();
        let project = fixture.open_with(wrapper_runner());
        let clex = project.default_clex().clone();
        for name in &CONFIGNAMES[..2] {
            fs::create_dir_all(project.dir().final_run_dir(name, &clex)).unwrap();
        }
        let path = selection_file(&fixture, [true, false, true]);
        let mut selection = Selection::new(&project, &path);
        let calculator = WrapperCalculator::new(&project, "vasp.relax");

        let summary = report(&mut selection, &calculator, None, &ProgressReporter::new()).unwrap();

        let written = project.dir().calculated_properties(CONFIGNAMES[0], &clex);
        assert_eq!(summary.written, vec![written.clone()]);
        assert!(!summary.is_complete());
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].configname, CONFIGNAMES[2]);
        assert!(matches!(
            summary.failures[0].error,
            CasmError::NoFinalRun { .. }
        ));

        let text = fs::read_to_string(written).unwrap();
        assert_eq!(
            text,
            "{\n    \"relaxed_basis\": [\n        [0.0, 0.0, 0.0],\n        [0.5, 0.5, 0.5]\n    ],\n    \"relaxed_energy\": -4.25\n}\n"
        );
    }

    #[test]
    fn report_continues_after_extractor_failure() {
        let fixture = TestProject::new();
        let project = fixture.open_with(MockRunner::new(|_, args| {
            if args[0].contains("SCEL1") {
                Ok(CommandOutput {
                    status: Some(2),
                    stdout: String::new(),
                    stderr: "no OUTCAR".to_string(),
                })
            } else {
                Ok(CommandOutput::ok(r#"{"relaxed_energy": 1}"#))
            }
        }));
        let clex = project.default_clex().clone();
        for name in &CONFIGNAMES {
            fs::create_dir_all(project.dir().final_run_dir(name, &clex)).unwrap();
        }
        let path = selection_file(&fixture, [true, true, true]);
        let mut selection = Selection::new(&project, &path);
        let calculator = WrapperCalculator::new(&project, "vasp.relax");

        let summary = report(&mut selection, &calculator, None, &ProgressReporter::new()).unwrap();

        assert_eq!(summary.written.len(), 2);
        assert_eq!(summary.failures.len(), 1);
        assert!(matches!(
            summary.failures[0].error,
            CasmError::CommandFailed { .. }
        ));
    }

    #[test]
    fn execute_report_for_quantum_espresso_passes_outfilename() {
        let fixture = TestProject::new();
        let runner = wrapper_runner();
        let project = fixture.open_with(runner.clone());
        let clex = project.default_clex().clone();
        fs::create_dir_all(project.dir().final_run_dir(CONFIGNAMES[1], &clex)).unwrap();
        let settings_dir = project.dir().calc_settings_dir(&clex);
        fs::create_dir_all(&settings_dir).unwrap();
        fs::write(settings_dir.join("relax.json"), r#"{"outfilename": "pw.out"}"#).unwrap();

        let path = selection_file(&fixture, [false, true, false]);
        let mut selection = Selection::new(&project, &path);
        let config = CalcConfig::new(Software::QuantumEspresso, Method::Relax);

        let outcome = execute(
            &mut selection,
            &config,
            Action::Report,
            &ProgressReporter::new(),
        )
        .unwrap();

        assert!(matches!(outcome, CalcOutcome::Report(ref s) if s.is_complete()));
        let call = &runner.calls()[0];
        assert_eq!(call.program, "pw.relax");
        assert_eq!(&call.args[1..], &["--properties", "--outfilename", "pw.out"]);
    }

    #[test]
    fn execute_uses_configured_program() {
        let fixture = TestProject::new();
        let runner = wrapper_runner();
        let project = fixture.open_with(runner.clone());
        let path = selection_file(&fixture, [true, false, false]);
        let mut selection = Selection::new(&project, &path);
        let mut config = CalcConfig::new(Software::Vasp, Method::Neb);
        config.programs.set(Software::Vasp, Method::Neb, "my.neb");

        let outcome =
            execute(&mut selection, &config, Action::Setup, &ProgressReporter::new()).unwrap();

        assert!(matches!(outcome, CalcOutcome::Processed(ref names) if names.len() == 1));
        assert_eq!(runner.calls()[0].program, "my.neb");
    }

    #[test]
    fn workflow_reports_progress_per_configuration() {
        let fixture = TestProject::new();
        let project = fixture.open_with(wrapper_runner());
        let path = selection_file(&fixture, [true, true, false]);
        let mut selection = Selection::new(&project, &path);
        let calculator = WrapperCalculator::new(&project, "vasp.relax");

        let events = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|e| {
            events.lock().unwrap().push(e);
        }));
        setup(&mut selection, &calculator, &reporter).unwrap();
        drop(reporter);

        assert_eq!(
            events.into_inner().unwrap(),
            vec![
                Progress::PhaseStart { name: "Setup" },
                Progress::TaskStart { total_steps: 2 },
                Progress::TaskIncrement {
                    configname: CONFIGNAMES[0].to_string()
                },
                Progress::TaskIncrement {
                    configname: CONFIGNAMES[1].to_string()
                },
                Progress::TaskFinish,
                Progress::PhaseFinish,
            ]
        );
    }
}
