use super::defaults::DefaultsConfig;
use super::file::{FileConfig, FileMethodPrograms};
use super::models::AppConfig;
use crate::cli::Cli;
use crate::error::{CliError, Result};
use casm::calc::{CalculatorPrograms, Method, Software};
use casm::workflows::calc::CalcConfig;
use std::path::PathBuf;

pub fn build_config(cli: &Cli) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = if let Some(path) = &cli.settings {
        FileConfig::from_file(path)?
    } else {
        FileConfig::default()
    };
    let file_config = apply_set_values(file_config, &cli.set_values)?;

    let project_path = match &cli.path {
        Some(path) => path.clone(),
        None => std::env::current_dir()?,
    };

    let mut calc = CalcConfig::new(cli.software.into(), cli.method.into());
    calc.programs = merge_programs(&file_config);
    calc.default_outfilename = file_config
        .report
        .and_then(|r| r.outfilename)
        .unwrap_or(defaults.report_outfilename);

    Ok(AppConfig {
        project_path,
        selection: cli.configs.clone(),
        config_type: cli.config_type.into(),
        action: cli.action.action(),
        casm_executable: file_config
            .casm_executable
            .unwrap_or(defaults.casm_executable),
        calc,
    })
}

fn merge_programs(file_config: &FileConfig) -> CalculatorPrograms {
    let mut programs = CalculatorPrograms::new();
    let Some(calculators) = &file_config.calculators else {
        return programs;
    };

    let sections = [
        (Software::Vasp, &calculators.vasp),
        (Software::QuantumEspresso, &calculators.quantum_espresso),
    ];
    for (software, section) in sections {
        let Some(section) = section else { continue };
        if let Some(program) = &section.relax {
            programs.set(software, Method::Relax, program.clone());
        }
        if let Some(program) = &section.neb {
            programs.set(software, Method::Neb, program.clone());
        }
    }
    programs
}

fn apply_set_values(mut file_config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let (key, value) = kv_pair.split_once('=').ok_or_else(|| {
            CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            ))
        })?;
        if value.is_empty() {
            return Err(CliError::Config(format!("Empty value for {}", key)));
        }

        match key.split('.').collect::<Vec<_>>().as_slice() {
            ["casm-executable"] => file_config.casm_executable = Some(value.to_string()),
            ["report", "outfilename"] => {
                file_config
                    .report
                    .get_or_insert_with(Default::default)
                    .outfilename = Some(value.to_string());
            }
            ["calculators", software, method] => {
                let software: Software = software.parse().map_err(|_| {
                    CliError::Config(format!("Unknown calculator software in '{}'", key))
                })?;
                let method: Method = method.parse().map_err(|_| {
                    CliError::Config(format!("Unknown calculation method in '{}'", key))
                })?;

                let calculators = file_config
                    .calculators
                    .get_or_insert_with(Default::default);
                let section = match software {
                    Software::Vasp => &mut calculators.vasp,
                    Software::QuantumEspresso => &mut calculators.quantum_espresso,
                }
                .get_or_insert_with(FileMethodPrograms::default);
                match method {
                    Method::Relax => section.relax = Some(value.to_string()),
                    Method::Neb => section.neb = Some(value.to_string()),
                }
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(file_config)
}
