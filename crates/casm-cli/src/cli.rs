use casm::calc::{Method, Software};
use casm::selection::ConfigType;
use casm::workflows::calc::Action;
use clap::{Args, Parser, ValueEnum};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    name = "casm-calc",
    author = "CASM Developers",
    version,
    about = "casm-calc - Set up, submit, run and report calculations for the selected configurations of a CASM project.",
    help_template = HELP_TEMPLATE,
)]
pub struct Cli {
    /// Selection of configurations: MASTER, ALL, CALCULATED or a selection file
    #[arg(short = 'c', long = "configs", default_value = "MASTER", value_name = "SELECTION")]
    pub configs: String,

    /// Type of the configurations in the selection
    #[arg(short = 't', long = "type", value_enum, default_value_t = ConfigTypeArg::Config)]
    pub config_type: ConfigTypeArg,

    /// Calculator package used for the calculations
    #[arg(short = 'w', long, value_enum, default_value_t = SoftwareArg::Vasp)]
    pub software: SoftwareArg,

    /// Calculation method
    #[arg(short, long, value_enum, default_value_t = MethodArg::Relax)]
    pub method: MethodArg,

    /// Path inside the CASM project. Defaults to the current directory.
    #[arg(long, value_name = "PATH")]
    pub path: Option<PathBuf>,

    #[command(flatten)]
    pub action: ActionFlags,

    /// Path to a configuration file in TOML format.
    #[arg(long = "settings", value_name = "PATH")]
    pub settings: Option<PathBuf>,

    /// Set a specific configuration value, overriding the configuration file.
    /// Can be used multiple times. Example: -S report.outfilename=pw.out
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE")]
    pub set_values: Vec<String>,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// The action to perform. At most one may be given.
#[derive(Args, Debug, Clone, Copy)]
#[group(required = false, multiple = false)]
pub struct ActionFlags {
    /// Setup calculations for the selected configurations
    #[arg(long)]
    pub setup: bool,
    /// Submit calculations for the selected configurations
    #[arg(long)]
    pub submit: bool,
    /// Run calculations for the selected configurations in the foreground
    #[arg(long)]
    pub run: bool,
    /// Report calculated properties of the selected configurations
    #[arg(long)]
    pub report: bool,
}

impl ActionFlags {
    pub fn action(&self) -> Option<Action> {
        if self.setup {
            Some(Action::Setup)
        } else if self.submit {
            Some(Action::Submit)
        } else if self.run {
            Some(Action::Run)
        } else if self.report {
            Some(Action::Report)
        } else {
            None
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigTypeArg {
    Config,
    #[value(name = "diff_trans")]
    DiffTrans,
    #[value(name = "diff_trans_config")]
    DiffTransConfig,
    Scel,
}

impl From<ConfigTypeArg> for ConfigType {
    fn from(arg: ConfigTypeArg) -> Self {
        match arg {
            ConfigTypeArg::Config => ConfigType::Config,
            ConfigTypeArg::DiffTrans => ConfigType::DiffTrans,
            ConfigTypeArg::DiffTransConfig => ConfigType::DiffTransConfig,
            ConfigTypeArg::Scel => ConfigType::Scel,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoftwareArg {
    Vasp,
    #[value(
        name = "quantum-espresso",
        aliases = ["quantumespresso", "quantumexpresso", "qe"]
    )]
    QuantumEspresso,
}

impl From<SoftwareArg> for Software {
    fn from(arg: SoftwareArg) -> Self {
        match arg {
            SoftwareArg::Vasp => Software::Vasp,
            SoftwareArg::QuantumEspresso => Software::QuantumEspresso,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodArg {
    Relax,
    Neb,
}

impl From<MethodArg> for Method {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::Relax => Method::Relax,
            MethodArg::Neb => Method::Neb,
        }
    }
}
