//! Fixtures shared by the unit tests: a throwaway project tree and a recording
//! stand-in for the `casm` executable.

use crate::error::Result;
use crate::project::Project;
use crate::project::command::{CommandOutput, CommandRunner};
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::{TempDir, tempdir};

pub const CONFIGNAMES: [&str; 3] = [
    "SCEL1_1_1_1_0_0_0/0",
    "SCEL2_1_2_1_0_0_0/0",
    "SCEL2_1_2_1_0_0_0/1",
];

impl CommandOutput {
    pub fn ok(stdout: &str) -> Self {
        Self {
            status: Some(0),
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

type Handler = dyn Fn(&str, &[String]) -> Result<CommandOutput>;

#[derive(Clone)]
pub struct MockRunner {
    handler: Arc<Handler>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockRunner {
    pub fn new(handler: impl Fn(&str, &[String]) -> Result<CommandOutput> + 'static) -> Self {
        Self {
            handler: Arc::new(handler),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, program: &str, args: &[String], cwd: &Path) -> Result<CommandOutput> {
        self.calls.lock().unwrap().push(RecordedCall {
            program: program.to_string(),
            args: args.to_vec(),
            cwd: cwd.to_path_buf(),
        });
        (self.handler)(program, args)
    }
}

pub struct TestProject {
    dir: TempDir,
}

impl TestProject {
    /// A project with three configurations; only the first is selected.
    pub fn new() -> Self {
        let dir = tempdir().unwrap();
        let casm_dir = dir.path().join(".casm");
        fs::create_dir_all(&casm_dir).unwrap();
        fs::write(
            casm_dir.join("project_settings.json"),
            r#"{"name": "test_proj", "default_clex": {"calctype": "default"}}"#,
        )
        .unwrap();
        let config_list = json!({
            "supercells": {
                "SCEL1_1_1_1_0_0_0": {
                    "0": {"selected": true, "source": "enumerated"}
                },
                "SCEL2_1_2_1_0_0_0": {
                    "0": {"selected": false, "source": "enumerated"},
                    "1": {"selected": false, "source": "enumerated"}
                }
            }
        });
        fs::write(
            casm_dir.join("config_list.json"),
            serde_json::to_string(&config_list).unwrap(),
        )
        .unwrap();
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    pub fn open_with(&self, runner: MockRunner) -> Project {
        Project::open(self.root()).unwrap().with_runner(runner)
    }

    pub fn config_list(&self) -> Value {
        let content = fs::read_to_string(self.path(".casm/config_list.json")).unwrap();
        serde_json::from_str(&content).unwrap()
    }

    pub fn is_selected(&self, configname: &str) -> bool {
        let (scel, id) = configname.split_once('/').unwrap();
        self.config_list()["supercells"][scel][id]["selected"]
            .as_bool()
            .unwrap()
    }

    /// Answers `casm query` for the master list from the on-disk configuration list.
    pub fn master_query_runner(&self) -> MockRunner {
        let list_path = self.path(".casm/config_list.json");
        MockRunner::new(move |_, args| {
            let content = fs::read_to_string(&list_path).unwrap();
            let list: Value = serde_json::from_str(&content).unwrap();
            let mut records = Vec::new();
            for (scel, configs) in list["supercells"].as_object().unwrap() {
                for (id, config) in configs.as_object().unwrap() {
                    let mut record = serde_json::Map::new();
                    record.insert("configname".into(), json!(format!("{}/{}", scel, id)));
                    record.insert(
                        "selected".into(),
                        json!(if config["selected"].as_bool().unwrap() { 1 } else { 0 }),
                    );
                    if args.iter().any(|a| a == "scel_size") {
                        let size: u64 = scel
                            .trim_start_matches("SCEL")
                            .split('_')
                            .next()
                            .and_then(|s| s.parse().ok())
                            .unwrap();
                        record.insert("scel_size".into(), json!(size));
                    }
                    records.push(Value::Object(record));
                }
            }
            Ok(CommandOutput::ok(&Value::Array(records).to_string()))
        })
    }
}
