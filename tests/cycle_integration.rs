//! Integration tests for extraction cycles
//!
//! These tests run real cycles against a fake `splunk` executable written
//! into a temporary install directory, with file-backed state and output.
#![cfg(unix)]

use splunk_consumer::config::{Configuration, OutputFormat};
use splunk_consumer::etl::{CycleOutcome, ExtractionCycle};
use splunk_consumer::schedule::{Schedule, run_schedule};
use splunk_consumer::state::{COUNTER_KEY, CycleStateManager, FileStateStore, Scope, StateStore};
use splunk_consumer::{DirectoryEmitter, ShellRunner};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

/// Install a fake `splunk` that records its arguments and runs `body`
fn fake_splunk(install: &Path, body: &str) {
    let bin = install.join("bin");
    std::fs::create_dir_all(&bin).unwrap();
    let script = bin.join("splunk");
    let content = format!(
        "#!/bin/sh\nprintf '%s\\n' \"$@\" > \"{}\"\n{}\n",
        install.join("args.txt").display(),
        body
    );
    std::fs::write(&script, content).unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
}

fn recorded_args(install: &Path) -> Vec<String> {
    std::fs::read_to_string(install.join("args.txt"))
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

struct Fixture {
    _temp: TempDir,
    install: PathBuf,
    out: PathBuf,
    state: PathBuf,
}

impl Fixture {
    fn new(body: &str) -> Self {
        let temp = TempDir::new().unwrap();
        let install = temp.path().join("splunk");
        fake_splunk(&install, body);
        Self {
            install,
            out: temp.path().join("out"),
            state: temp.path().join("state"),
            _temp: temp,
        }
    }

    /// Install path with a trailing slash, as users often configure it
    fn install_path(&self) -> String {
        format!("{}/", self.install.display())
    }

    fn cycle(
        &self,
        config: Configuration,
    ) -> ExtractionCycle<FileStateStore, ShellRunner, DirectoryEmitter> {
        ExtractionCycle::new(
            config,
            CycleStateManager::load(FileStateStore::new(&self.state)),
            ShellRunner::new(),
            DirectoryEmitter::new(&self.out).unwrap(),
        )
    }

    fn stored_counter(&self) -> Option<String> {
        FileStateStore::new(&self.state)
            .get(Scope::Cluster)
            .unwrap()
            .get(COUNTER_KEY)
            .cloned()
    }

    fn emitted_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(&self.out)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

#[tokio::test]
async fn test_json_export_end_to_end() {
    let fixture = Fixture::new("printf '{\"host\":\"web-1\"}\\n'");
    let config = Configuration::builder(fixture.install_path(), "main")
        .output_format(OutputFormat::Json)
        .build()
        .unwrap();

    let mut cycle = fixture.cycle(config);
    let report = cycle.run_once().await;

    assert_eq!(report.number, 1);
    assert!(report.committed);
    assert_eq!(report.outcome, CycleOutcome::Emitted { bytes: 17 });

    // search "index=main" -output json, no optional suffix
    assert_eq!(
        recorded_args(&fixture.install),
        vec!["search", "index=main", "-output", "json"]
    );

    assert_eq!(
        fixture.emitted_files(),
        vec!["main-1.json", "main-1.json.attributes.json"]
    );
    let body = std::fs::read_to_string(fixture.out.join("main-1.json")).unwrap();
    assert_eq!(body, "{\"host\":\"web-1\"}\n");
    assert_eq!(fixture.stored_counter(), Some("1".to_string()));
}

#[tokio::test]
async fn test_optional_arguments_reach_tool() {
    let fixture = Fixture::new("printf 'x\\n'");
    let config = Configuration::builder(fixture.install_path(), "security")
        .max_output(50)
        .earliest("-24h@h")
        .username("exporter")
        .password("changeme")
        .build()
        .unwrap();

    let mut cycle = fixture.cycle(config);
    assert!(cycle.run_once().await.outcome.is_emitted());

    assert_eq!(
        recorded_args(&fixture.install),
        vec![
            "search",
            "index=earliest=-24h@h",
            "-output",
            "csv",
            "-maxout",
            "50",
            "-auth",
            "exporter:changeme",
        ]
    );
}

#[tokio::test]
async fn test_tool_error_emits_nothing_but_advances_counter() {
    let fixture = Fixture::new("printf 'leftover\\n'; echo 'Unknown search command' >&2");
    let config = Configuration::builder(fixture.install_path(), "main")
        .build()
        .unwrap();

    let mut cycle = fixture.cycle(config);
    let report = cycle.run_once().await;

    assert_eq!(
        report.outcome,
        CycleOutcome::ToolFailure("Unknown search command".to_string())
    );
    assert!(fixture.emitted_files().is_empty());
    assert_eq!(fixture.stored_counter(), Some("1".to_string()));
}

#[tokio::test]
async fn test_empty_result_emits_nothing_but_advances_counter() {
    let fixture = Fixture::new("true");
    let config = Configuration::builder(fixture.install_path(), "main")
        .build()
        .unwrap();

    let mut cycle = fixture.cycle(config);
    let report = cycle.run_once().await;

    assert_eq!(report.outcome, CycleOutcome::Empty);
    assert!(fixture.emitted_files().is_empty());
    assert_eq!(fixture.stored_counter(), Some("1".to_string()));
}

#[tokio::test]
async fn test_missing_binary_is_launch_failure() {
    let fixture = Fixture::new("true");
    let config = Configuration::builder(fixture.out.display().to_string(), "main")
        .build()
        .unwrap();

    let mut cycle = fixture.cycle(config);
    let report = cycle.run_once().await;

    assert!(matches!(report.outcome, CycleOutcome::LaunchFailure(_)));
    assert_eq!(report.number, 1);
}

#[tokio::test]
async fn test_password_not_leaked_in_failures() {
    let fixture = Fixture::new("echo \"Login failed: $6\" >&2");
    let config = Configuration::builder(fixture.install_path(), "main")
        .username("admin")
        .password("hunter2")
        .build()
        .unwrap();

    let mut cycle = fixture.cycle(config);
    let report = cycle.run_once().await;

    let CycleOutcome::ToolFailure(message) = &report.outcome else {
        panic!("expected tool failure, got {:?}", report.outcome);
    };
    assert!(!message.contains("hunter2"));
    assert!(message.contains("***"));
}

#[tokio::test]
async fn test_timeout_is_launch_failure() {
    let fixture = Fixture::new("sleep 5");
    let config = Configuration::builder(fixture.install_path(), "main")
        .build()
        .unwrap();

    let mut cycle = ExtractionCycle::new(
        config,
        CycleStateManager::load(FileStateStore::new(&fixture.state)),
        ShellRunner::new().with_timeout(Duration::from_millis(200)),
        DirectoryEmitter::new(&fixture.out).unwrap(),
    );
    let report = cycle.run_once().await;

    assert!(matches!(report.outcome, CycleOutcome::LaunchFailure(_)));
}

#[tokio::test]
async fn test_counter_survives_restart() {
    let fixture = Fixture::new("printf 'row\\n'");
    let config = Configuration::builder(fixture.install_path(), "main")
        .build()
        .unwrap();

    let mut first = fixture.cycle(config.clone());
    let schedule = Schedule::every(Duration::from_millis(5)).with_max_cycles(2);
    let summary = run_schedule(&mut first, schedule, std::future::pending(), |_| {}).await;
    assert_eq!(summary.emitted, 2);
    drop(first);

    let mut second = fixture.cycle(config);
    assert_eq!(second.run_once().await.number, 3);
    assert_eq!(fixture.stored_counter(), Some("3".to_string()));
    assert!(fixture.emitted_files().contains(&"main-3.csv".to_string()));
}

#[tokio::test]
async fn test_unwritable_state_still_counts() {
    let fixture = Fixture::new("printf 'row\\n'");
    // A regular file where the state directory should be makes every commit fail
    std::fs::write(&fixture.state, "not a directory").unwrap();

    let config = Configuration::builder(fixture.install_path(), "main")
        .build()
        .unwrap();
    let mut cycle = fixture.cycle(config);

    let schedule = Schedule::every(Duration::from_millis(5)).with_max_cycles(4);
    let mut numbers = Vec::new();
    let summary = run_schedule(&mut cycle, schedule, std::future::pending(), |r| {
        numbers.push(r.number)
    })
    .await;

    assert_eq!(numbers, vec![1, 2, 3, 4]);
    assert_eq!(summary.uncommitted, 4);
    assert_eq!(summary.emitted, 4);
    assert_eq!(cycle.state().state().committed(), None);
}
