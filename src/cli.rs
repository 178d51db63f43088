//! CLI helper functions

use crate::{
    config::{Configuration, Properties},
    etl::{CycleReport, Emitter, ExtractionCycle, FlowFile},
    schedule::{Schedule, ScheduleSummary, run_schedule},
    search::{SearchCommand, ShellRunner},
    state::{COUNTER_KEY, CycleStateManager, FileStateStore, Scope, StateStore},
    storage::{DirectoryEmitter, StdoutEmitter},
};
use eyre::{Context, Result};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Properties file read when `--config` is not given
pub const DEFAULT_CONFIG: &str = "consumer.yml";

/// Load connector properties
///
/// Expected sources, lowest precedence first:
/// - The YAML properties file at `path` (optional unless `required`)
/// - Environment variables: SPLUNK_HOME, SPLUNK_INDEX, SPLUNK_OUTPUT_FORMAT,
///   SPLUNK_MAX_OUTPUT, SPLUNK_EARLIEST, SPLUNK_LATEST, SPLUNK_USERNAME,
///   SPLUNK_PASSWORD, SPLUNK_FILTER_MODE
pub fn load_properties(path: impl AsRef<Path>, required: bool) -> Result<Properties> {
    let path = path.as_ref();
    let file = if path.exists() {
        log::debug!("Loading properties from {}", path.display());
        Properties::read(path)?
    } else if required {
        eyre::bail!("Properties file not found: {}", path.display());
    } else {
        Properties::default()
    };

    Ok(file.overlay(Properties::from_env()))
}

/// Load and validate the connector configuration
pub fn load_configuration(path: impl AsRef<Path>, required: bool) -> Result<Configuration> {
    let props = load_properties(path, required)?;
    Configuration::from_properties(&props).context("Invalid connector configuration")
}

/// Build the search command without running it, password masked
pub fn preview_command(config: &Configuration) -> Result<String> {
    let command = SearchCommand::from_config(config).context("Failed to build search command")?;
    Ok(command.redacted())
}

/// Read the stored cycle counter, if any
pub fn read_counter(state_dir: impl AsRef<Path>) -> Result<Option<u64>> {
    let store = FileStateStore::new(state_dir);
    let state = store.get(Scope::Cluster)?;
    state
        .get(COUNTER_KEY)
        .map(|v| {
            v.parse::<u64>()
                .with_context(|| format!("Stored {} is not a number: {}", COUNTER_KEY, v))
        })
        .transpose()
}

/// Remove the stored cycle counter
pub fn reset_counter(state_dir: impl AsRef<Path>) -> Result<()> {
    let store = FileStateStore::new(state_dir);
    store.clear(Scope::Cluster)?;
    log::info!("✓ Cleared {} in {}", COUNTER_KEY, store.dir().display());
    Ok(())
}

/// Write a properties template, refusing to overwrite an existing file
pub fn init_properties(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if path.exists() {
        eyre::bail!("Refusing to overwrite existing file: {}", path.display());
    }
    Properties::write_template(path)?;
    log::info!("✓ Wrote properties template to {}", path.display());
    Ok(())
}

/// Options for `run`
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub schedule: Schedule,
    /// Write flow files here; `None` writes them to stdout
    pub output_dir: Option<PathBuf>,
    pub state_dir: PathBuf,
    pub timeout: Option<Duration>,
}

/// Destination chosen on the command line
enum Sink {
    Directory(DirectoryEmitter),
    Stdout(StdoutEmitter),
}

impl Emitter for Sink {
    async fn emit(&self, flowfile: FlowFile) -> Result<()> {
        match self {
            Self::Directory(emitter) => emitter.emit(flowfile).await,
            Self::Stdout(emitter) => emitter.emit(flowfile).await,
        }
    }
}

/// Run extraction cycles until the schedule finishes or Ctrl-C
pub async fn run_consumer(config: Configuration, options: RunOptions) -> Result<ScheduleSummary> {
    let store = FileStateStore::new(&options.state_dir);
    let state = CycleStateManager::load(store);
    log::info!(
        "Schedule started at {} = {}",
        COUNTER_KEY,
        state.state().observed()
    );

    let mut runner = ShellRunner::new();
    if let Some(timeout) = options.timeout {
        runner = runner.with_timeout(timeout);
    }

    let sink = match &options.output_dir {
        Some(dir) => Sink::Directory(
            DirectoryEmitter::new(dir)
                .with_context(|| format!("Failed to create output directory: {}", dir.display()))?,
        ),
        None => Sink::Stdout(StdoutEmitter::new()),
    };

    log::info!(
        "Consuming index {} as {}",
        config.index().cyan(),
        config.output_format().bright_black()
    );

    let mut cycle = ExtractionCycle::new(config, state, runner, sink);
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let summary = run_schedule(&mut cycle, options.schedule, shutdown, print_report).await;

    log::info!(
        "Finished {} cycle(s): {} emitted, {} empty, {} failed",
        summary.cycles,
        summary.emitted.green(),
        summary.empty.yellow(),
        summary.failed.red()
    );
    if summary.uncommitted > 0 {
        log::warn!(
            "{} cycle(s) could not persist {}",
            summary.uncommitted,
            COUNTER_KEY
        );
    }

    Ok(summary)
}

fn print_report(report: &CycleReport) {
    let number = format!("#{}", report.number);
    if report.outcome.is_emitted() {
        log::info!("{} {}", number.bright_black(), report.outcome.green());
    } else if report.outcome.is_failure() {
        log::error!("{} {}", number.bright_black(), report.outcome.red());
    } else {
        log::warn!("{} {}", number.bright_black(), report.outcome.yellow());
    }
}
