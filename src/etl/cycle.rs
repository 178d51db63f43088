//! Extraction cycle orchestration
//!
//! One cycle:
//! 1. Advance and commit the cycle counter
//! 2. Build the search command from the configuration
//! 3. Run the search and classify the result
//! 4. Emit one flow file on success, report otherwise
//!
//! A cycle never returns an error and never emits more than one flow file.

use super::{Emitter, Extractor, FlowFile};
use crate::config::Configuration;
use crate::error::ConfigError;
use crate::search::{CommandRunner, ExtractionResult, SearchCommand, SearchExtractor};
use crate::state::{CycleStateManager, StateStore};

/// What a single cycle ended with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// One flow file of `bytes` bytes was emitted on `success`
    Emitted { bytes: usize },
    /// The search returned no data; nothing emitted
    Empty,
    /// The command could not be built; the search never ran
    ///
    /// A validated [`Configuration`] already enforces the username and
    /// password pairing, so cycles built from one never produce this.
    ConfigurationError(ConfigError),
    /// The search tool reported an error
    ToolFailure(String),
    /// The search tool could not be started or was killed
    LaunchFailure(String),
    /// Data was extracted but the emitter rejected it
    EmitFailure(String),
}

impl CycleOutcome {
    pub fn is_emitted(&self) -> bool {
        matches!(self, Self::Emitted { .. })
    }

    /// Failures, as opposed to success or a clean empty result
    pub fn is_failure(&self) -> bool {
        !matches!(self, Self::Emitted { .. } | Self::Empty)
    }
}

impl std::fmt::Display for CycleOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Emitted { bytes } => write!(f, "emitted {} byte(s)", bytes),
            Self::Empty => write!(f, "no data"),
            Self::ConfigurationError(e) => write!(f, "configuration error: {}", e),
            Self::ToolFailure(msg) => write!(f, "search failed: {}", msg),
            Self::LaunchFailure(msg) => write!(f, "search could not run: {}", msg),
            Self::EmitFailure(msg) => write!(f, "emit failed: {}", msg),
        }
    }
}

/// Report for one finished cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// Counter value assigned to the cycle
    pub number: u64,
    /// Whether the counter reached the durable store
    pub committed: bool,
    pub outcome: CycleOutcome,
}

/// Runs extraction cycles against one configuration
///
/// # Type Parameters
/// - `S`: State store for the cycle counter
/// - `R`: Runner for the search command
/// - `E`: Destination for emitted flow files
pub struct ExtractionCycle<S, R, E> {
    config: Configuration,
    state: CycleStateManager<S>,
    runner: R,
    emitter: E,
}

impl<S, R, E> ExtractionCycle<S, R, E>
where
    S: StateStore,
    R: CommandRunner,
    E: Emitter,
{
    /// Create a cycle controller
    ///
    /// `state` should have been loaded when the schedule started.
    pub fn new(config: Configuration, state: CycleStateManager<S>, runner: R, emitter: E) -> Self {
        Self {
            config,
            state,
            runner,
            emitter,
        }
    }

    /// Run exactly one cycle
    pub async fn run_once(&mut self) -> CycleReport {
        let ticket = self.state.advance();
        log::debug!("Starting cycle {}", ticket.number);

        let outcome = self.extract_and_emit(ticket.number).await;

        match &outcome {
            CycleOutcome::Emitted { .. } => log::info!("Cycle {}: {}", ticket.number, outcome),
            CycleOutcome::Empty => log::warn!("Cycle {}: {}", ticket.number, outcome),
            _ => log::error!("Cycle {}: {}", ticket.number, outcome),
        }

        CycleReport {
            number: ticket.number,
            committed: ticket.committed,
            outcome,
        }
    }

    async fn extract_and_emit(&self, number: u64) -> CycleOutcome {
        let command = match SearchCommand::from_config(&self.config) {
            Ok(command) => command,
            Err(e) => return CycleOutcome::ConfigurationError(e),
        };

        let extractor = SearchExtractor::new(&self.runner, command);
        let result = match extractor.extract().await {
            Ok(result) => result,
            Err(e) => ExtractionResult::LaunchFailure {
                message: e.to_string(),
            },
        };

        match result {
            ExtractionResult::Emitted { content } => {
                let flowfile = self.flowfile(number, content);
                let bytes = flowfile.size();
                match self.emitter.emit(flowfile).await {
                    Ok(()) => CycleOutcome::Emitted { bytes },
                    Err(e) => CycleOutcome::EmitFailure(format!("{:#}", e)),
                }
            }
            ExtractionResult::Empty => CycleOutcome::Empty,
            ExtractionResult::ToolFailure { message } => CycleOutcome::ToolFailure(message),
            ExtractionResult::LaunchFailure { message } => CycleOutcome::LaunchFailure(message),
        }
    }

    fn flowfile(&self, number: u64, content: Vec<u8>) -> FlowFile {
        let format = self.config.output_format();
        let filename = format!(
            "{}-{}.{}",
            sanitize(self.config.index()),
            number,
            format.extension()
        );

        FlowFile::success(content)
            .with_attribute("filename", filename)
            .with_attribute("mime.type", format.mime_type())
            .with_attribute("splunk.index", self.config.index())
            .with_attribute("flowfile.number", number.to_string())
            .with_attribute("extracted.at", chrono::Utc::now().to_rfc3339())
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn state(&self) -> &CycleStateManager<S> {
        &self.state
    }

    pub fn emitter(&self) -> &E {
        &self.emitter
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }
}

/// Keep index names usable as file names
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' | '.' => c,
            _ => '_',
        })
        .collect()
}
