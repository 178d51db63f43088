//! Search extractor
//!
//! Runs a built [`SearchCommand`] and classifies what came back.

use super::{CommandRunner, ProcessOutput, SearchCommand};
use crate::config::Secret;
use crate::etl::Extractor;

use eyre::Result;
use regex::Regex;
use std::io;
use std::sync::LazyLock;

/// What `sh` prints when it cannot run the command it was given
static SHELL_LAUNCH_ERROR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)not found|no such file or directory|permission denied|cannot execute|is a directory")
        .expect("valid regex")
});

/// Outcome of one search run. Exactly one per cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionResult {
    /// The search produced data
    Emitted { content: Vec<u8> },
    /// The search ran cleanly but returned nothing
    Empty,
    /// The search tool ran and reported an error
    ToolFailure { message: String },
    /// The search tool could not be started, or was killed
    LaunchFailure { message: String },
}

impl ExtractionResult {
    /// Classify a finished (or failed) process run
    ///
    /// Any occurrence of `secret` in the reported text is masked.
    pub fn classify(run: io::Result<ProcessOutput>, secret: Option<&Secret>) -> Self {
        let scrub = |text: &str| match secret {
            Some(secret) => secret.scrub(text),
            None => text.to_string(),
        };

        let output = match run {
            Ok(output) => output,
            Err(e) => {
                return Self::LaunchFailure {
                    message: scrub(&e.to_string()),
                };
            }
        };

        let stderr = output.stderr.trim();
        match output.code {
            None => Self::LaunchFailure {
                message: "search process was terminated by a signal".to_string(),
            },
            // The shell started but could not find or execute the tool
            Some(126 | 127) if SHELL_LAUNCH_ERROR.is_match(stderr) => Self::LaunchFailure {
                message: scrub(stderr),
            },
            Some(_) if !output.stderr.is_empty() => Self::ToolFailure {
                message: scrub(stderr),
            },
            Some(code) if code != 0 => Self::ToolFailure {
                message: format!("search exited with status {}", code),
            },
            Some(_) if output.stdout.is_empty() => Self::Empty,
            Some(_) => Self::Emitted {
                content: output.stdout,
            },
        }
    }

    pub fn is_emitted(&self) -> bool {
        matches!(self, Self::Emitted { .. })
    }

    /// Short label used in logs and reports
    pub fn label(&self) -> &'static str {
        match self {
            Self::Emitted { .. } => "emitted",
            Self::Empty => "empty",
            Self::ToolFailure { .. } => "tool failure",
            Self::LaunchFailure { .. } => "launch failure",
        }
    }
}

/// Extractor that runs one search through a [`CommandRunner`]
///
/// # Example
/// ```no_run
/// use splunk_consumer::config::Configuration;
/// use splunk_consumer::etl::Extractor;
/// use splunk_consumer::search::{SearchCommand, SearchExtractor, ShellRunner};
///
/// # async fn example() -> eyre::Result<()> {
/// let config = Configuration::builder("/opt/splunk", "main").build()?;
/// let command = SearchCommand::from_config(&config)?;
/// let runner = ShellRunner::new();
///
/// let result = SearchExtractor::new(&runner, command).extract().await?;
/// println!("search {}", result.label());
/// # Ok(())
/// # }
/// ```
pub struct SearchExtractor<'a, R> {
    runner: &'a R,
    command: SearchCommand,
}

impl<'a, R: CommandRunner> SearchExtractor<'a, R> {
    pub fn new(runner: &'a R, command: SearchCommand) -> Self {
        Self { runner, command }
    }
}

impl<R: CommandRunner> Extractor for SearchExtractor<'_, R> {
    type Output = ExtractionResult;

    async fn extract(&self) -> Result<Self::Output> {
        log::debug!("Running search: {}", self.command.redacted());

        let run = self.runner.run(&self.command.to_shell()).await;
        let result = ExtractionResult::classify(run, self.command.secret());

        match &result {
            ExtractionResult::Emitted { content } => {
                log::info!("Exported {} byte(s) from Splunk", content.len());
            }
            ExtractionResult::Empty => {
                log::warn!("Search returned no data. Please verify configuration");
            }
            ExtractionResult::ToolFailure { message } => {
                log::error!("Failed to export data from Splunk: {}", message);
            }
            ExtractionResult::LaunchFailure { message } => {
                log::error!("Failed to launch Splunk search: {}", message);
            }
        }

        Ok(result)
    }
}
