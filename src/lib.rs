//! Splunk Consumer
//!
//! A scheduled connector that exports a Splunk index through the `splunk`
//! CLI and emits the result downstream, keeping a durable cycle counter.

pub mod cli;
pub mod config;
pub mod error;
pub mod etl;
pub mod schedule;
pub mod search;
pub mod state;
pub mod storage;

// Re-exports for convenience
pub use config::{Configuration, OutputFormat, Properties};
pub use error::{ConfigError, StateError};
pub use etl::{CycleOutcome, CycleReport, Emitter, ExtractionCycle, Extractor, FlowFile};
pub use search::{CommandRunner, ExtractionResult, SearchCommand, ShellRunner};
pub use state::{CycleStateManager, FileStateStore, MemoryStateStore, StateStore};
pub use storage::{DirectoryEmitter, StdoutEmitter};
