//! Splunk search: query construction and execution
//!
//! [`SearchCommand`] turns a configuration into the `splunk search` command
//! line; [`SearchExtractor`] runs it through a [`CommandRunner`] and
//! classifies the result.

mod auth;
mod command;
mod extractor;
mod filter;
mod runner;

pub use auth::Auth;
pub use command::{SearchCommand, SearchCommandBuilder, TOOL};
pub use extractor::{ExtractionResult, SearchExtractor};
pub use filter::SearchFilter;
pub use runner::{CommandRunner, ProcessOutput, ShellRunner};
