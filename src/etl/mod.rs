//! Core extraction abstractions
//!
//! This module provides the trait definitions for pulling data from a
//! source and handing it downstream, plus the controller that runs one
//! extraction cycle end to end.

mod cycle;
mod emit;
mod extract;

pub use cycle::{CycleOutcome, CycleReport, ExtractionCycle};
pub use emit::{Emitter, FlowFile, Relationship};
pub use extract::Extractor;
