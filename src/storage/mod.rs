//! Flow file sinks
//!
//! This module handles where emitted data ends up:
//! - One file per flow file in an output directory
//! - Standard output

mod directory;
mod stdout;

pub use directory::DirectoryEmitter;
pub use stdout::StdoutEmitter;
