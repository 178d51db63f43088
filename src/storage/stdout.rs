//! Standard output flow file sink

use crate::etl::{Emitter, FlowFile};
use eyre::{Context, Result};
use std::io::Write;

/// Write flow file bodies to stdout, for piping into other tools
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutEmitter;

impl StdoutEmitter {
    pub fn new() -> Self {
        Self
    }
}

impl Emitter for StdoutEmitter {
    async fn emit(&self, flowfile: FlowFile) -> Result<()> {
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(flowfile.content())
            .and_then(|_| stdout.flush())
            .context("Failed to write flow file to stdout")?;
        log::debug!("Wrote {} byte(s) to stdout", flowfile.size());
        Ok(())
    }
}
