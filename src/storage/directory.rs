//! Directory-based flow file storage

use crate::error::EmitError;
use crate::etl::{Emitter, FlowFile};
use eyre::Result;
use std::path::{Path, PathBuf};

/// Write each flow file to a directory
///
/// The body goes to `<dir>/<filename>` and the attributes to
/// `<dir>/<filename>.attributes.json`. The filename comes from the
/// `filename` attribute, falling back to `flowfile-<number>`.
pub struct DirectoryEmitter {
    path: PathBuf,
}

impl DirectoryEmitter {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        std::fs::create_dir_all(&path)?;
        Ok(Self { path })
    }

    /// Write one flow file, returning the path of its body
    pub fn write(&self, flowfile: &FlowFile) -> Result<PathBuf, EmitError> {
        let filename = self.filename(flowfile);
        let body_path = self.path.join(&filename);
        let attributes_path = self.path.join(format!("{}.attributes.json", filename));

        std::fs::write(&body_path, flowfile.content()).map_err(|source| EmitError::Io {
            path: body_path.display().to_string(),
            source,
        })?;

        let attributes = serde_json::to_string_pretty(flowfile.attributes())?;
        std::fs::write(&attributes_path, attributes).map_err(|source| EmitError::Io {
            path: attributes_path.display().to_string(),
            source,
        })?;

        Ok(body_path)
    }

    fn filename(&self, flowfile: &FlowFile) -> String {
        flowfile
            .attribute("filename")
            .filter(|name| !name.is_empty() && !name.contains(['/', '\\']))
            .map(str::to_string)
            .unwrap_or_else(|| {
                format!(
                    "flowfile-{}",
                    flowfile.attribute("flowfile.number").unwrap_or("unknown")
                )
            })
    }

    /// Get the directory path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Emitter for DirectoryEmitter {
    async fn emit(&self, flowfile: FlowFile) -> Result<()> {
        let path = self.write(&flowfile)?;
        log::info!(
            "Wrote {} byte(s) to {} ({})",
            flowfile.size(),
            path.display(),
            flowfile.relationship()
        );
        Ok(())
    }
}
