//! File-backed state store
//!
//! Each scope is stored as a flat JSON object in `<dir>/<scope>.json`:
//! ```json
//! {
//!   "FlowFileNumber": "42"
//! }
//! ```

use super::{Scope, StateMap, StateStore};
use crate::error::{StateError, StateResult};
use std::path::{Path, PathBuf};

/// State store persisting each scope to a JSON file
#[derive(Debug, Clone)]
pub struct FileStateStore {
    dir: PathBuf,
}

impl FileStateStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Path of the file holding a scope
    pub fn scope_path(&self, scope: Scope) -> PathBuf {
        self.dir.join(format!("{}.json", scope))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl StateStore for FileStateStore {
    fn get(&self, scope: Scope) -> StateResult<StateMap> {
        let path = self.scope_path(scope);
        if !path.exists() {
            return Ok(StateMap::new());
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|e| StateError::Read(format!("{}: {}", path.display(), e)))?;

        serde_json::from_str(&content)
            .map_err(|e| StateError::Corrupt(format!("{}: {}", path.display(), e)))
    }

    fn set(&self, state: StateMap, scope: Scope) -> StateResult<()> {
        let path = self.scope_path(scope);
        let write_err = |e: std::io::Error| StateError::Write(format!("{}: {}", path.display(), e));

        std::fs::create_dir_all(&self.dir).map_err(write_err)?;

        let json = serde_json::to_string_pretty(&state)
            .map_err(|e| StateError::Write(e.to_string()))?;

        // Write then rename so a crash never leaves a half-written file
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(write_err)?;
        std::fs::rename(&tmp, &path).map_err(write_err)?;

        Ok(())
    }
}
