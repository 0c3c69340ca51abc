use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::cursor::state::CursorConfig;
use crate::foundation::error::{ScrollweaveError, ScrollweaveResult};
use crate::scroll::config::ScrollConfig;

/// Engine-wide tuning, read from JSON.
///
/// Every field is optional; omitted sections keep their defaults.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StageConfig {
    /// Smooth scroll tuning.
    pub scroll: ScrollConfig,
    /// Shader cursor tuning.
    pub cursor: CursorConfig,
}

impl StageConfig {
    /// Parse from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> ScrollweaveResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| ScrollweaveError::config(format!("parse stage config JSON: {e}")))
    }

    /// Parse from JSON text.
    pub fn from_json_str(s: &str) -> ScrollweaveResult<Self> {
        serde_json::from_str(s)
            .map_err(|e| ScrollweaveError::config(format!("parse stage config JSON: {e}")))
    }

    /// Parse from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> ScrollweaveResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ScrollweaveError::config(format!("open stage config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Validate every section.
    pub fn validate(&self) -> ScrollweaveResult<()> {
        self.scroll.validate()?;
        self.cursor.validate()
    }
}
