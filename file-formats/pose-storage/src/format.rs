//! Scene file format detection

use std::fmt;
use std::path::Path;

use crate::error::{Result, StorageError};

/// On-disk scene representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneFormat {
    /// Full scene including per-frame overrides
    Json,
    /// Rig only: bones and frame indices, no overrides
    Xml,
}

impl SceneFormat {
    /// File extension without the dot
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Xml => "xml",
        }
    }

    /// Whether per-frame overrides survive a save/load cycle
    pub fn keeps_overrides(self) -> bool {
        matches!(self, Self::Json)
    }

    /// Detect the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("xml") => Ok(Self::Xml),
            _ => Err(StorageError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

impl fmt::Display for SceneFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "JSON"),
            Self::Xml => write!(f, "XML"),
        }
    }
}
