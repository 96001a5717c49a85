//! Directory settings for the CLI

use directories::ProjectDirs;
use log::debug;
use std::path::PathBuf;

const FALLBACK_STORAGE_DIR: &str = "storage_files";
const FALLBACK_OUTPUT_DIR: &str = "render_output";

/// Resolved locations for saved scenes and export output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub storage_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Settings {
    /// Apply explicit settings over the per-user defaults
    pub fn resolve(storage_dir: Option<PathBuf>, output_dir: Option<PathBuf>) -> Self {
        let dirs = ProjectDirs::from("org", "posekit", "posekit");
        let settings = Self {
            storage_dir: storage_dir.unwrap_or_else(|| match &dirs {
                Some(dirs) => dirs.data_dir().join("scenes"),
                None => PathBuf::from(FALLBACK_STORAGE_DIR),
            }),
            output_dir: output_dir.unwrap_or_else(|| match &dirs {
                Some(dirs) => dirs.cache_dir().join(FALLBACK_OUTPUT_DIR),
                None => PathBuf::from(FALLBACK_OUTPUT_DIR),
            }),
        };
        debug!("{:?}", settings);
        settings
    }
}
