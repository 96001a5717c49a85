//! Command implementations

pub mod edit;
pub mod export;
pub mod scene;
pub mod store;

use anyhow::{Context, Result};
use console::style;
use pose_scene::Scene;
use pose_storage::SceneFormat;
use std::path::Path;

/// Read and validate a scene file
pub fn read_scene(path: &Path) -> Result<Scene> {
    let snapshot = pose_storage::load_from_path(path)
        .with_context(|| format!("Failed to read scene file: {}", path.display()))?;
    Scene::from_snapshot(&snapshot)
        .with_context(|| format!("Invalid scene file: {}", path.display()))
}

/// Write a scene, the format following the file extension
pub fn write_scene(path: &Path, scene: &Scene) -> Result<()> {
    let format = SceneFormat::from_path(path)?;
    warn_dropped_overrides(scene, format);
    pose_storage::save_to_path(path, &scene.snapshot())
        .with_context(|| format!("Failed to write scene file: {}", path.display()))
}

/// Tell the user when saving in `format` loses per-frame overrides
pub fn warn_dropped_overrides(scene: &Scene, format: SceneFormat) {
    if format.keeps_overrides() {
        return;
    }
    let dropped: usize = scene.skeleton().frames().values().map(|f| f.len()).sum();
    if dropped > 0 {
        eprintln!(
            "{} {} per-frame override(s) are not stored in {} files",
            style("warning:").yellow().bold(),
            dropped,
            format
        );
    }
}
