//! Commands moving scenes in and out of the storage directory

use anyhow::{Context, Result};
use console::style;
use pose_scene::Scene;
use pose_storage::{SceneFormat, SceneStore};
use std::path::Path;

use super::{read_scene, warn_dropped_overrides, write_scene};
use crate::config::Settings;

fn open_store(settings: &Settings) -> Result<SceneStore> {
    SceneStore::open(&settings.storage_dir).with_context(|| {
        format!(
            "Failed to open storage directory: {}",
            settings.storage_dir.display()
        )
    })
}

fn format_flag(xml: bool) -> SceneFormat {
    if xml { SceneFormat::Xml } else { SceneFormat::Json }
}

pub fn execute_list(settings: &Settings, xml: bool) -> Result<()> {
    let store = open_store(settings)?;
    let format = format_flag(xml);
    let names = store.list(format)?;

    if names.is_empty() {
        println!(
            "No {} scenes in {}",
            format,
            style(store.root().display()).cyan()
        );
        return Ok(());
    }
    for name in names {
        println!("{name}");
    }
    Ok(())
}

pub fn execute_save(settings: &Settings, file: &Path, name: &str, xml: bool) -> Result<()> {
    let scene = read_scene(file)?;
    let store = open_store(settings)?;
    let format = format_flag(xml);

    warn_dropped_overrides(&scene, format);
    let path = store
        .save(name, &scene, format)
        .with_context(|| format!("Failed to store scene '{name}'"))?;
    println!("✓ Stored as {}", style(path.display()).cyan());
    Ok(())
}

pub fn execute_load(settings: &Settings, name: &str, output: &Path) -> Result<()> {
    let store = open_store(settings)?;
    let mut scene = Scene::default();
    store
        .load(name, &mut scene)
        .with_context(|| format!("Failed to load stored scene '{name}'"))?;
    write_scene(output, &scene)?;
    println!(
        "✓ Loaded '{}' → {}",
        style(scene.name()).yellow(),
        style(output.display()).cyan()
    );
    Ok(())
}
