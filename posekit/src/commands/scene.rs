//! Scene file inspection and conversion commands

use anyhow::{Context, Result};
use console::style;
use pose_scene::{FrameIndex, Scene};
use std::path::Path;

use super::{read_scene, write_scene};
use crate::utils::{
    TreeOptions, add_table_row, create_table, format_number, render_tree, skeleton_tree,
};

pub fn execute_new(path: &Path, name: &str) -> Result<()> {
    if path.exists() {
        anyhow::bail!("Refusing to overwrite existing file: {}", path.display());
    }
    write_scene(path, &Scene::new(name))?;
    println!(
        "✓ Created scene '{}' at {}",
        style(name).yellow(),
        style(path.display()).cyan()
    );
    Ok(())
}

pub fn execute_info(path: &Path) -> Result<()> {
    let scene = read_scene(path)?;
    let skeleton = scene.skeleton();

    println!("Scene Information");
    println!("=================");
    println!("File:   {}", style(path.display()).cyan());
    println!("Name:   {}", style(scene.name()).yellow());
    println!("Bones:  {}", skeleton.bone_count());
    println!(
        "Frames: {} ({})",
        skeleton.frame_count(),
        skeleton
            .frame_indices()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("Roots:  {}", skeleton.roots().join(", "));

    let overrides: usize = skeleton.frames().values().map(|f| f.len()).sum();
    println!("Overrides: {overrides}");
    Ok(())
}

pub fn execute_tree(path: &Path, depth: Option<usize>, no_color: bool) -> Result<()> {
    let scene = read_scene(path)?;
    let options = TreeOptions {
        max_depth: depth,
        no_color,
    };
    print!("{}", render_tree(&skeleton_tree(scene.skeleton()), &options));
    Ok(())
}

pub fn execute_pose(path: &Path, frame: FrameIndex, all: bool) -> Result<()> {
    let scene = read_scene(path)?;
    let frames = if all {
        scene.frame_indices()
    } else {
        vec![frame]
    };

    let mut table = create_table(&["Frame", "Bone", "X", "Y", "Angle", "Length", "Tip"]);
    for frame in frames {
        let pose = scene
            .compute_absolute_positions(frame)
            .with_context(|| format!("Failed to evaluate frame {frame}"))?;
        for (id, bone) in pose.iter() {
            let tip = bone.tip();
            add_table_row(
                &mut table,
                vec![
                    frame.to_string(),
                    id.to_string(),
                    format_number(bone.x),
                    format_number(bone.y),
                    format_number(bone.angle),
                    format_number(bone.length),
                    format!("({}, {})", format_number(tip.x), format_number(tip.y)),
                ],
            );
        }
    }
    table.printstd();
    Ok(())
}

pub fn execute_convert(input: &Path, output: &Path) -> Result<()> {
    let scene = read_scene(input)?;
    write_scene(output, &scene)?;
    println!(
        "✓ Converted {} → {}",
        style(input.display()).cyan(),
        style(output.display()).cyan()
    );
    Ok(())
}

pub fn execute_validate(path: &Path) -> Result<()> {
    let snapshot = pose_storage::load_from_path(path)
        .with_context(|| format!("Failed to read scene file: {}", path.display()))?;

    if let Err(err) = snapshot.validate() {
        anyhow::bail!("Validation failed: {}", err);
    }

    let dangling: Vec<&str> = snapshot
        .bones
        .values()
        .filter(|b| b.parent_id().is_some_and(|p| !snapshot.bones.contains_key(p)))
        .map(|b| b.id.as_str())
        .collect();
    let unknown_overrides: usize = snapshot
        .frames
        .values()
        .flat_map(|f| f.keys())
        .filter(|id| !snapshot.bones.contains_key(*id))
        .count();

    println!(
        "✓ Scene '{}' in {} is valid",
        style(&snapshot.name).yellow(),
        style(path.display()).cyan()
    );
    if !dangling.is_empty() {
        println!(
            "  {} bones with a missing parent (evaluated as roots): {}",
            style("warning:").yellow(),
            dangling.join(", ")
        );
    }
    if unknown_overrides > 0 {
        println!(
            "  {} {} override(s) for bones that do not exist",
            style("warning:").yellow(),
            unknown_overrides
        );
    }
    Ok(())
}
