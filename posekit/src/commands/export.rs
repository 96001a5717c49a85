//! Animation export command

use anyhow::{Context, Result};
use console::style;
use pose_render::{ExportOptions, ExportService, ExportServiceConfig, ExportStatus, RenderOptions};
use std::path::Path;

use super::read_scene;
use crate::config::Settings;
use crate::utils::create_progress_bar;

/// Flags of the export command
#[derive(Debug, Clone)]
pub struct ExportArgs {
    pub fps: u32,
    pub png: bool,
    pub gif: bool,
    pub onion_prev: bool,
    pub onion_next: bool,
    pub workers: Option<usize>,
}

pub fn execute(settings: &Settings, file: &Path, args: ExportArgs) -> Result<()> {
    if !args.png && !args.gif {
        anyhow::bail!("Nothing to export: both --no-png and --no-gif were given");
    }
    let scene = read_scene(file)?;

    let mut config = ExportServiceConfig::new(&settings.output_dir);
    config.workers = args.workers;
    let service = ExportService::new(config).with_context(|| {
        format!(
            "Failed to start export service in {}",
            settings.output_dir.display()
        )
    })?;

    let mut render = RenderOptions::default();
    render.onion.previous = args.onion_prev;
    render.onion.next = args.onion_next;
    let options = ExportOptions {
        fps: args.fps,
        write_png: args.png,
        write_gif: args.gif,
        render,
    };

    let progress = create_progress_bar(scene.frame_indices().len() as u64, "Rendering frames");
    let report = service
        .export(&scene, &options, |status| match status {
            ExportStatus::Started { job_id, .. } => progress.set_message(format!("Job {job_id}")),
            ExportStatus::FrameRendered { .. } => progress.inc(1),
            ExportStatus::Finished { .. } => progress.finish_with_message("Rendered"),
        })
        .with_context(|| format!("Failed to export {}", file.display()))?;

    println!(
        "✓ Exported {} frame(s) in {:.2?} to {}",
        report.frame_count,
        report.elapsed,
        style(report.directory.display()).cyan()
    );
    if let Some(gif) = &report.gif_path {
        println!("  GIF: {}", style(gif.display()).cyan());
    }
    Ok(())
}
