//! Animation export on a dedicated worker pool
//!
//! An [`ExportService`] is constructed explicitly by the application and
//! owns its thread pool and output root. Each export job renders every frame
//! of the scene in parallel (one task per frame), all workers sharing the
//! scene's pose cache, then writes the numbered PNG frames and an animated
//! GIF into a per-job directory.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::Local;
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, ImageFormat, RgbaImage};
use log::{debug, info};
use pose_scene::{FrameIndex, Scene};
use rayon::prelude::*;

use crate::draw::{RenderOptions, render_frame};
use crate::error::{RenderError, Result};

/// Default playback rate
pub const DEFAULT_FPS: u32 = 12;

/// Construction parameters for [`ExportService`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportServiceConfig {
    /// Worker threads; `None` uses one per CPU
    pub workers: Option<usize>,
    /// Directory that receives one sub-directory per job
    pub output_root: PathBuf,
}

impl ExportServiceConfig {
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            workers: None,
            output_root: output_root.into(),
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }
}

/// Per-job export settings
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    pub fps: u32,
    /// Keep each rendered frame as `frame_NNNN.png`
    pub write_png: bool,
    /// Write the animation as `<job>.gif`
    pub write_gif: bool,
    pub render: RenderOptions,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            write_png: true,
            write_gif: true,
            render: RenderOptions::default(),
        }
    }
}

/// Progress notifications sent while a job runs
///
/// `FrameRendered` events arrive in completion order, not frame order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportStatus {
    Started { job_id: String, frames: usize },
    FrameRendered { frame: FrameIndex },
    Finished { job_id: String },
}

/// Outcome of a finished export job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub job_id: String,
    pub directory: PathBuf,
    pub frame_count: usize,
    /// PNG files in frame order, empty when PNG output is disabled
    pub frame_paths: Vec<PathBuf>,
    pub gif_path: Option<PathBuf>,
    pub elapsed: Duration,
}

/// Renders scenes to image files on its own thread pool
pub struct ExportService {
    pool: rayon::ThreadPool,
    output_root: PathBuf,
}

impl ExportService {
    /// Start the worker pool and create the output root
    pub fn new(config: ExportServiceConfig) -> Result<Self> {
        let mut builder =
            rayon::ThreadPoolBuilder::new().thread_name(|i| format!("pose-export-{i}"));
        if let Some(workers) = config.workers {
            builder = builder.num_threads(workers);
        }
        let pool = builder.build()?;
        fs::create_dir_all(&config.output_root)?;

        debug!(
            "Export service with {} workers writing to {}",
            pool.current_num_threads(),
            config.output_root.display()
        );
        Ok(Self {
            pool,
            output_root: config.output_root,
        })
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Render every frame of `scene` and write the requested outputs
    pub fn export<F>(
        &self,
        scene: &Scene,
        options: &ExportOptions,
        on_status: F,
    ) -> Result<ExportReport>
    where
        F: Fn(ExportStatus) + Sync,
    {
        if options.fps == 0 {
            return Err(RenderError::InvalidFps(options.fps));
        }
        let frames = scene.frame_indices();
        if frames.is_empty() {
            return Err(RenderError::NoFrames(scene.name().to_string()));
        }

        let start = Instant::now();
        let (job_id, directory) = self.create_job_dir()?;
        info!(
            "Export job {} started: {} frames of '{}' at {} fps",
            job_id,
            frames.len(),
            scene.name(),
            options.fps
        );
        on_status(ExportStatus::Started {
            job_id: job_id.clone(),
            frames: frames.len(),
        });

        let rendered: Vec<(RgbaImage, Option<PathBuf>)> = self.pool.install(|| {
            frames
                .par_iter()
                .enumerate()
                .map(|(sequence, &frame)| {
                    let image = render_frame(scene, frame, &options.render)?;
                    let path = if options.write_png {
                        let path = directory.join(format!("frame_{sequence:04}.png"));
                        image.save_with_format(&path, ImageFormat::Png)?;
                        Some(path)
                    } else {
                        None
                    };
                    on_status(ExportStatus::FrameRendered { frame });
                    Ok((image, path))
                })
                .collect::<Result<Vec<_>>>()
        })?;

        let mut images = Vec::with_capacity(rendered.len());
        let mut frame_paths = Vec::new();
        for (image, path) in rendered {
            images.push(image);
            frame_paths.extend(path);
        }

        let gif_path = if options.write_gif {
            let path = directory.join(format!("{job_id}.gif"));
            write_gif(&path, images, options.fps)?;
            debug!("GIF saved to {}", path.display());
            Some(path)
        } else {
            None
        };

        let elapsed = start.elapsed();
        info!("Export job {} finished in {:.2?}", job_id, elapsed);
        on_status(ExportStatus::Finished {
            job_id: job_id.clone(),
        });

        Ok(ExportReport {
            job_id,
            directory,
            frame_count: frames.len(),
            frame_paths,
            gif_path,
            elapsed,
        })
    }

    /// Timestamped job id; a numeric suffix keeps same-millisecond jobs apart
    fn create_job_dir(&self) -> Result<(String, PathBuf)> {
        let stamp = Local::now().format("%Y%m%d-%H%M%S-%3f").to_string();
        let mut job_id = stamp.clone();
        let mut suffix = 1;
        loop {
            let directory = self.output_root.join(&job_id);
            match fs::create_dir(&directory) {
                Ok(()) => return Ok((job_id, directory)),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    job_id = format!("{stamp}-{suffix}");
                    suffix += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl std::fmt::Debug for ExportService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportService")
            .field("workers", &self.pool.current_num_threads())
            .field("output_root", &self.output_root)
            .finish()
    }
}

fn write_gif(path: &Path, images: Vec<RgbaImage>, fps: u32) -> Result<()> {
    let mut encoder = GifEncoder::new(BufWriter::new(File::create(path)?));
    encoder.set_repeat(Repeat::Infinite)?;
    let delay = Delay::from_numer_denom_ms(1000, fps);
    encoder.encode_frames(
        images
            .into_iter()
            .map(|image| Frame::from_parts(image, 0, 0, delay)),
    )?;
    Ok(())
}
