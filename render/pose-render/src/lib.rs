//! Rendering and export for pose-scene animations.
//!
//! [`draw_pose`] and [`render_frame`] rasterize one frame into an RGBA
//! image. [`ExportService`] renders a whole animation on its own worker pool
//! and writes PNG frames plus an animated GIF.
//!
//! # Examples
//!
//! ```
//! use pose_render::{RenderOptions, render_frame};
//! use pose_scene::{Bone, Scene};
//!
//! let mut scene = Scene::new("arm");
//! scene.add_bone(Bone::new("upper").at(250.0, 250.0).with_length(60.0))?;
//!
//! let image = render_frame(&scene, 0, &RenderOptions::default())?;
//! assert_eq!(image.dimensions(), (500, 500));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![forbid(unsafe_code)]

pub mod draw;
pub mod error;
pub mod export;

pub use draw::{OnionSkin, RenderOptions, draw_pose, render_frame};
pub use error::{RenderError, Result};
pub use export::{
    DEFAULT_FPS, ExportOptions, ExportReport, ExportService, ExportServiceConfig, ExportStatus,
};
