//! Error types for rendering and export

use std::io;

use image::ImageError;
use pose_scene::SceneError;
use thiserror::Error;

/// Errors from frame rendering and animation export
#[derive(Debug, Error)]
pub enum RenderError {
    /// I/O error while writing output files
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Image encoding failed
    #[error("Image encoding error: {0}")]
    Image(#[from] ImageError),

    /// Pose evaluation failed
    #[error("Pose evaluation error: {0}")]
    Scene(#[from] SceneError),

    /// Frame rate must be at least 1
    #[error("Invalid frame rate: {0} (must be at least 1)")]
    InvalidFps(u32),

    /// The scene has no frames to export
    #[error("Scene '{0}' has no frames to export")]
    NoFrames(String),

    /// Canvas dimensions must be non-zero
    #[error("Invalid canvas size {width}x{height}")]
    InvalidCanvas { width: u32, height: u32 },

    /// The export worker pool could not be started
    #[error("Failed to create export worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Result type for rendering operations
pub type Result<T> = std::result::Result<T, RenderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            RenderError::InvalidFps(0).to_string(),
            "Invalid frame rate: 0 (must be at least 1)"
        );
        assert_eq!(
            RenderError::NoFrames("walk".into()).to_string(),
            "Scene 'walk' has no frames to export"
        );
        assert_eq!(
            RenderError::InvalidCanvas {
                width: 0,
                height: 10
            }
            .to_string(),
            "Invalid canvas size 0x10"
        );
    }
}
