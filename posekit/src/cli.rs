//! Root CLI structure for posekit

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "posekit")]
#[command(about = "Command-line tools for 2D skeleton animation scenes", long_about = None)]
#[command(version)]
#[command(author)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Directory holding saved scenes
    #[arg(long, env = "POSEKIT_STORAGE_DIR", global = true, value_name = "DIR")]
    pub storage_dir: Option<PathBuf>,

    /// Directory receiving export jobs
    #[arg(long, env = "POSEKIT_OUTPUT_DIR", global = true, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an empty scene file
    New {
        /// Path of the scene file (.json or .xml)
        file: PathBuf,

        /// Scene name
        #[arg(long, default_value = pose_scene::DEFAULT_SCENE_NAME)]
        name: String,
    },

    /// Display information about a scene file
    Info {
        /// Path to the scene file
        file: PathBuf,
    },

    /// Show the bone hierarchy of a scene
    Tree {
        /// Path to the scene file
        file: PathBuf,

        /// Maximum depth to display
        #[arg(long)]
        depth: Option<usize>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Print absolute bone positions
    Pose {
        /// Path to the scene file
        file: PathBuf,

        /// Frame to evaluate
        #[arg(short, long, default_value_t = 0, conflicts_with = "all")]
        frame: u32,

        /// Evaluate every frame
        #[arg(long)]
        all: bool,
    },

    /// Convert a scene between JSON and XML
    Convert {
        /// Input scene file
        input: PathBuf,

        /// Output scene file; the format follows its extension
        output: PathBuf,
    },

    /// Validate a scene file
    Validate {
        /// Path to the scene file
        file: PathBuf,
    },

    /// Apply an edit script to a scene
    Edit {
        /// Scene file to edit
        file: PathBuf,

        /// Script with one edit per line
        script: PathBuf,

        /// Write the result here instead of overwriting the input
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List scenes in the storage directory
    List {
        /// List XML scenes instead of JSON
        #[arg(long)]
        xml: bool,
    },

    /// Copy a scene file into the storage directory
    Save {
        /// Scene file to store
        file: PathBuf,

        /// Name to store it under, without extension
        name: String,

        /// Store as XML (drops per-frame overrides)
        #[arg(long)]
        xml: bool,
    },

    /// Copy a stored scene out of the storage directory
    Load {
        /// Stored file name, e.g. walk.json
        name: String,

        /// Destination scene file
        output: PathBuf,
    },

    /// Render every frame to PNG files and an animated GIF
    Export {
        /// Path to the scene file
        file: PathBuf,

        /// Playback rate of the GIF
        #[arg(long, default_value_t = pose_render::DEFAULT_FPS)]
        fps: u32,

        /// Skip writing individual PNG frames
        #[arg(long)]
        no_png: bool,

        /// Skip writing the animated GIF
        #[arg(long)]
        no_gif: bool,

        /// Ghost the previous frame beneath each frame
        #[arg(long)]
        onion_prev: bool,

        /// Ghost the next frame beneath each frame
        #[arg(long)]
        onion_next: bool,

        /// Number of render workers (defaults to one per CPU)
        #[arg(long)]
        workers: Option<usize>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
