//! Hierarchical 2D bone scene with per-frame overrides.
//!
//! A [`Scene`] owns a tree of bones in rest pose, a sparse table of
//! per-frame property overrides, a memoized forward-kinematics evaluator,
//! and snapshot-based undo/redo.
//!
//! # Examples
//!
//! ```
//! use pose_scene::{Bone, BoneOverride, Scene};
//!
//! let mut scene = Scene::new("arm");
//! scene.add_bone(Bone::new("upper").with_length(10.0))?;
//! scene.add_bone(Bone::new("lower").at(10.0, 0.0).with_parent("upper"))?;
//!
//! let frame = scene.add_frame()?;
//! scene.set_frame_override(frame, "upper", &BoneOverride::angle(90.0))?;
//!
//! let pose = scene.compute_absolute_positions(frame)?;
//! let lower = pose.get("lower").unwrap();
//! assert!((lower.y - 10.0).abs() < 1e-9);
//! assert_eq!(lower.angle, 90.0);
//!
//! assert!(scene.undo());
//! # Ok::<(), pose_scene::SceneError>(())
//! ```

#![forbid(unsafe_code)]

pub mod bone;
pub mod error;
pub mod evaluator;
pub mod history;
pub mod pose;
pub mod scene;
pub mod skeleton;
pub mod snapshot;

pub use bone::{Bone, BoneOverride, BoneProperty, LocalState};
pub use error::{Result, SceneError};
pub use evaluator::PoseEvaluator;
pub use history::{History, HistoryConfig};
pub use pose::{AbsolutePose, BonePose, compute_pose};
pub use scene::Scene;
pub use skeleton::{DEFAULT_SCENE_NAME, FrameIndex, FrameOverrides, Skeleton};
pub use snapshot::SceneSnapshot;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
