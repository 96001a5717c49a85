//! JSON and XML persistence for pose-scene skeleton animations.
//!
//! Both formats store the rest-pose rig. Only JSON stores per-frame
//! overrides; XML is a rig-only format.
//!
//! # Examples
//!
//! ```
//! use pose_scene::{Bone, BoneOverride, Scene};
//! use pose_storage::{from_json_str, to_json_string};
//!
//! let mut scene = Scene::new("wave");
//! scene.add_bone(Bone::new("arm").with_length(30.0))?;
//! scene.set_frame_override(0, "arm", &BoneOverride::angle(45.0))?;
//!
//! let text = to_json_string(&scene.snapshot())?;
//! let mut restored = Scene::new("empty");
//! restored.load(&from_json_str(&text)?)?;
//! assert_eq!(restored.snapshot(), scene.snapshot());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod format;
pub mod json;
pub mod store;
pub mod xml;

pub use error::{Result, StorageError};
pub use format::SceneFormat;
pub use json::{from_json_str, read_json, to_json_string, write_json};
pub use store::{SceneStore, load_from_path, load_into, save_to_path};
pub use xml::{from_xml_str, to_xml_string, write_xml};
