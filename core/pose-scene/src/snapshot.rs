//! Deep, self-contained copies of the persisted scene state

use std::collections::{BTreeMap, HashSet};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::bone::Bone;
use crate::error::{Result, SceneError};
use crate::skeleton::{DEFAULT_SCENE_NAME, FrameIndex, FrameOverrides};

fn default_name() -> String {
    DEFAULT_SCENE_NAME.to_string()
}

/// Scene state at a point in time
///
/// This is both the unit of undo/redo and the persisted record layout:
/// `{ name, bones: { id: bone }, frames: { index: { id: override } } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneSnapshot {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub bones: BTreeMap<String, Bone>,
    #[serde(default)]
    pub frames: BTreeMap<FrameIndex, FrameOverrides>,
}

impl Default for SceneSnapshot {
    fn default() -> Self {
        let mut frames = BTreeMap::new();
        frames.insert(0, FrameOverrides::new());
        Self {
            name: default_name(),
            bones: BTreeMap::new(),
            frames,
        }
    }
}

impl SceneSnapshot {
    /// Check a snapshot before it is applied to a live scene
    ///
    /// Rejects key/id mismatches, non-finite numbers, and parent cycles.
    /// Dangling parents and overrides of unknown bones are tolerated.
    pub fn validate(&self) -> Result<()> {
        for (key, bone) in &self.bones {
            if key != &bone.id {
                return Err(SceneError::InvalidSnapshot(format!(
                    "bone stored under '{}' has id '{}'",
                    key, bone.id
                )));
            }
            if !bone.is_finite() {
                return Err(SceneError::InvalidSnapshot(format!(
                    "bone '{}' has a non-finite value",
                    key
                )));
            }
            if let Some(parent) = bone.parent_id() {
                if !self.bones.contains_key(parent) {
                    warn!("Bone '{}' references missing parent '{}'", key, parent);
                }
            }
        }

        for (frame, overrides) in &self.frames {
            for (bone_id, values) in overrides {
                if !values.is_finite() {
                    return Err(SceneError::InvalidSnapshot(format!(
                        "override of '{}' on frame {} has a non-finite value",
                        bone_id, frame
                    )));
                }
                if !self.bones.contains_key(bone_id) {
                    warn!("Frame {} overrides unknown bone '{}'", frame, bone_id);
                }
            }
        }

        find_cycle(&self.bones).map_or(Ok(()), |id| Err(SceneError::CyclicBoneGraph(id)))
    }
}

/// First bone found on a parent cycle, if any
pub(crate) fn find_cycle(bones: &BTreeMap<String, Bone>) -> Option<String> {
    let mut acyclic: HashSet<&str> = HashSet::new();

    for start in bones.keys() {
        let mut path: HashSet<&str> = HashSet::new();
        let mut current = Some(start.as_str());

        while let Some(id) = current {
            if acyclic.contains(id) {
                break;
            }
            if !path.insert(id) {
                return Some(id.to_string());
            }
            current = bones
                .get(id)
                .and_then(Bone::parent_id)
                .filter(|p| bones.contains_key(*p));
        }
        acyclic.extend(path);
    }
    None
}
