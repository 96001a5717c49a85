//! Skeleton model: rest-pose bones plus the sparse frame override table

use std::collections::BTreeMap;

use log::{debug, warn};

use crate::bone::{Bone, BoneOverride, LocalState};
use crate::error::{Result, SceneError};
use crate::snapshot::SceneSnapshot;

/// Index of a frame in the animation timeline
pub type FrameIndex = u32;

/// Overrides of one frame, keyed by bone id
pub type FrameOverrides = BTreeMap<String, BoneOverride>;

/// Default name of a freshly created scene
pub const DEFAULT_SCENE_NAME: &str = "unnamed";

/// Authoritative rest pose and per-frame override data
///
/// The skeleton owns every bone keyed by id; parent links are ids, never
/// pointers. Frame 0 exists from construction on.
#[derive(Debug, Clone, PartialEq)]
pub struct Skeleton {
    name: String,
    bones: BTreeMap<String, Bone>,
    frames: BTreeMap<FrameIndex, FrameOverrides>,
}

impl Default for Skeleton {
    fn default() -> Self {
        Self::new(DEFAULT_SCENE_NAME)
    }
}

impl Skeleton {
    /// Create an empty skeleton holding only frame 0
    pub fn new(name: impl Into<String>) -> Self {
        let mut frames = BTreeMap::new();
        frames.insert(0, FrameOverrides::new());
        Self {
            name: name.into(),
            bones: BTreeMap::new(),
            frames,
        }
    }

    /// Build a skeleton from an independent copy of a snapshot
    pub fn from_snapshot(snapshot: &SceneSnapshot) -> Self {
        let mut skeleton = Self::new(snapshot.name.clone());
        skeleton.restore(snapshot);
        skeleton
    }

    /// Scene name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the scene
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Insert a new bone
    ///
    /// The id must be unused and the parent, if any, must already exist.
    pub fn add_bone(&mut self, bone: Bone) -> Result<()> {
        self.check_new_bone(&bone)?;

        debug!("Adding bone '{}' (parent: {:?})", bone.id, bone.parent_id());
        self.bones.insert(bone.id.clone(), bone);
        Ok(())
    }

    /// Check that `bone` could be inserted without changing anything
    pub fn check_new_bone(&self, bone: &Bone) -> Result<()> {
        if self.bones.contains_key(&bone.id) {
            return Err(SceneError::DuplicateBone(bone.id.clone()));
        }
        if !bone.is_finite() {
            return Err(SceneError::NonFiniteValue(bone.id.clone()));
        }
        match bone.parent_id() {
            Some(parent) if !self.bones.contains_key(parent) => Err(SceneError::UnknownParent {
                bone: bone.id.clone(),
                parent: parent.to_string(),
            }),
            _ => Ok(()),
        }
    }

    /// Remove a bone and every override that references it
    ///
    /// Children keep their (now dangling) parent id. Returns false when the
    /// bone does not exist.
    pub fn delete_bone(&mut self, id: &str) -> bool {
        if self.bones.remove(id).is_none() {
            return false;
        }
        for overrides in self.frames.values_mut() {
            overrides.remove(id);
        }

        let orphans = self.children_of(id);
        if !orphans.is_empty() {
            warn!(
                "Deleted bone '{}' leaves {} child bone(s) with a dangling parent",
                id,
                orphans.len()
            );
        }
        debug!("Deleted bone '{}'", id);
        true
    }

    /// Reject override values that could not be persisted
    pub fn check_override(bone_id: &str, updates: &BoneOverride) -> Result<()> {
        if updates.is_finite() {
            Ok(())
        } else {
            Err(SceneError::NonFiniteValue(bone_id.to_string()))
        }
    }

    /// Merge property updates into a bone's override for a frame
    ///
    /// Creates the frame and the bone's override entry when absent.
    /// Returns false, leaving the table untouched, for an unknown bone.
    pub fn set_frame_override(
        &mut self,
        frame: FrameIndex,
        bone_id: &str,
        updates: &BoneOverride,
    ) -> Result<bool> {
        if !self.bones.contains_key(bone_id) {
            return Ok(false);
        }
        Self::check_override(bone_id, updates)?;
        self.frames
            .entry(frame)
            .or_default()
            .entry(bone_id.to_string())
            .or_default()
            .merge(updates);
        debug!("Updated override of '{}' on frame {}", bone_id, frame);
        Ok(true)
    }

    /// Index the next [`add_frame`](Self::add_frame) would create
    pub fn next_frame_index(&self) -> Result<FrameIndex> {
        match self.max_frame() {
            None => Ok(0),
            Some(max) => max
                .checked_add(1)
                .ok_or(SceneError::FrameIndexOverflow(max)),
        }
    }

    /// Append an empty frame after the current maximum index
    pub fn add_frame(&mut self) -> Result<FrameIndex> {
        let index = self.next_frame_index()?;
        self.frames.insert(index, FrameOverrides::new());
        debug!("Added frame {}", index);
        Ok(index)
    }

    /// Deep copy of the persisted state
    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            name: self.name.clone(),
            bones: self.bones.clone(),
            frames: self.frames.clone(),
        }
    }

    /// Replace bones, frames, and name with copies from a snapshot
    pub fn restore(&mut self, snapshot: &SceneSnapshot) {
        self.name.clone_from(&snapshot.name);
        self.bones.clone_from(&snapshot.bones);
        self.frames.clone_from(&snapshot.frames);
        self.frames.entry(0).or_default();
    }

    /// Look up a bone
    pub fn bone(&self, id: &str) -> Option<&Bone> {
        self.bones.get(id)
    }

    /// Whether a bone exists
    pub fn contains_bone(&self, id: &str) -> bool {
        self.bones.contains_key(id)
    }

    /// All bones keyed by id
    pub fn bones(&self) -> &BTreeMap<String, Bone> {
        &self.bones
    }

    /// Direct access for bulk loads; bypasses history
    pub fn bones_mut(&mut self) -> &mut BTreeMap<String, Bone> {
        &mut self.bones
    }

    /// Bone ids in sorted order
    pub fn bone_ids(&self) -> impl Iterator<Item = &str> {
        self.bones.keys().map(String::as_str)
    }

    /// Number of bones
    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    /// The full frame override table
    pub fn frames(&self) -> &BTreeMap<FrameIndex, FrameOverrides> {
        &self.frames
    }

    /// Direct access for bulk loads; bypasses history
    pub fn frames_mut(&mut self) -> &mut BTreeMap<FrameIndex, FrameOverrides> {
        &mut self.frames
    }

    /// Overrides of one frame
    pub fn frame(&self, frame: FrameIndex) -> Option<&FrameOverrides> {
        self.frames.get(&frame)
    }

    /// Override of one bone in one frame
    pub fn frame_override(&self, frame: FrameIndex, bone_id: &str) -> Option<&BoneOverride> {
        self.frames.get(&frame)?.get(bone_id)
    }

    /// Sorted frame indices
    pub fn frame_indices(&self) -> Vec<FrameIndex> {
        self.frames.keys().copied().collect()
    }

    /// Highest frame index
    pub fn max_frame(&self) -> Option<FrameIndex> {
        self.frames.keys().next_back().copied()
    }

    /// Number of frames
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Rest pose of a bone with the frame's overrides applied
    pub fn effective_local(&self, frame: FrameIndex, bone_id: &str) -> Option<LocalState> {
        let bone = self.bones.get(bone_id)?;
        let rest = bone.rest_state();
        Some(match self.frame_override(frame, bone_id) {
            Some(overrides) => overrides.apply(rest),
            None => rest,
        })
    }

    /// Ids of bones whose parent is `id`
    pub fn children_of(&self, id: &str) -> Vec<&str> {
        self.bones
            .values()
            .filter(|b| b.parent_id() == Some(id))
            .map(|b| b.id.as_str())
            .collect()
    }

    /// Bones evaluated as roots: no parent, or a parent that does not resolve
    pub fn roots(&self) -> Vec<&str> {
        self.bones
            .values()
            .filter(|b| b.parent_id().is_none_or(|p| !self.bones.contains_key(p)))
            .map(|b| b.id.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn arm() -> Skeleton {
        let mut skeleton = Skeleton::new("arm");
        skeleton
            .add_bone(Bone::new("shoulder").with_length(20.0))
            .unwrap();
        skeleton
            .add_bone(Bone::new("elbow").at(20.0, 0.0).with_parent("shoulder"))
            .unwrap();
        skeleton
            .add_bone(Bone::new("wrist").at(15.0, 0.0).with_parent("elbow"))
            .unwrap();
        skeleton
    }

    #[test]
    fn test_new_has_frame_zero() {
        let skeleton = Skeleton::default();
        assert_eq!(skeleton.name(), DEFAULT_SCENE_NAME);
        assert_eq!(skeleton.frame_indices(), vec![0]);
        assert_eq!(skeleton.bone_count(), 0);
    }

    #[test]
    fn test_add_bone_rejects_duplicates() {
        let mut skeleton = arm();
        let err = skeleton.add_bone(Bone::new("elbow").at(99.0, 0.0)).unwrap_err();
        assert_eq!(err, SceneError::DuplicateBone("elbow".into()));
        assert_eq!(skeleton.bone("elbow").unwrap().x, 20.0);
    }

    #[test]
    fn test_add_bone_rejects_unknown_parent() {
        let mut skeleton = arm();
        let err = skeleton
            .add_bone(Bone::new("finger").with_parent("hand"))
            .unwrap_err();
        assert!(matches!(err, SceneError::UnknownParent { .. }));
        assert!(!skeleton.contains_bone("finger"));
    }

    #[test]
    fn test_delete_bone_strips_overrides_and_keeps_children() {
        let mut skeleton = arm();
        skeleton.set_frame_override(0, "elbow", &BoneOverride::angle(10.0)).unwrap();
        let frame = skeleton.add_frame().unwrap();
        skeleton.set_frame_override(frame, "elbow", &BoneOverride::x(3.0)).unwrap();
        skeleton.set_frame_override(frame, "wrist", &BoneOverride::y(1.0)).unwrap();

        assert!(skeleton.delete_bone("elbow"));

        assert!(skeleton.frame_override(0, "elbow").is_none());
        assert!(skeleton.frame_override(frame, "elbow").is_none());
        assert!(skeleton.frame_override(frame, "wrist").is_some());
        let wrist = skeleton.bone("wrist").unwrap();
        assert_eq!(wrist.parent_id(), Some("elbow"));
        assert_eq!(skeleton.roots(), vec!["shoulder", "wrist"]);
    }

    #[test]
    fn test_delete_missing_bone_is_noop() {
        let mut skeleton = arm();
        let before = skeleton.snapshot();
        assert!(!skeleton.delete_bone("tail"));
        assert_eq!(skeleton.snapshot(), before);
    }

    #[test]
    fn test_set_override_creates_frame_and_merges() {
        let mut skeleton = arm();
        assert!(skeleton.set_frame_override(7, "wrist", &BoneOverride::angle(45.0)).unwrap());
        assert!(skeleton.set_frame_override(7, "wrist", &BoneOverride::length(2.0)).unwrap());

        let overrides = skeleton.frame_override(7, "wrist").unwrap();
        assert_eq!(overrides.angle, Some(45.0));
        assert_eq!(overrides.length, Some(2.0));
        assert_eq!(skeleton.frame_indices(), vec![0, 7]);
    }

    #[test]
    fn test_set_override_on_missing_bone_is_noop() {
        let mut skeleton = arm();
        assert!(!skeleton.set_frame_override(3, "tail", &BoneOverride::x(1.0)).unwrap());
        assert_eq!(skeleton.frame_indices(), vec![0]);
    }

    #[test]
    fn test_add_frame_uses_max_plus_one() {
        let mut skeleton = arm();
        skeleton.frames_mut().insert(1, FrameOverrides::new());
        skeleton.frames_mut().insert(3, FrameOverrides::new());
        assert_eq!(skeleton.add_frame().unwrap(), 4);
        assert_eq!(skeleton.frame_indices(), vec![0, 1, 3, 4]);
    }

    #[test]
    fn test_add_bone_rejects_non_finite_values() {
        let mut skeleton = arm();
        let err = skeleton
            .add_bone(Bone::new("finger").at(f64::NAN, 0.0).with_parent("wrist"))
            .unwrap_err();
        assert_eq!(err, SceneError::NonFiniteValue("finger".into()));
        let err = skeleton
            .add_bone(Bone::new("thumb").with_length(f64::INFINITY))
            .unwrap_err();
        assert_eq!(err, SceneError::NonFiniteValue("thumb".into()));
        assert_eq!(skeleton.bone_count(), 3);
    }

    #[test]
    fn test_set_override_rejects_non_finite_values() {
        let mut skeleton = arm();
        let before = skeleton.snapshot();
        let err = skeleton
            .set_frame_override(2, "wrist", &BoneOverride::angle(f64::NEG_INFINITY))
            .unwrap_err();
        assert_eq!(err, SceneError::NonFiniteValue("wrist".into()));
        assert_eq!(skeleton.snapshot(), before);
    }

    #[test]
    fn test_add_frame_fails_after_last_index() {
        let mut skeleton = arm();
        skeleton.set_frame_override(u32::MAX, "wrist", &BoneOverride::x(4.0)).unwrap();
        let before = skeleton.snapshot();

        let err = skeleton.add_frame().unwrap_err();
        assert_eq!(err, SceneError::FrameIndexOverflow(u32::MAX));
        assert_eq!(skeleton.snapshot(), before);
        assert_eq!(skeleton.frame_override(u32::MAX, "wrist").unwrap().x, Some(4.0));
    }

    #[test]
    fn test_snapshot_is_independent() {
        let mut skeleton = arm();
        let snapshot = skeleton.snapshot();
        skeleton.set_frame_override(0, "wrist", &BoneOverride::x(9.0)).unwrap();
        skeleton.set_name("changed");

        assert!(snapshot.frames[&0].is_empty());
        assert_eq!(snapshot.name, "arm");

        skeleton.restore(&snapshot);
        assert_eq!(skeleton.snapshot(), snapshot);
    }

    #[test]
    fn test_restore_guarantees_frame_zero() {
        let mut snapshot = arm().snapshot();
        snapshot.frames.clear();
        let skeleton = Skeleton::from_snapshot(&snapshot);
        assert_eq!(skeleton.frame_indices(), vec![0]);
    }

    #[test]
    fn test_effective_local_falls_back_to_rest_pose() {
        let mut skeleton = arm();
        skeleton.set_frame_override(0, "elbow", &BoneOverride::angle(90.0)).unwrap();

        let state = skeleton.effective_local(0, "elbow").unwrap();
        assert_eq!(state.angle, 90.0);
        assert_eq!(state.x, 20.0);

        // Overrides never leak between frames
        let state = skeleton.effective_local(1, "elbow").unwrap();
        assert_eq!(state.angle, 0.0);
    }
}
