//! History-guarded scene: the entry point for editing and evaluation
//!
//! Every edit made through [`Scene`] records the pre-edit snapshot on the
//! undo stack and invalidates the whole pose cache, so a pose returned by
//! [`Scene::compute_absolute_positions`] always reflects the current state.

use std::sync::Arc;

use log::{debug, info};

use crate::bone::{Bone, BoneOverride};
use crate::error::Result;
use crate::evaluator::PoseEvaluator;
use crate::history::{History, HistoryConfig};
use crate::pose::AbsolutePose;
use crate::skeleton::{FrameIndex, Skeleton};
use crate::snapshot::SceneSnapshot;

/// Skeleton model together with its pose cache and undo/redo history
#[derive(Debug, Default)]
pub struct Scene {
    skeleton: Skeleton,
    evaluator: PoseEvaluator,
    history: History,
}

impl Scene {
    /// Create an empty scene with unbounded history
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_history(name, HistoryConfig::default())
    }

    /// Create an empty scene with the given history configuration
    pub fn with_history(name: impl Into<String>, config: HistoryConfig) -> Self {
        Self {
            skeleton: Skeleton::new(name),
            evaluator: PoseEvaluator::new(),
            history: History::new(config),
        }
    }

    /// Build a scene from a validated snapshot, with empty unbounded history
    pub fn from_snapshot(snapshot: &SceneSnapshot) -> Result<Self> {
        Self::from_snapshot_with_history(snapshot, HistoryConfig::default())
    }

    /// Build a scene from a validated snapshot with the given history
    /// configuration
    pub fn from_snapshot_with_history(
        snapshot: &SceneSnapshot,
        config: HistoryConfig,
    ) -> Result<Self> {
        snapshot.validate()?;
        Ok(Self {
            skeleton: Skeleton::from_snapshot(snapshot),
            evaluator: PoseEvaluator::new(),
            history: History::new(config),
        })
    }

    /// History configuration in effect
    pub fn history_config(&self) -> HistoryConfig {
        self.history.config()
    }

    /// Read access to the skeleton model
    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    /// Unrecorded access for bulk loading
    ///
    /// Bypasses history; callers usually follow a bulk load with one
    /// [`push_undo`](Self::push_undo). The pose cache is dropped up front.
    pub fn skeleton_mut(&mut self) -> &mut Skeleton {
        self.evaluator.invalidate();
        &mut self.skeleton
    }

    pub fn name(&self) -> &str {
        self.skeleton.name()
    }

    // ====================================================================
    // Guarded edits
    // ====================================================================

    /// Record the current state as an undo point
    ///
    /// Clears the redo stack and the pose cache.
    pub fn push_undo(&mut self) {
        self.history.push(self.skeleton.snapshot());
        self.evaluator.invalidate();
    }

    /// Add a bone; the id must be new and the parent must exist
    pub fn add_bone(&mut self, bone: Bone) -> Result<()> {
        self.skeleton.check_new_bone(&bone)?;
        self.push_undo();
        self.skeleton.add_bone(bone)
    }

    /// Delete a bone and its overrides; false (and no undo point) if absent
    pub fn delete_bone(&mut self, id: &str) -> bool {
        if !self.skeleton.contains_bone(id) {
            debug!("Ignoring delete of unknown bone '{}'", id);
            return false;
        }
        self.push_undo();
        self.skeleton.delete_bone(id)
    }

    /// Merge overrides for a bone on a frame; false (and no undo point) if
    /// the bone does not exist
    ///
    /// Non-finite values are rejected before anything is recorded.
    pub fn set_frame_override(
        &mut self,
        frame: FrameIndex,
        bone_id: &str,
        updates: &BoneOverride,
    ) -> Result<bool> {
        if !self.skeleton.contains_bone(bone_id) {
            debug!("Ignoring override of unknown bone '{}'", bone_id);
            return Ok(false);
        }
        Skeleton::check_override(bone_id, updates)?;
        self.push_undo();
        self.skeleton.set_frame_override(frame, bone_id, updates)
    }

    /// Append a frame after the current maximum index
    ///
    /// Fails without recording an undo point when the maximum index is
    /// already `u32::MAX`.
    pub fn add_frame(&mut self) -> Result<FrameIndex> {
        self.skeleton.next_frame_index()?;
        self.push_undo();
        self.skeleton.add_frame()
    }

    /// Rename the scene
    pub fn rename(&mut self, name: impl Into<String>) {
        self.push_undo();
        self.skeleton.set_name(name);
    }

    /// Replace the scene with a loaded snapshot as one undoable step
    ///
    /// The snapshot is validated first; on error the scene is unchanged.
    pub fn load(&mut self, snapshot: &SceneSnapshot) -> Result<()> {
        snapshot.validate()?;
        self.push_undo();
        self.restore(snapshot);
        info!(
            "Loaded scene '{}' ({} bones, {} frames)",
            snapshot.name,
            self.skeleton.bone_count(),
            self.skeleton.frame_count()
        );
        Ok(())
    }

    // ====================================================================
    // Snapshots and history
    // ====================================================================

    /// Deep copy of the persisted state
    pub fn snapshot(&self) -> SceneSnapshot {
        self.skeleton.snapshot()
    }

    /// Replace the live state without recording history
    pub fn restore(&mut self, snapshot: &SceneSnapshot) {
        self.skeleton.restore(snapshot);
        self.evaluator.invalidate();
    }

    /// Return to the most recent undo point; false if there is none
    pub fn undo(&mut self) -> bool {
        match self.history.undo(self.skeleton.snapshot()) {
            Some(previous) => {
                self.restore(&previous);
                true
            }
            None => false,
        }
    }

    /// Re-apply the most recently undone state; false if there is none
    pub fn redo(&mut self) -> bool {
        match self.history.redo(self.skeleton.snapshot()) {
            Some(next) => {
                self.restore(&next);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_depth(&self) -> usize {
        self.history.undo_depth()
    }

    pub fn redo_depth(&self) -> usize {
        self.history.redo_depth()
    }

    /// Forget all undo and redo points
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    // ====================================================================
    // Evaluation and queries
    // ====================================================================

    /// World-space pose of every bone in a frame, memoized per frame
    ///
    /// A frame index without an entry in the frame table evaluates to the
    /// rest pose.
    pub fn compute_absolute_positions(&self, frame: FrameIndex) -> Result<Arc<AbsolutePose>> {
        self.evaluator.evaluate(&self.skeleton, frame)
    }

    /// The pose cache, for inspection
    pub fn evaluator(&self) -> &PoseEvaluator {
        &self.evaluator
    }

    /// Sorted frame indices
    pub fn frame_indices(&self) -> Vec<FrameIndex> {
        self.skeleton.frame_indices()
    }

    /// Highest frame index
    pub fn max_frame(&self) -> FrameIndex {
        self.skeleton.max_frame().unwrap_or(0)
    }

    /// Frame after `current` during looped playback
    pub fn next_frame(&self, current: FrameIndex) -> FrameIndex {
        let max = self.max_frame();
        if current >= max { 0 } else { current + 1 }
    }

    /// Frame before `current`, if any (used for onion skinning)
    pub fn previous_frame(&self, current: FrameIndex) -> Option<FrameIndex> {
        current.checked_sub(1)
    }
}
