//! Per-frame memoization of absolute poses

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, trace};
use parking_lot::RwLock;

use crate::error::Result;
use crate::pose::{AbsolutePose, compute_pose};
use crate::skeleton::{FrameIndex, Skeleton};

/// Caches evaluated poses by frame index until invalidated
///
/// Lookups take `&self`, so export workers can query different frames of
/// one scene concurrently. Two workers racing on the same frame may both
/// compute it; the first result stored is the one every caller receives.
#[derive(Debug, Default)]
pub struct PoseEvaluator {
    cache: RwLock<HashMap<FrameIndex, Arc<AbsolutePose>>>,
}

impl PoseEvaluator {
    /// Create an evaluator with an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Absolute pose of a frame, computed on first use
    pub fn evaluate(&self, skeleton: &Skeleton, frame: FrameIndex) -> Result<Arc<AbsolutePose>> {
        if let Some(pose) = self.cache.read().get(&frame) {
            trace!("Pose cache hit for frame {}", frame);
            return Ok(Arc::clone(pose));
        }

        debug!("Computing absolute positions for frame {}", frame);
        let pose = Arc::new(compute_pose(skeleton, frame)?);

        let mut cache = self.cache.write();
        Ok(Arc::clone(cache.entry(frame).or_insert(pose)))
    }

    /// Drop every cached frame
    pub fn invalidate(&self) {
        let mut cache = self.cache.write();
        if !cache.is_empty() {
            debug!("Invalidating {} cached frame pose(s)", cache.len());
            cache.clear();
        }
    }

    /// Whether a frame is currently cached
    pub fn is_cached(&self, frame: FrameIndex) -> bool {
        self.cache.read().contains_key(&frame)
    }

    /// Number of cached frames
    pub fn cached_frames(&self) -> usize {
        self.cache.read().len()
    }
}
