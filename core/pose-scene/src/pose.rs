//! Forward kinematics for the 2D bone hierarchy
//!
//! Each bone's local offset is rotated by the accumulated angle of its
//! parent and added to the parent's world position:
//!
//! ```text
//! abs.x     = parent.x + local.x * cos(p) - local.y * sin(p)
//! abs.y     = parent.y + local.x * sin(p) + local.y * cos(p)
//! abs.angle = parent.angle + local.angle
//! ```
//!
//! Angles are degrees and are never normalized. Length is not inherited.

use std::collections::{BTreeMap, HashSet};

use glam::DVec2;
use log::warn;

use crate::bone::LocalState;
use crate::error::{Result, SceneError};
use crate::skeleton::{FrameIndex, Skeleton};

/// World-space transform of one bone
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BonePose {
    pub x: f64,
    pub y: f64,
    /// Accumulated angle in degrees, unnormalized
    pub angle: f64,
    pub length: f64,
}

impl BonePose {
    /// World position of the bone's origin
    pub fn origin(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    /// World position of the far end of the segment
    pub fn tip(&self) -> DVec2 {
        self.origin() + DVec2::from_angle(self.angle.to_radians()) * self.length
    }

    fn root(local: LocalState) -> Self {
        Self {
            x: local.x,
            y: local.y,
            angle: local.angle,
            length: local.length,
        }
    }

    fn compose(parent: &Self, local: LocalState) -> Self {
        let rotation = DVec2::from_angle(parent.angle.to_radians());
        let offset = rotation.rotate(DVec2::new(local.x, local.y));
        Self {
            x: parent.x + offset.x,
            y: parent.y + offset.y,
            angle: local.angle + parent.angle,
            length: local.length,
        }
    }
}

/// Absolute pose of every bone in one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AbsolutePose {
    frame: FrameIndex,
    bones: BTreeMap<String, BonePose>,
}

impl AbsolutePose {
    /// Frame this pose was evaluated for
    pub fn frame(&self) -> FrameIndex {
        self.frame
    }

    /// Pose of one bone
    pub fn get(&self, id: &str) -> Option<&BonePose> {
        self.bones.get(id)
    }

    /// All poses in bone id order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BonePose)> {
        self.bones.iter().map(|(id, pose)| (id.as_str(), pose))
    }

    /// Number of bones
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    /// True for a scene without bones
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// Underlying id → pose map
    pub fn as_map(&self) -> &BTreeMap<String, BonePose> {
        &self.bones
    }
}

/// Evaluate the absolute pose of every bone for a frame
///
/// Parents are resolved before children with an explicit stack, so deep
/// chains do not grow the call stack and shared parents are computed once.
/// A parent id that does not resolve makes the bone a root.
pub fn compute_pose(skeleton: &Skeleton, frame: FrameIndex) -> Result<AbsolutePose> {
    let bones = skeleton.bones();
    let mut resolved: BTreeMap<String, BonePose> = BTreeMap::new();

    for start in bones.keys() {
        if resolved.contains_key(start) {
            continue;
        }

        let mut stack: Vec<&str> = vec![start.as_str()];
        let mut on_path: HashSet<&str> = HashSet::new();

        while let Some(&id) = stack.last() {
            if resolved.contains_key(id) {
                stack.pop();
                continue;
            }

            let Some(bone) = bones.get(id) else {
                stack.pop();
                continue;
            };
            let Some(local) = skeleton.effective_local(frame, id) else {
                stack.pop();
                continue;
            };

            let parent = match bone.parent_id() {
                Some(parent) if bones.contains_key(parent) => Some(parent),
                Some(parent) => {
                    warn!(
                        "Bone '{}' has dangling parent '{}', evaluating as root",
                        id, parent
                    );
                    None
                }
                None => None,
            };

            let pose = match parent {
                None => BonePose::root(local),
                Some(parent) => match resolved.get(parent) {
                    Some(parent_pose) => BonePose::compose(parent_pose, local),
                    None => {
                        on_path.insert(id);
                        if on_path.contains(parent) {
                            return Err(SceneError::CyclicBoneGraph(parent.to_string()));
                        }
                        stack.push(parent);
                        continue;
                    }
                },
            };

            resolved.insert(id.to_string(), pose);
            on_path.remove(id);
            stack.pop();
        }
    }

    Ok(AbsolutePose {
        frame,
        bones: resolved,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bone::{Bone, BoneOverride};

    const EPSILON: f64 = 1e-9;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < EPSILON,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_root_pose_is_rest_pose() {
        let mut skeleton = Skeleton::default();
        skeleton
            .add_bone(Bone::new("root").at(12.0, -3.0).with_angle(30.0).with_length(8.0))
            .unwrap();

        let pose = compute_pose(&skeleton, 0).unwrap();
        assert_eq!(
            pose.get("root"),
            Some(&BonePose {
                x: 12.0,
                y: -3.0,
                angle: 30.0,
                length: 8.0
            })
        );
    }

    #[test]
    fn test_child_rotates_with_parent() {
        let mut skeleton = Skeleton::default();
        skeleton
            .add_bone(Bone::new("parent").at(100.0, 100.0).with_angle(90.0).with_length(10.0))
            .unwrap();
        skeleton
            .add_bone(Bone::new("child").at(10.0, 0.0).with_parent("parent"))
            .unwrap();

        let pose = compute_pose(&skeleton, 0).unwrap();
        let child = pose.get("child").unwrap();
        assert_close(child.x, 100.0);
        assert_close(child.y, 110.0);
        assert_close(child.angle, 90.0);
        assert_close(child.length, 0.0);
    }

    #[test]
    fn test_angle_accumulates_without_normalization() {
        let mut skeleton = Skeleton::default();
        skeleton.add_bone(Bone::new("a").with_angle(300.0)).unwrap();
        skeleton
            .add_bone(Bone::new("b").with_angle(200.0).with_parent("a"))
            .unwrap();
        skeleton
            .add_bone(Bone::new("c").with_angle(-900.0).with_parent("b"))
            .unwrap();

        let pose = compute_pose(&skeleton, 0).unwrap();
        assert_close(pose.get("b").unwrap().angle, 500.0);
        assert_close(pose.get("c").unwrap().angle, -400.0);
    }

    #[test]
    fn test_deep_chain_does_not_overflow() {
        let mut skeleton = Skeleton::default();
        skeleton.add_bone(Bone::new("b0").with_angle(1.0)).unwrap();
        for i in 1..20_000 {
            skeleton
                .add_bone(
                    Bone::new(format!("b{i}"))
                        .at(1.0, 0.0)
                        .with_angle(1.0)
                        .with_parent(format!("b{}", i - 1)),
                )
                .unwrap();
        }

        let pose = compute_pose(&skeleton, 0).unwrap();
        assert_eq!(pose.len(), 20_000);
        assert_close(pose.get("b19999").unwrap().angle, 20_000.0);
    }

    #[test]
    fn test_dangling_parent_evaluates_as_root() {
        let mut skeleton = Skeleton::default();
        skeleton.add_bone(Bone::new("p").at(50.0, 50.0)).unwrap();
        skeleton
            .add_bone(Bone::new("c").at(5.0, 6.0).with_angle(7.0).with_parent("p"))
            .unwrap();
        skeleton.bones_mut().remove("p");

        let pose = compute_pose(&skeleton, 0).unwrap();
        let child = pose.get("c").unwrap();
        assert_eq!((child.x, child.y, child.angle), (5.0, 6.0, 7.0));
    }

    #[test]
    fn test_cycle_is_reported() {
        let mut skeleton = Skeleton::default();
        skeleton.add_bone(Bone::new("a")).unwrap();
        skeleton.add_bone(Bone::new("b").with_parent("a")).unwrap();
        skeleton.bones_mut().get_mut("a").unwrap().parent = Some("b".into());

        assert!(matches!(
            compute_pose(&skeleton, 0),
            Err(SceneError::CyclicBoneGraph(_))
        ));
    }

    #[test]
    fn test_overrides_apply_per_frame() {
        let mut skeleton = Skeleton::default();
        skeleton
            .add_bone(Bone::new("a").at(1.0, 2.0).with_length(3.0))
            .unwrap();
        let frame = skeleton.add_frame().unwrap();
        skeleton.set_frame_override(frame, "a", &BoneOverride::angle(45.0)).unwrap();

        let rest = compute_pose(&skeleton, 0).unwrap();
        let posed = compute_pose(&skeleton, frame).unwrap();
        assert_eq!(rest.get("a").unwrap().angle, 0.0);
        assert_eq!(
            posed.get("a"),
            Some(&BonePose {
                x: 1.0,
                y: 2.0,
                angle: 45.0,
                length: 3.0
            })
        );
        assert_eq!(posed.frame(), frame);
    }

    #[test]
    fn test_tip() {
        let pose = BonePose {
            x: 1.0,
            y: 1.0,
            angle: 90.0,
            length: 2.0,
        };
        let tip = pose.tip();
        assert_close(tip.x, 1.0);
        assert_close(tip.y, 3.0);
    }
}
