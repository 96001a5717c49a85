//! Rest-pose bone definitions and per-frame property overrides

use serde::{Deserialize, Serialize};

/// A rigid 2D segment in rest pose
///
/// Position and angle are local to the parent bone, or world-space for a
/// root bone. Angles are in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bone {
    /// Unique bone id
    pub id: String,
    /// Local X offset
    #[serde(default)]
    pub x: f64,
    /// Local Y offset
    #[serde(default)]
    pub y: f64,
    /// Local rotation in degrees
    #[serde(default)]
    pub angle: f64,
    /// Segment length used for rendering
    #[serde(default)]
    pub length: f64,
    /// Parent bone id (weak reference, resolved through the skeleton)
    #[serde(default)]
    pub parent: Option<String>,
}

impl Bone {
    /// Create a root bone at the origin with zero length
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            x: 0.0,
            y: 0.0,
            angle: 0.0,
            length: 0.0,
            parent: None,
        }
    }

    /// Set the local offset
    #[must_use]
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Set the local rotation in degrees
    #[must_use]
    pub fn with_angle(mut self, angle: f64) -> Self {
        self.angle = angle;
        self
    }

    /// Set the segment length
    #[must_use]
    pub fn with_length(mut self, length: f64) -> Self {
        self.length = length;
        self
    }

    /// Attach to a parent bone
    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Parent id, treating an empty string as "no parent"
    pub fn parent_id(&self) -> Option<&str> {
        self.parent.as_deref().filter(|p| !p.is_empty())
    }

    /// Rest-pose local state
    pub fn rest_state(&self) -> LocalState {
        LocalState {
            x: self.x,
            y: self.y,
            angle: self.angle,
            length: self.length,
        }
    }

    pub(crate) fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.angle.is_finite() && self.length.is_finite()
    }
}

/// Animatable bone property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoneProperty {
    X,
    Y,
    Angle,
    Length,
}

impl BoneProperty {
    /// All properties in declaration order
    pub const ALL: [Self; 4] = [Self::X, Self::Y, Self::Angle, Self::Length];

    /// Property name as used in persisted overrides
    pub fn name(self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Angle => "angle",
            Self::Length => "length",
        }
    }

    /// Look a property up by its persisted name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }
}

/// Sparse per-frame override of a bone's local properties
///
/// Unset fields fall back to the bone's rest-pose value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoneOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
}

impl BoneOverride {
    /// Override only the X offset
    pub fn x(value: f64) -> Self {
        Self::default().with(BoneProperty::X, value)
    }

    /// Override only the Y offset
    pub fn y(value: f64) -> Self {
        Self::default().with(BoneProperty::Y, value)
    }

    /// Override only the angle
    pub fn angle(value: f64) -> Self {
        Self::default().with(BoneProperty::Angle, value)
    }

    /// Override only the length
    pub fn length(value: f64) -> Self {
        Self::default().with(BoneProperty::Length, value)
    }

    /// Set one property, keeping the others
    #[must_use]
    pub fn with(mut self, property: BoneProperty, value: f64) -> Self {
        *self.slot_mut(property) = Some(value);
        self
    }

    /// Get an overridden property
    pub fn get(&self, property: BoneProperty) -> Option<f64> {
        match property {
            BoneProperty::X => self.x,
            BoneProperty::Y => self.y,
            BoneProperty::Angle => self.angle,
            BoneProperty::Length => self.length,
        }
    }

    fn slot_mut(&mut self, property: BoneProperty) -> &mut Option<f64> {
        match property {
            BoneProperty::X => &mut self.x,
            BoneProperty::Y => &mut self.y,
            BoneProperty::Angle => &mut self.angle,
            BoneProperty::Length => &mut self.length,
        }
    }

    /// Merge `updates` into this override; fields unset in `updates` are kept
    pub fn merge(&mut self, updates: &Self) {
        for property in BoneProperty::ALL {
            if let Some(value) = updates.get(property) {
                *self.slot_mut(property) = Some(value);
            }
        }
    }

    /// True when no property is overridden
    pub fn is_empty(&self) -> bool {
        BoneProperty::ALL.iter().all(|p| self.get(*p).is_none())
    }

    /// Apply this override on top of a local state
    pub fn apply(&self, base: LocalState) -> LocalState {
        LocalState {
            x: self.x.unwrap_or(base.x),
            y: self.y.unwrap_or(base.y),
            angle: self.angle.unwrap_or(base.angle),
            length: self.length.unwrap_or(base.length),
        }
    }

    pub(crate) fn is_finite(&self) -> bool {
        BoneProperty::ALL
            .iter()
            .filter_map(|p| self.get(*p))
            .all(f64::is_finite)
    }
}

/// Effective local transform of a bone in one frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LocalState {
    pub x: f64,
    pub y: f64,
    /// Degrees
    pub angle: f64,
    pub length: f64,
}
