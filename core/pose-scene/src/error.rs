use thiserror::Error;

/// Error types for scene editing and pose evaluation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    /// A bone with this id is already part of the scene
    #[error("Duplicate bone id: '{0}'")]
    DuplicateBone(String),

    /// The requested parent is not part of the scene
    #[error("Unknown parent '{parent}' for bone '{bone}'")]
    UnknownParent { bone: String, parent: String },

    /// The parent chain loops back onto itself
    #[error("Cyclic bone graph: bone '{0}' is its own ancestor")]
    CyclicBoneGraph(String),

    /// An edit carried a NaN or infinite number
    #[error("Non-finite value for bone '{0}'")]
    NonFiniteValue(String),

    /// No frame index is left after the current maximum
    #[error("Frame index overflow: frame {0} is already the last possible frame")]
    FrameIndexOverflow(u32),

    /// A snapshot failed validation before it could be applied
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

/// Result type using SceneError
pub type Result<T> = std::result::Result<T, SceneError>;
