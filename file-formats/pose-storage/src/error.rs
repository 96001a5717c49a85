use std::io;
use std::path::PathBuf;

use pose_scene::SceneError;
use quick_xml::events::attributes::AttrError;
use thiserror::Error;

/// Errors that can occur while saving or loading scenes
#[derive(Error, Debug)]
pub enum StorageError {
    /// I/O error during reading or writing
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed JSON document
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed XML document
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Malformed XML attribute
    #[error("XML attribute error: {0}")]
    XmlAttribute(#[from] AttrError),

    /// Document parsed but does not describe a scene
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// A numeric attribute could not be parsed
    #[error("Invalid number '{value}' in attribute '{attribute}'")]
    InvalidNumber { attribute: String, value: String },

    /// File extension is neither .json nor .xml
    #[error("Unsupported scene format: {0}")]
    UnsupportedFormat(String),

    /// Store entry name that would escape the store directory
    #[error("Invalid scene name '{0}'")]
    InvalidName(String),

    /// Requested scene file does not exist
    #[error("Scene file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Loaded data was rejected by the scene
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),
}

/// Result type using StorageError
pub type Result<T> = std::result::Result<T, StorageError>;
