//! JSON scene documents
//!
//! The document is the snapshot record itself: `name`, `bones` keyed by id,
//! and `frames` keyed by the frame index as a string.

use std::io::{Read, Write};

use pose_scene::SceneSnapshot;

use crate::error::Result;

/// Serialize a snapshot as pretty-printed JSON
pub fn to_json_string(snapshot: &SceneSnapshot) -> Result<String> {
    Ok(serde_json::to_string_pretty(snapshot)?)
}

/// Parse a snapshot from JSON text
pub fn from_json_str(text: &str) -> Result<SceneSnapshot> {
    Ok(serde_json::from_str(text)?)
}

/// Write a snapshot as pretty-printed JSON
pub fn write_json<W: Write>(writer: W, snapshot: &SceneSnapshot) -> Result<()> {
    serde_json::to_writer_pretty(writer, snapshot)?;
    Ok(())
}

/// Read a snapshot from a JSON stream
pub fn read_json<R: Read>(reader: R) -> Result<SceneSnapshot> {
    Ok(serde_json::from_reader(reader)?)
}
