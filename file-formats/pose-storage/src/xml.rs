//! XML rig documents
//!
//! ```xml
//! <?xml version="1.0" encoding="utf-8"?>
//! <figure name="walk">
//!   <bones>
//!     <bone id="hip" x="250" y="250" angle="0" length="0" parent=""/>
//!   </bones>
//!   <frames>
//!     <frame index="0"/>
//!   </frames>
//! </figure>
//! ```
//!
//! Only rest-pose bones and frame indices are stored; per-frame overrides
//! are not part of this format.

use std::io::Write;

use log::warn;
use pose_scene::{Bone, DEFAULT_SCENE_NAME, FrameIndex, FrameOverrides, SceneSnapshot};
use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};

use crate::error::{Result, StorageError};

const ROOT: &str = "figure";

/// Write a snapshot as an XML rig document
///
/// Overrides are dropped; a warning is logged when any exist.
pub fn write_xml<W: Write>(writer: W, snapshot: &SceneSnapshot) -> Result<()> {
    let dropped: usize = snapshot.frames.values().map(FrameOverrides::len).sum();
    if dropped > 0 {
        warn!(
            "XML output of '{}' omits {} per-frame override(s)",
            snapshot.name, dropped
        );
    }

    let mut xml = Writer::new_with_indent(writer, b' ', 2);
    xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    xml.write_event(Event::Start(
        BytesStart::new(ROOT).with_attributes([("name", snapshot.name.as_str())]),
    ))?;

    xml.write_event(Event::Start(BytesStart::new("bones")))?;
    for (id, bone) in &snapshot.bones {
        let x = bone.x.to_string();
        let y = bone.y.to_string();
        let angle = bone.angle.to_string();
        let length = bone.length.to_string();
        let element = BytesStart::new("bone").with_attributes([
            ("id", id.as_str()),
            ("x", x.as_str()),
            ("y", y.as_str()),
            ("angle", angle.as_str()),
            ("length", length.as_str()),
            ("parent", bone.parent_id().unwrap_or("")),
        ]);
        xml.write_event(Event::Empty(element))?;
    }
    xml.write_event(Event::End(BytesEnd::new("bones")))?;

    xml.write_event(Event::Start(BytesStart::new("frames")))?;
    for index in snapshot.frames.keys() {
        let index = index.to_string();
        xml.write_event(Event::Empty(
            BytesStart::new("frame").with_attributes([("index", index.as_str())]),
        ))?;
    }
    xml.write_event(Event::End(BytesEnd::new("frames")))?;

    xml.write_event(Event::End(BytesEnd::new(ROOT)))?;
    Ok(())
}

/// Serialize a snapshot as an XML string
pub fn to_xml_string(snapshot: &SceneSnapshot) -> Result<String> {
    let mut buffer = Vec::new();
    write_xml(&mut buffer, snapshot)?;
    String::from_utf8(buffer)
        .map_err(|e| StorageError::InvalidFormat(format!("non UTF-8 output: {e}")))
}

/// Parse an XML rig document
///
/// Missing numeric attributes default to 0, a missing name to "unnamed",
/// and an empty `parent` to no parent. Every frame comes back without
/// overrides.
pub fn from_xml_str(text: &str) -> Result<SceneSnapshot> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut snapshot = SceneSnapshot {
        name: DEFAULT_SCENE_NAME.to_string(),
        bones: Default::default(),
        frames: Default::default(),
    };
    let mut saw_root = false;

    loop {
        match reader.read_event()? {
            Event::Start(element) | Event::Empty(element) => {
                match element.name().as_ref() {
                    b"figure" => {
                        saw_root = true;
                        if let Some(name) = attribute(&element, "name")? {
                            snapshot.name = name;
                        }
                    }
                    b"bone" => {
                        let bone = parse_bone(&element)?;
                        if snapshot.bones.contains_key(&bone.id) {
                            return Err(StorageError::InvalidFormat(format!(
                                "duplicate bone id '{}'",
                                bone.id
                            )));
                        }
                        snapshot.bones.insert(bone.id.clone(), bone);
                    }
                    b"frame" => {
                        let index = match attribute(&element, "index")? {
                            Some(value) => value.trim().parse::<FrameIndex>().map_err(|_| {
                                StorageError::InvalidNumber {
                                    attribute: "index".to_string(),
                                    value,
                                }
                            })?,
                            None => 0,
                        };
                        snapshot.frames.insert(index, FrameOverrides::new());
                    }
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_root {
        return Err(StorageError::InvalidFormat(format!(
            "missing <{ROOT}> root element"
        )));
    }
    Ok(snapshot)
}

fn parse_bone(element: &BytesStart<'_>) -> Result<Bone> {
    let id = attribute(element, "id")?
        .filter(|id| !id.is_empty())
        .ok_or_else(|| StorageError::InvalidFormat("<bone> without an id".to_string()))?;

    Ok(Bone {
        id,
        x: number(element, "x")?,
        y: number(element, "y")?,
        angle: number(element, "angle")?,
        length: number(element, "length")?,
        parent: attribute(element, "parent")?.filter(|p| !p.is_empty()),
    })
}

fn attribute(element: &BytesStart<'_>, name: &str) -> Result<Option<String>> {
    for attr in element.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == name.as_bytes() {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

fn number(element: &BytesStart<'_>, name: &str) -> Result<f64> {
    match attribute(element, name)? {
        None => Ok(0.0),
        Some(value) => match value.trim().parse::<f64>() {
            Ok(parsed) if parsed.is_finite() => Ok(parsed),
            _ => Err(StorageError::InvalidNumber {
                attribute: name.to_string(),
                value,
            }),
        },
    }
}
