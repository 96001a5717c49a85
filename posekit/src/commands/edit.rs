//! Line-based edit scripts applied through the undoable scene API
//!
//! ```text
//! # comments and blank lines are ignored
//! add-bone hip x=250 y=250 length=20
//! add-bone thigh parent=hip y=20 angle=90 length=40
//! add-frame
//! set 1 thigh angle=60 length=45
//! delete-bone thigh
//! undo
//! redo
//! rename walk
//! ```

use anyhow::{Context, Result, anyhow, bail};
use console::style;
use log::warn;
use pose_scene::{Bone, BoneOverride, BoneProperty, FrameIndex, Scene};
use std::fs;
use std::path::Path;

use super::{read_scene, write_scene};

/// One parsed script line
#[derive(Debug, Clone, PartialEq)]
pub enum EditCommand {
    AddBone(Bone),
    DeleteBone(String),
    Set {
        frame: FrameIndex,
        bone: String,
        updates: BoneOverride,
    },
    AddFrame,
    Rename(String),
    Undo,
    Redo,
}

impl EditCommand {
    /// Parse a line; `None` for blank lines and comments
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let mut words = line.split_whitespace();
        let keyword = words.next().unwrap_or_default();
        let args: Vec<&str> = words.collect();

        let command = match keyword {
            "add-bone" => {
                let (id, rest) = args
                    .split_first()
                    .ok_or_else(|| anyhow!("add-bone needs a bone id"))?;
                let mut bone = Bone::new(*id);
                for (key, value) in assignments(rest)? {
                    match key {
                        "parent" => bone.parent = Some(value.to_string()),
                        _ => {
                            let number = parse_number(key, value)?;
                            match property(key)? {
                                BoneProperty::X => bone.x = number,
                                BoneProperty::Y => bone.y = number,
                                BoneProperty::Angle => bone.angle = number,
                                BoneProperty::Length => bone.length = number,
                            }
                        }
                    }
                }
                Self::AddBone(bone)
            }
            "delete-bone" => match args.as_slice() {
                [id] => Self::DeleteBone((*id).to_string()),
                _ => bail!("delete-bone takes exactly one bone id"),
            },
            "set" => {
                let [frame, bone, rest @ ..] = args.as_slice() else {
                    bail!("set needs a frame index and a bone id");
                };
                let frame = frame
                    .parse::<FrameIndex>()
                    .map_err(|_| anyhow!("invalid frame index '{}'", frame))?;
                let mut updates = BoneOverride::default();
                for (key, value) in assignments(rest)? {
                    updates = updates.with(property(key)?, parse_number(key, value)?);
                }
                if updates.is_empty() {
                    bail!("set needs at least one property=value");
                }
                Self::Set {
                    frame,
                    bone: (*bone).to_string(),
                    updates,
                }
            }
            "add-frame" if args.is_empty() => Self::AddFrame,
            "rename" if !args.is_empty() => Self::Rename(args.join(" ")),
            "undo" if args.is_empty() => Self::Undo,
            "redo" if args.is_empty() => Self::Redo,
            "add-frame" | "undo" | "redo" => bail!("{} takes no arguments", keyword),
            "rename" => bail!("rename needs a name"),
            _ => bail!("unknown command '{}'", keyword),
        };
        Ok(Some(command))
    }

    /// Apply to a scene; edits that have nothing to act on are logged and
    /// skipped
    pub fn apply(&self, scene: &mut Scene) -> Result<()> {
        match self {
            Self::AddBone(bone) => scene.add_bone(bone.clone())?,
            Self::DeleteBone(id) => {
                if !scene.delete_bone(id) {
                    warn!("delete-bone: no bone '{}'", id);
                }
            }
            Self::Set {
                frame,
                bone,
                updates,
            } => {
                if !scene.set_frame_override(*frame, bone, updates)? {
                    warn!("set: no bone '{}'", bone);
                }
            }
            Self::AddFrame => {
                scene.add_frame()?;
            }
            Self::Rename(name) => scene.rename(name.clone()),
            Self::Undo => {
                if !scene.undo() {
                    warn!("undo: nothing to undo");
                }
            }
            Self::Redo => {
                if !scene.redo() {
                    warn!("redo: nothing to redo");
                }
            }
        }
        Ok(())
    }
}

/// Parse a whole script, reporting the first bad line by number
pub fn parse_script(text: &str) -> Result<Vec<EditCommand>> {
    let mut commands = Vec::new();
    for (number, line) in text.lines().enumerate() {
        let parsed = EditCommand::parse(line)
            .with_context(|| format!("line {}: {}", number + 1, line.trim()))?;
        commands.extend(parsed);
    }
    Ok(commands)
}

pub fn execute(file: &Path, script: &Path, output: Option<&Path>) -> Result<()> {
    let text = fs::read_to_string(script)
        .with_context(|| format!("Failed to read edit script: {}", script.display()))?;
    let commands = parse_script(&text)?;

    let mut scene = read_scene(file)?;
    for command in &commands {
        command
            .apply(&mut scene)
            .with_context(|| format!("Failed to apply {:?}", command))?;
    }

    let target = output.unwrap_or(file);
    write_scene(target, &scene)?;
    println!(
        "✓ Applied {} edit(s) to '{}' → {}",
        commands.len(),
        style(scene.name()).yellow(),
        style(target.display()).cyan()
    );
    Ok(())
}

fn assignments<'a>(args: &[&'a str]) -> Result<Vec<(&'a str, &'a str)>> {
    args.iter()
        .map(|arg| {
            arg.split_once('=')
                .filter(|(key, value)| !key.is_empty() && !value.is_empty())
                .ok_or_else(|| anyhow!("expected property=value, got '{}'", arg))
        })
        .collect()
}

fn property(key: &str) -> Result<BoneProperty> {
    BoneProperty::from_name(key).ok_or_else(|| anyhow!("unknown property '{}'", key))
}

fn parse_number(key: &str, value: &str) -> Result<f64> {
    match value.parse::<f64>() {
        Ok(number) if number.is_finite() => Ok(number),
        _ => bail!("invalid value for {}: '{}'", key, value),
    }
}
