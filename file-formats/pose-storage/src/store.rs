//! Directory-backed scene storage

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};
use pose_scene::{Scene, SceneSnapshot};
use tempfile::NamedTempFile;

use crate::error::{Result, StorageError};
use crate::format::SceneFormat;
use crate::{json, xml};

/// Read a snapshot from a file, detecting the format from its extension
///
/// The snapshot is parsed but not validated; [`Scene::load`] validates.
pub fn load_from_path(path: &Path) -> Result<SceneSnapshot> {
    let format = SceneFormat::from_path(path)?;
    if !path.exists() {
        return Err(StorageError::NotFound(path.to_path_buf()));
    }

    debug!("Reading {} scene from {}", format, path.display());
    match format {
        SceneFormat::Json => json::read_json(BufReader::new(File::open(path)?)),
        SceneFormat::Xml => xml::from_xml_str(&fs::read_to_string(path)?),
    }
}

/// Write a snapshot to a file, choosing the format from its extension
///
/// The snapshot must validate. It is written to a temporary file next to
/// `path` which then replaces the target, so a failed save leaves any
/// existing file intact.
pub fn save_to_path(path: &Path, snapshot: &SceneSnapshot) -> Result<()> {
    let format = SceneFormat::from_path(path)?;
    snapshot.validate()?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        match format {
            SceneFormat::Json => json::write_json(&mut writer, snapshot)?,
            SceneFormat::Xml => xml::write_xml(&mut writer, snapshot)?,
        }
        writer.flush()?;
    }
    temp.persist(path).map_err(|e| e.error)?;
    info!("Saved {} scene '{}' to {}", format, snapshot.name, path.display());
    Ok(())
}

/// Load a scene file into a live scene as one undoable step
///
/// Parsing and validation happen before the scene is touched, so a failed
/// load leaves it unchanged.
pub fn load_into(path: &Path, scene: &mut Scene) -> Result<()> {
    let snapshot = load_from_path(path)?;
    scene.load(&snapshot)?;
    Ok(())
}

fn check_name(name: &str) -> Result<()> {
    let plain = !name.is_empty()
        && name != "."
        && !name.contains("..")
        && !name.contains(['/', '\\'])
        && Path::new(name).file_name().and_then(|n| n.to_str()) == Some(name);
    if plain {
        Ok(())
    } else {
        Err(StorageError::InvalidName(name.to_string()))
    }
}

/// A directory of saved scene files
#[derive(Debug, Clone)]
pub struct SceneStore {
    root: PathBuf,
}

impl SceneStore {
    /// Open a store, creating the directory if needed
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        debug!("Scene store at {}", root.display());
        Ok(Self { root })
    }

    /// Store directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a file inside the store
    ///
    /// Names must be a single plain file name: no separators and no `..`.
    pub fn path_of(&self, file_name: &str) -> Result<PathBuf> {
        check_name(file_name)?;
        Ok(self.root.join(file_name))
    }

    /// Sorted names of stored files in the given format
    pub fn list(&self, format: SceneFormat) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let path = entry.path();
            if SceneFormat::from_path(&path).ok() == Some(format) {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Save a scene as `<name>.<ext>` and return the written path
    pub fn save(&self, name: &str, scene: &Scene, format: SceneFormat) -> Result<PathBuf> {
        check_name(name)?;
        let path = self.path_of(&format!("{}.{}", name, format.extension()))?;
        save_to_path(&path, &scene.snapshot())?;
        Ok(path)
    }

    /// Load a stored file into a scene as one undoable step
    pub fn load(&self, file_name: &str, scene: &mut Scene) -> Result<()> {
        load_into(&self.path_of(file_name)?, scene)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pose_scene::{Bone, BoneOverride};
    use tempfile::TempDir;

    fn scene() -> Scene {
        let mut scene = Scene::new("stored");
        scene.add_bone(Bone::new("root").at(1.0, 2.0)).unwrap();
        scene.set_frame_override(0, "root", &BoneOverride::angle(15.0)).unwrap();
        scene
    }

    #[test]
    fn test_save_and_list() {
        let dir = TempDir::new().unwrap();
        let store = SceneStore::open(dir.path().join("nested")).unwrap();
        let scene = scene();

        store.save("b", &scene, SceneFormat::Json).unwrap();
        store.save("a", &scene, SceneFormat::Json).unwrap();
        store.save("c", &scene, SceneFormat::Xml).unwrap();
        fs::write(store.path_of("notes.txt").unwrap(), "ignored").unwrap();

        assert_eq!(store.list(SceneFormat::Json).unwrap(), vec!["a.json", "b.json"]);
        assert_eq!(store.list(SceneFormat::Xml).unwrap(), vec!["c.xml"]);
    }

    #[test]
    fn test_load_is_undoable() {
        let dir = TempDir::new().unwrap();
        let store = SceneStore::open(dir.path()).unwrap();
        store.save("saved", &scene(), SceneFormat::Json).unwrap();

        let mut target = Scene::new("target");
        store.load("saved.json", &mut target).unwrap();
        assert_eq!(target.snapshot(), scene().snapshot());

        assert!(target.undo());
        assert_eq!(target.name(), "target");
    }

    #[test]
    fn test_missing_file_leaves_scene_unchanged() {
        let dir = TempDir::new().unwrap();
        let store = SceneStore::open(dir.path()).unwrap();
        let mut target = scene();
        let before = target.snapshot();

        let err = store.load("missing.json", &mut target).unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
        assert_eq!(target.snapshot(), before);
    }

    #[test]
    fn test_names_cannot_leave_the_store() {
        let dir = TempDir::new().unwrap();
        let store = SceneStore::open(dir.path().join("store")).unwrap();
        let scene = scene();

        for name in ["../outside", "sub/inner", "sub\\inner", "..", ""] {
            let err = store.save(name, &scene, SceneFormat::Json).unwrap_err();
            assert!(matches!(err, StorageError::InvalidName(_)), "{name}");
        }
        assert!(!dir.path().join("outside.json").exists());

        let mut target = Scene::new("target");
        let err = store.load("../outside.json", &mut target).unwrap_err();
        assert!(matches!(err, StorageError::InvalidName(_)));
        assert_eq!(target.undo_depth(), 0);
    }

    #[test]
    fn test_failed_save_keeps_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("keep.json");
        save_to_path(&path, &scene().snapshot()).unwrap();
        let original = fs::read_to_string(&path).unwrap();

        let mut broken = scene().snapshot();
        broken.bones.get_mut("root").unwrap().x = f64::NAN;
        let err = save_to_path(&path, &broken).unwrap_err();
        assert!(matches!(err, StorageError::Scene(_)));

        assert_eq!(fs::read_to_string(&path).unwrap(), original);
        let entries = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_save_replaces_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scene.xml");
        save_to_path(&path, &scene().snapshot()).unwrap();

        let mut renamed = scene();
        renamed.rename("replaced");
        save_to_path(&path, &renamed.snapshot()).unwrap();

        assert_eq!(load_from_path(&path).unwrap().name, "replaced");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
