//! CLI integration tests driving the posekit binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn posekit(dirs: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("posekit").unwrap();
    cmd.env("POSEKIT_STORAGE_DIR", dirs.path().join("store"))
        .env("POSEKIT_OUTPUT_DIR", dirs.path().join("out"))
        .env_remove("RUST_LOG");
    cmd
}

const SCRIPT: &str = "\
# simple arm
add-bone shoulder x=100 y=100 length=10
add-bone elbow parent=shoulder x=10 length=10
add-frame
set 1 shoulder angle=90
rename arm
";

fn posed_scene(dirs: &TempDir) -> std::path::PathBuf {
    let scene = dirs.path().join("arm.json");
    let script = dirs.path().join("arm.txt");
    fs::write(&script, SCRIPT).unwrap();
    posekit(dirs).arg("new").arg(&scene).assert().success();
    posekit(dirs)
        .arg("edit")
        .arg(&scene)
        .arg(&script)
        .assert()
        .success()
        .stdout(predicate::str::contains("Applied 5 edit(s)"));
    scene
}

#[test]
fn new_scene_info() {
    let dirs = TempDir::new().unwrap();
    let scene = dirs.path().join("empty.json");

    posekit(&dirs)
        .args(["new", "--name", "blank"])
        .arg(&scene)
        .assert()
        .success();
    posekit(&dirs)
        .arg("info")
        .arg(&scene)
        .assert()
        .success()
        .stdout(predicate::str::contains("blank"))
        .stdout(predicate::str::contains("Bones:  0"));

    posekit(&dirs)
        .arg("new")
        .arg(&scene)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Refusing to overwrite"));
}

#[test]
fn edit_then_pose() {
    let dirs = TempDir::new().unwrap();
    let scene = posed_scene(&dirs);

    posekit(&dirs)
        .args(["pose", "--frame", "1"])
        .arg(&scene)
        .assert()
        .success()
        .stdout(predicate::str::contains("elbow"))
        .stdout(predicate::str::contains("110"));

    posekit(&dirs)
        .arg("tree")
        .arg("--no-color")
        .arg(&scene)
        .assert()
        .success()
        .stdout(predicate::str::contains("arm [2 bones, 2 frames]"))
        .stdout(predicate::str::contains("└── elbow"));
}

#[test]
fn bad_script_leaves_file_untouched() {
    let dirs = TempDir::new().unwrap();
    let scene = posed_scene(&dirs);
    let before = fs::read_to_string(&scene).unwrap();
    let script = dirs.path().join("bad.txt");
    fs::write(&script, "add-bone shoulder\n").unwrap();

    posekit(&dirs)
        .arg("edit")
        .arg(&scene)
        .arg(&script)
        .assert()
        .failure()
        .stderr(predicate::str::contains("shoulder"));
    assert_eq!(fs::read_to_string(&scene).unwrap(), before);
}

#[test]
fn convert_to_xml_warns_about_overrides() {
    let dirs = TempDir::new().unwrap();
    let scene = posed_scene(&dirs);
    let xml = dirs.path().join("arm.xml");

    posekit(&dirs)
        .arg("convert")
        .arg(&scene)
        .arg(&xml)
        .assert()
        .success()
        .stderr(predicate::str::contains("1 per-frame override(s)"));

    let text = fs::read_to_string(&xml).unwrap();
    assert!(text.contains("<figure name=\"arm\">"));
    posekit(&dirs).arg("validate").arg(&xml).assert().success();
}

#[test]
fn validate_rejects_cycles() {
    let dirs = TempDir::new().unwrap();
    let path = dirs.path().join("loop.xml");
    fs::write(
        &path,
        r#"<figure name="loop"><bones>
             <bone id="a" parent="b"/><bone id="b" parent="a"/>
           </bones></figure>"#,
    )
    .unwrap();

    posekit(&dirs)
        .arg("validate")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Validation failed"));
}

#[test]
fn store_roundtrip() {
    let dirs = TempDir::new().unwrap();
    let scene = posed_scene(&dirs);
    let copy = dirs.path().join("copy.json");

    posekit(&dirs)
        .args(["save"])
        .arg(&scene)
        .arg("walk")
        .assert()
        .success();
    posekit(&dirs)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("walk.json"));
    posekit(&dirs)
        .args(["load", "walk.json"])
        .arg(&copy)
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(&scene).unwrap(),
        fs::read_to_string(&copy).unwrap()
    );
    assert!(dirs.path().join("store/walk.json").is_file());
}

#[test]
fn export_writes_png_frames() {
    let dirs = TempDir::new().unwrap();
    let scene = posed_scene(&dirs);

    posekit(&dirs)
        .args(["export", "--no-gif", "--workers", "2"])
        .arg(&scene)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 2 frame(s)"));

    let jobs: Vec<_> = fs::read_dir(dirs.path().join("out"))
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    assert_eq!(jobs.len(), 1);
    assert!(Path::new(&jobs[0]).join("frame_0000.png").is_file());
    assert!(Path::new(&jobs[0]).join("frame_0001.png").is_file());
}

#[test]
fn export_rejects_zero_fps() {
    let dirs = TempDir::new().unwrap();
    let scene = posed_scene(&dirs);

    posekit(&dirs)
        .args(["export", "--fps", "0"])
        .arg(&scene)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid frame rate"));
}

#[test]
fn completions_are_generated() {
    let dirs = TempDir::new().unwrap();
    posekit(&dirs)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("posekit"));
}
