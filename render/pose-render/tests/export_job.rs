//! End-to-end export jobs against a temporary output root

use std::sync::Mutex;

use pose_render::{
    ExportOptions, ExportService, ExportServiceConfig, ExportStatus, RenderError, RenderOptions,
};
use pose_scene::{Bone, BoneOverride, Scene};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn swing(frames: u32) -> Scene {
    let mut scene = Scene::new("swing");
    scene
        .add_bone(Bone::new("shoulder").at(16.0, 16.0).with_length(8.0))
        .unwrap();
    scene
        .add_bone(
            Bone::new("forearm")
                .at(8.0, 0.0)
                .with_length(8.0)
                .with_parent("shoulder"),
        )
        .unwrap();
    for i in 1..frames {
        let frame = scene.add_frame().unwrap();
        scene
            .set_frame_override(frame, "shoulder", &BoneOverride::angle(f64::from(i) * 15.0))
            .unwrap();
    }
    scene
}

fn small_options() -> ExportOptions {
    ExportOptions {
        fps: 10,
        render: RenderOptions {
            width: 32,
            height: 32,
            ..RenderOptions::default()
        },
        ..ExportOptions::default()
    }
}

#[test]
fn export_writes_frames_and_gif() {
    let dir = TempDir::new().unwrap();
    let config = ExportServiceConfig::new(dir.path()).with_workers(2);
    let service = ExportService::new(config).unwrap();
    let scene = swing(4);
    let statuses = Mutex::new(Vec::new());

    let report = service
        .export(&scene, &small_options(), |status| {
            statuses.lock().unwrap().push(status);
        })
        .unwrap();

    assert_eq!(report.frame_count, 4);
    assert!(report.directory.starts_with(dir.path()));
    let names: Vec<String> = report
        .frame_paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec![
            "frame_0000.png",
            "frame_0001.png",
            "frame_0002.png",
            "frame_0003.png"
        ]
    );
    for path in &report.frame_paths {
        let image = image::open(path).unwrap();
        assert_eq!((image.width(), image.height()), (32, 32));
    }

    let gif = report.gif_path.clone().unwrap();
    assert_eq!(gif, report.directory.join(format!("{}.gif", report.job_id)));
    assert!(std::fs::metadata(&gif).unwrap().len() > 0);

    let statuses = statuses.into_inner().unwrap();
    assert_eq!(statuses.len(), 6);
    assert_eq!(
        statuses.first(),
        Some(&ExportStatus::Started {
            job_id: report.job_id.clone(),
            frames: 4
        })
    );
    assert_eq!(
        statuses.last(),
        Some(&ExportStatus::Finished {
            job_id: report.job_id.clone()
        })
    );
    let mut rendered: Vec<u32> = statuses
        .iter()
        .filter_map(|s| match s {
            ExportStatus::FrameRendered { frame } => Some(*frame),
            _ => None,
        })
        .collect();
    rendered.sort_unstable();
    assert_eq!(rendered, vec![0, 1, 2, 3]);
}

#[test]
fn export_fills_shared_pose_cache() {
    let dir = TempDir::new().unwrap();
    let service = ExportService::new(ExportServiceConfig::new(dir.path())).unwrap();
    let scene = swing(3);
    let options = ExportOptions {
        write_png: false,
        write_gif: false,
        ..small_options()
    };

    let report = service.export(&scene, &options, |_| {}).unwrap();
    assert!(report.frame_paths.is_empty());
    assert_eq!(report.gif_path, None);
    for frame in 0..3 {
        assert!(scene.evaluator().is_cached(frame));
    }
}

#[test]
fn export_without_frames_is_rejected() {
    let dir = TempDir::new().unwrap();
    let service = ExportService::new(ExportServiceConfig::new(dir.path())).unwrap();
    let mut scene = swing(1);
    scene.skeleton_mut().frames_mut().clear();

    let err = service.export(&scene, &small_options(), |_| {}).unwrap_err();
    assert!(matches!(err, RenderError::NoFrames(name) if name == "swing"));
}

#[test]
fn cyclic_scene_fails_the_job() {
    let dir = TempDir::new().unwrap();
    let service = ExportService::new(ExportServiceConfig::new(dir.path())).unwrap();
    let mut scene = swing(2);
    scene
        .skeleton_mut()
        .bones_mut()
        .get_mut("shoulder")
        .unwrap()
        .parent = Some("forearm".into());

    let err = service.export(&scene, &small_options(), |_| {}).unwrap_err();
    assert!(matches!(err, RenderError::Scene(_)));
}
