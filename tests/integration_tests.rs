//! Integration tests for the crop, cut and scan pipelines

mod common;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use actclip_cli::adapters::toml_config::{EncoderSettings, PathSettings};
use actclip_cli::adapters::{DatasetLayout, FfmpegEncoder, LibavSourceOpener};
use actclip_cli::annotations::AnnotationFormat;
use actclip_cli::app::{CropInteractor, CutInteractor, ScanInteractor};
use actclip_cli::domain::model::{Activity, FrameSize, Rect, Timespan};
use actclip_cli::domain::usecases::ClassPolicy;
use actclip_cli::engine::{CutCropEngine, EngineConfig, ExtractOutcome};
use actclip_cli::output::ClipTarget;
use actclip_cli::ports::SourceOpener;
use common::{RecordingEncoder, SyntheticOpener, SyntheticSource};
use tempfile::TempDir;

fn write(path: &Path, content: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn paths(base: &Path) -> PathSettings {
    PathSettings {
        base: base.to_path_buf(),
        ..PathSettings::default()
    }
}

fn engine(encoder: &RecordingEncoder) -> CutCropEngine {
    CutCropEngine::new(Box::new(encoder.clone()), EngineConfig::default())
}

/// Two VIRAT videos; only the first has a readable source
fn virat_dataset(base: &Path) -> SyntheticOpener {
    let annot = base.join("in/annot");
    write(
        &annot.join("A.viratdata.events.txt"),
        "\
1 10 30 10 20 10 100 50 59 81
1 10 30 40 50 40 0 0 10 10
2 7 30 5 15 5 0 0 100 100
3 99 30 5 15 5 0 0 100 100
",
    );
    write(&annot.join("B.viratdata.events.txt"), "1 9 10 0 10 0 5 5 30 30\n");

    SyntheticOpener::default().with_video(base.join("in/video/ground/virat_A.mp4"), 100, 320, 240)
}

fn crop_interactor(base: &Path, opener: SyntheticOpener, encoder: &RecordingEncoder) -> CropInteractor {
    let settings = paths(base);
    CropInteractor::new(
        DatasetLayout::new(AnnotationFormat::Virat, &settings),
        ClassPolicy::permissive(),
        Arc::new(opener),
        engine(encoder),
        settings.clip_root(),
        settings.manifest_path(),
    )
}

#[test]
fn test_crop_pipeline_virat() {
    let dir = TempDir::new().unwrap();
    let encoder = RecordingEncoder::default();
    let opener = virat_dataset(dir.path());

    let response = crop_interactor(dir.path(), opener, &encoder).execute(true).unwrap();

    let summary = &response.summary;
    assert_eq!(summary.documents, 2);
    assert_eq!(summary.created, 2);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.videos_skipped, 1);
    assert_eq!(summary.frames, 20);

    let clips = dir.path().join("out/video");
    assert!(clips.join("running/virat_A_running_0.mp4").is_file());
    assert!(clips.join("gesturing/virat_A_gesturing_1.mp4").is_file());

    // Duplicate event id 1 keeps its first row
    assert_eq!(encoder.run(0).frames.len(), 10);
    assert_eq!(encoder.run(0).spec.frame_size, FrameSize::new(64, 64));
    assert_eq!(encoder.run(1).spec.frame_size, FrameSize::new(100, 100));

    let manifest: serde_json::Value =
        serde_json::from_slice(&std::fs::read(dir.path().join("out/events.json")).unwrap()).unwrap();
    let videos: Vec<&String> = manifest.as_object().unwrap().keys().collect();
    assert_eq!(videos, vec!["A", "B"]);
    assert_eq!(manifest["A"][0]["type"], "running");
    assert_eq!(manifest["A"][0]["timespan"], serde_json::json!([10, 20]));
    assert_eq!(manifest["A"][1]["id"], 1);
    assert_eq!(manifest["B"][0]["type"], "carrying");
}

#[test]
fn test_crop_rerun_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let encoder = RecordingEncoder::default();

    crop_interactor(dir.path(), virat_dataset(dir.path()), &encoder)
        .execute(true)
        .unwrap();
    assert_eq!(encoder.launches(), 2);

    let summary = crop_interactor(dir.path(), virat_dataset(dir.path()), &encoder)
        .execute(true)
        .unwrap()
        .summary;
    assert_eq!(encoder.launches(), 2);
    assert_eq!(summary.created, 0);
    assert_eq!(summary.skipped, 2);
}

#[test]
fn test_unreadable_document_does_not_stop_batch() {
    let dir = TempDir::new().unwrap();
    let base = dir.path();
    let annot = base.join("in/annot");
    // Not valid YAML
    write(&annot.join("a-activities.yml"), "- { act: [\n");
    write(&annot.join("a-geom.yml"), "");
    write(
        &annot.join("b-activities.yml"),
        "- { act: { act2: { theft: 1.0 }, id2: 1, actors: [{ id1: 7, timespan: [{ tsr0: [0, 4] }] }] } }\n",
    );
    write(&annot.join("b-geom.yml"), "- { geom: { id1: 7, ts0: 0, g0: 10 10 90 90 } }\n");

    let settings = paths(base);
    let encoder = RecordingEncoder::default();
    let opener = SyntheticOpener::default().with_video(base.join("in/video/b.mp4"), 10, 128, 128);
    let interactor = CropInteractor::new(
        DatasetLayout::new(AnnotationFormat::Meva, &settings),
        ClassPolicy::meva(),
        Arc::new(opener),
        engine(&encoder),
        settings.clip_root(),
        settings.manifest_path(),
    );

    let response = interactor.execute(true).unwrap();
    assert_eq!(response.summary.documents_failed, 1);
    assert_eq!(response.summary.created, 1);
    assert!(base
        .join("out/video/person_steals_object/meva_b_person_steals_object_0.mp4")
        .is_file());
    assert_eq!(response.manifest.get("b").unwrap()[0].bbox, Rect::new(10, 10, 80, 80));
}

fn meva_dataset(base: &Path) {
    let annot = base.join("in/annot/2018-03-11");
    write(
        &annot.join("v1-activities.yml"),
        r#"
- { meta: "activities" }
- { act: { act2: { theft: 1.0 }, id2: 1, actors: [{ id1: 1, timespan: [{ tsr0: [5, 8] }] }] } }
- { act: { act2: { riding: 1.0 }, id2: 2, actors: [{ id1: 2, timespan: [{ tsr0: [2, 4] }] }] } }
- { act: { act2: { person_steals_object: 1.0 }, id2: 3, actors: [{ id1: 3, timespan: [{ tsr0: [1, 5] }] }] } }
- { act: { act2: { person_opens_door: 1.0 }, id2: 4, actors: [{ id1: 4, timespan: [{ tsr0: [0, 9] }] }] } }
"#,
    );
    // v1 has no geometry document; cutting needs labels only
    write(
        &annot.join("v2-activities.yml"),
        "- { act: { act2: { person_opens_door: 1.0 }, id2: 1, actors: [{ id1: 1, timespan: [{ tsr0: [0, 9] }] }] } }\n",
    );
    write(&annot.join("v2-geom.yml"), "");
}

#[test]
fn test_cut_pipeline_meva() {
    let dir = TempDir::new().unwrap();
    let base = dir.path();
    meva_dataset(base);

    let settings = paths(base);
    let encoder = RecordingEncoder::default();
    let opener = SyntheticOpener::default().with_video(base.join("in/video/2018-03-11/v1.mp4"), 20, 320, 240);
    let interactor = CutInteractor::new(
        DatasetLayout::new(AnnotationFormat::Meva, &settings),
        ClassPolicy::meva(),
        Arc::new(opener),
        engine(&encoder),
        settings.clip_root(),
    );

    let summary = interactor.execute().unwrap();
    assert_eq!(summary.created, 2);
    assert_eq!(summary.videos_skipped, 0);

    let clips = base.join("out/video");
    assert!(clips
        .join("person_steals_object/meva_v1_person_steals_object_0.mp4")
        .is_file());
    assert!(clips
        .join("person_rides_bicycle/meva_v1_person_rides_bicycle_0.mp4")
        .is_file());

    // Spans [5, 8) and [1, 5) merge into [1, 8)
    let theft = encoder.run(0);
    assert_eq!(theft.spec.frame_size, FrameSize::new(320, 240));
    let expected: Vec<u8> = (1..8).map(SyntheticSource::fill_byte).collect();
    assert_eq!(theft.first_bytes(), expected);
}

/// Two documents in different date directories that share the video name `v`
fn shared_name_dataset(base: &Path) -> SyntheticOpener {
    for (day, start) in [("d1", 0), ("d2", 3)] {
        let annot = base.join("in/annot").join(day);
        write(
            &annot.join("v-activities.yml"),
            &format!(
                "- {{ act: {{ act2: {{ theft: 1.0 }}, id2: 1, actors: [{{ id1: 7, timespan: [{{ tsr0: [{}, {}] }}] }}] }} }}\n",
                start,
                start + 4
            ),
        );
        write(&annot.join("v-geom.yml"), "- { geom: { id1: 7, ts0: 0, g0: 10 10 90 90 } }\n");
    }
    SyntheticOpener::default()
        .with_video(base.join("in/video/d1/v.mp4"), 20, 128, 128)
        .with_video(base.join("in/video/d2/v.mp4"), 20, 128, 128)
}

#[test]
fn test_crop_numbers_shared_video_name_across_documents() {
    let dir = TempDir::new().unwrap();
    let base = dir.path();
    let opener = shared_name_dataset(base);

    let settings = paths(base);
    let encoder = RecordingEncoder::default();
    let interactor = CropInteractor::new(
        DatasetLayout::new(AnnotationFormat::Meva, &settings),
        ClassPolicy::meva(),
        Arc::new(opener),
        engine(&encoder),
        settings.clip_root(),
        settings.manifest_path(),
    );

    let response = interactor.execute(true).unwrap();
    assert_eq!(response.summary.created, 2);
    assert_eq!(response.summary.skipped, 0);

    let ids: Vec<u32> = response.manifest.get("v").unwrap().iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![0, 1]);
    let clips = base.join("out/video/person_steals_object");
    assert!(clips.join("meva_v_person_steals_object_0.mp4").is_file());
    assert!(clips.join("meva_v_person_steals_object_1.mp4").is_file());
}

#[test]
fn test_cut_numbers_shared_video_name_across_documents() {
    let dir = TempDir::new().unwrap();
    let base = dir.path();
    let opener = shared_name_dataset(base);

    let settings = paths(base);
    let encoder = RecordingEncoder::default();
    let summary = CutInteractor::new(
        DatasetLayout::new(AnnotationFormat::Meva, &settings),
        ClassPolicy::meva(),
        Arc::new(opener),
        engine(&encoder),
        settings.clip_root(),
    )
    .execute()
    .unwrap();

    assert_eq!(summary.created, 2);
    assert_eq!(summary.skipped, 0);
    let clips = base.join("out/video/person_steals_object");
    assert!(clips.join("meva_v_person_steals_object_0.mp4").is_file());
    assert!(clips.join("meva_v_person_steals_object_1.mp4").is_file());
}

#[test]
fn test_scan_counts_documents_per_class() {
    let dir = TempDir::new().unwrap();
    let base = dir.path();
    meva_dataset(base);

    let settings = paths(base);
    let scanner = ScanInteractor::new(
        DatasetLayout::new(AnnotationFormat::Meva, &settings),
        ClassPolicy::meva(),
    );
    let report = scanner.execute().unwrap();

    assert_eq!(report.documents, 2);
    assert_eq!(report.classes.get("person_steals_object"), Some(&1));
    assert_eq!(report.classes.get("person_rides_bicycle"), Some(&1));
    assert_eq!(report.classes.get("person_opens_door"), None);
    assert_eq!(report.videos, vec![base.join("in/video/2018-03-11/v1.mp4")]);

    let list = base.join("relevant.txt");
    ScanInteractor::write_video_list(&report, &list).unwrap();
    let written = std::fs::read_to_string(&list).unwrap();
    assert_eq!(
        written.lines().map(PathBuf::from).collect::<Vec<_>>(),
        report.videos
    );
}

#[test]
fn test_real_encoder_round_trip() {
    if which::which("ffmpeg").is_err() {
        eprintln!("ffmpeg not found, skipping");
        return;
    }

    let dir = TempDir::new().unwrap();
    let encoder = FfmpegEncoder::new(EncoderSettings::default()).unwrap();
    let engine = CutCropEngine::new(Box::new(encoder), EngineConfig::default());

    let mut source = SyntheticSource::new(60, 320, 240, 25.0);
    let target = ClipTarget::new("ds", "video", dir.path());
    let activity = Activity::new(0, "walking", Timespan::new(10, 35).unwrap(), Rect::new(20, 20, 99, 131));

    let outcome = engine.extract(&mut source, &activity, &target, true);
    assert_eq!(outcome, ExtractOutcome::Created { frames: 25 });

    let clip = dir.path().join("walking/ds_video_walking_0.mp4");
    let opened = LibavSourceOpener::new().unwrap().open(&clip).unwrap();
    assert_eq!(opened.info().size, FrameSize::new(100, 132));
    assert!((opened.info().frame_rate - 25.0).abs() < 0.01);
}
