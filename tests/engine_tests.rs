//! Cut and crop engine tests against an in-memory source and encoder

mod common;

use std::path::Path;

use actclip_cli::domain::model::{Activity, FrameSize, Rect, Timespan};
use actclip_cli::engine::{CutCropEngine, EngineConfig, ExtractOutcome};
use actclip_cli::output::ClipTarget;
use common::{RecordingEncoder, SyntheticSource};
use tempfile::TempDir;

fn engine(encoder: &RecordingEncoder, min_block: u32, atomic_output: bool) -> CutCropEngine {
    CutCropEngine::new(
        Box::new(encoder.clone()),
        EngineConfig {
            min_block,
            extension: "mp4".to_string(),
            atomic_output,
        },
    )
}

fn activity(id: u32, kind: &str, start: u64, end: u64, bbox: Rect) -> Activity {
    Activity::new(id, kind, Timespan::new(start, end).unwrap(), bbox)
}

fn hidden_files(dir: &Path) -> Vec<String> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
        .filter(|name| name.starts_with('.'))
        .collect()
}

#[test]
fn test_emits_frames_up_to_exclusive_end() {
    let dir = TempDir::new().unwrap();
    let encoder = RecordingEncoder::default();
    let mut source = SyntheticSource::new(100, 64, 64, 30.0);
    let target = ClipTarget::new("ds", "video", dir.path());
    let act = activity(0, "walking", 10, 20, Rect::new(0, 0, 64, 64));

    let outcome = engine(&encoder, 64, true).extract(&mut source, &act, &target, false);

    assert_eq!(outcome, ExtractOutcome::Created { frames: 10 });
    let run = encoder.run(0);
    let expected: Vec<u8> = (10..20).map(SyntheticSource::fill_byte).collect();
    assert_eq!(run.first_bytes(), expected);
}

#[test]
fn test_end_to_end_crop() {
    let dir = TempDir::new().unwrap();
    let encoder = RecordingEncoder::default();
    let mut source = SyntheticSource::new(300, 640, 480, 30.0);
    let target = ClipTarget::new("ds", "video", dir.path());
    let act = activity(0, "walking", 50, 80, Rect::new(100, 50, 59, 81));

    let outcome = engine(&encoder, 16, true).extract(&mut source, &act, &target, true);

    assert_eq!(outcome, ExtractOutcome::Created { frames: 30 });
    let clip = dir.path().join("walking/ds_video_walking_0.mp4");
    assert!(clip.is_file());
    assert_eq!(std::fs::read_to_string(&clip).unwrap(), "30 frames");

    let run = encoder.run(0);
    assert_eq!(run.spec.frame_size, FrameSize::new(60, 82));
    assert_eq!(run.spec.frame_rate, 30.0);
    assert_eq!(run.frames.len(), 30);
    assert!(run.frames.iter().all(|frame| frame.len() == 60 * 82 * 3));
    assert!(hidden_files(&dir.path().join("walking")).is_empty());
}

#[test]
fn test_small_crop_becomes_min_block_square() {
    let dir = TempDir::new().unwrap();
    let encoder = RecordingEncoder::default();
    let mut source = SyntheticSource::new(300, 640, 480, 30.0);
    let target = ClipTarget::new("ds", "video", dir.path());
    let act = activity(0, "walking", 50, 80, Rect::new(100, 50, 59, 81));

    engine(&encoder, 64, true).extract(&mut source, &act, &target, true);

    assert_eq!(encoder.run(0).spec.frame_size, FrameSize::new(64, 64));
}

#[test]
fn test_full_frame_keeps_native_size() {
    let dir = TempDir::new().unwrap();
    let encoder = RecordingEncoder::default();
    let mut source = SyntheticSource::new(30, 320, 240, 30.0);
    let target = ClipTarget::new("ds", "video", dir.path());
    let act = activity(3, "running", 0, 5, Rect::new(10, 10, 20, 20));

    engine(&encoder, 64, true).extract(&mut source, &act, &target, false);

    let run = encoder.run(0);
    assert_eq!(run.spec.frame_size, FrameSize::new(320, 240));
    assert_eq!(run.frames.len(), 5);
}

#[test]
fn test_rerun_skips_without_launching() {
    let dir = TempDir::new().unwrap();
    let encoder = RecordingEncoder::default();
    let engine = engine(&encoder, 64, true);
    let target = ClipTarget::new("ds", "video", dir.path());
    let activities = vec![
        activity(0, "walking", 0, 10, Rect::new(0, 0, 100, 100)),
        activity(1, "running", 5, 15, Rect::new(50, 50, 100, 100)),
    ];

    let mut source = SyntheticSource::new(50, 320, 240, 30.0);
    for act in &activities {
        assert!(engine.extract(&mut source, act, &target, true).is_created());
    }
    assert_eq!(encoder.launches(), 2);

    for act in &activities {
        assert_eq!(engine.extract(&mut source, act, &target, true), ExtractOutcome::Skipped);
    }
    assert_eq!(encoder.launches(), 2);
}

#[test]
fn test_encoder_failure_leaves_no_clip() {
    let dir = TempDir::new().unwrap();
    let encoder = RecordingEncoder::failing(1);
    let mut source = SyntheticSource::new(50, 320, 240, 30.0);
    let target = ClipTarget::new("ds", "video", dir.path());
    let act = activity(0, "walking", 0, 10, Rect::new(0, 0, 100, 100));

    let outcome = engine(&encoder, 64, true).extract(&mut source, &act, &target, true);

    assert!(matches!(outcome, ExtractOutcome::Failed(_)));
    assert!(encoder.run(0).finished);
    let class_dir = dir.path().join("walking");
    assert!(!class_dir.join("ds_video_walking_0.mp4").exists());
    assert!(hidden_files(&class_dir).is_empty());
}

#[test]
fn test_write_failure_still_finishes_encoder() {
    let dir = TempDir::new().unwrap();
    let encoder = RecordingEncoder::broken_pipe_after(3);
    let mut source = SyntheticSource::new(50, 320, 240, 30.0);
    let target = ClipTarget::new("ds", "video", dir.path());
    let act = activity(0, "walking", 0, 10, Rect::new(0, 0, 100, 100));

    let outcome = engine(&encoder, 64, true).extract(&mut source, &act, &target, true);

    assert!(matches!(outcome, ExtractOutcome::Failed(_)));
    let run = encoder.run(0);
    assert!(run.finished);
    assert_eq!(run.frames.len(), 3);
    let class_dir = dir.path().join("walking");
    assert!(!class_dir.join("ds_video_walking_0.mp4").exists());
    assert!(hidden_files(&class_dir).is_empty());
}

#[test]
fn test_read_failure_still_finishes_encoder() {
    let dir = TempDir::new().unwrap();
    let encoder = RecordingEncoder::default();
    let mut source = SyntheticSource::new(50, 320, 240, 30.0).broken_at(14);
    let target = ClipTarget::new("ds", "video", dir.path());
    let act = activity(0, "walking", 10, 20, Rect::new(0, 0, 100, 100));

    let outcome = engine(&encoder, 64, true).extract(&mut source, &act, &target, true);

    assert!(matches!(outcome, ExtractOutcome::Failed(_)));
    let run = encoder.run(0);
    assert!(run.finished);
    assert_eq!(run.frames.len(), 4);
    let class_dir = dir.path().join("walking");
    assert!(!class_dir.join("ds_video_walking_0.mp4").exists());
    assert!(hidden_files(&class_dir).is_empty());
}

#[test]
fn test_crop_outside_frame_fails_before_launch() {
    let dir = TempDir::new().unwrap();
    let encoder = RecordingEncoder::default();
    let mut source = SyntheticSource::new(50, 320, 240, 30.0);
    let target = ClipTarget::new("ds", "video", dir.path());
    let act = activity(0, "walking", 0, 10, Rect::new(400, 300, 20, 20));

    let outcome = engine(&encoder, 64, true).extract(&mut source, &act, &target, true);

    assert!(matches!(outcome, ExtractOutcome::Failed(_)));
    assert_eq!(encoder.launches(), 0);
}

#[test]
fn test_span_past_end_of_stream_stops_early() {
    let dir = TempDir::new().unwrap();
    let encoder = RecordingEncoder::default();
    let mut source = SyntheticSource::new(25, 128, 128, 30.0);
    let target = ClipTarget::new("ds", "video", dir.path());
    let act = activity(0, "walking", 20, 40, Rect::new(0, 0, 64, 64));

    let outcome = engine(&encoder, 64, false).extract(&mut source, &act, &target, true);

    assert_eq!(outcome, ExtractOutcome::Created { frames: 5 });
    assert!(dir.path().join("walking/ds_video_walking_0.mp4").is_file());
}
