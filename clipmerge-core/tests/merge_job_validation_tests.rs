// clipmerge-core/tests/merge_job_validation_tests.rs

mod common;

use clipmerge_core::error::CoreError;
use clipmerge_core::media::{MediaInput, MediaMetadata, StreamDescriptor};
use clipmerge_core::{JobState, PipelineJob, run_merge_job};
use common::{Fixture, MockFfmpegSpawner, MockFfprobeExecutor, audio_metadata, video_metadata};

#[test]
fn test_unsupported_codec_fails_fast() {
    let fixture = Fixture::new();
    let first = fixture.upload("holiday.flv", "video/x-flv");
    let second = fixture.upload("second.mp4", "video/mp4");
    let audio = fixture.upload("song.mp3", "audio/mpeg");

    let prober = MockFfprobeExecutor::new();
    prober.expect(&first.path, video_metadata("vp6", 640, 480, 3.0));
    prober.expect(&second.path, video_metadata("h264", 640, 480, 3.0));
    prober.expect(&audio.path, audio_metadata("mp3", 3.0));
    let spawner = MockFfmpegSpawner::new();

    let err = run_merge_job(
        &spawner,
        &prober,
        &fixture.config(),
        PipelineJob::new(vec![first.clone(), second], audio),
        None,
    )
    .unwrap_err();

    assert_eq!(err.stage, JobState::Validating);
    assert!(matches!(
        &err.source,
        CoreError::UnsupportedCodec { file, kind: "video", codec } if file == "holiday.flv" && codec == "vp6"
    ));
    assert_eq!(
        err.user_message(),
        "File 'holiday.flv' uses unsupported video codec 'vp6'"
    );
    assert_eq!(prober.probed(), vec![first.path.clone()]);
    assert!(spawner.calls().is_empty());
    assert!(fixture.work_root_entries().is_empty());
}

#[test]
fn test_resolution_ceiling_is_inclusive() {
    let fixture = Fixture::new();
    let uhd = fixture.upload("uhd.mp4", "video/mp4");
    let dci = fixture.upload("dci.mp4", "video/mp4");
    let audio = fixture.upload("song.mp3", "audio/mpeg");

    let prober = MockFfprobeExecutor::new();
    prober.expect(&uhd.path, video_metadata("hevc", 3840, 2160, 3.0));
    prober.expect(&dci.path, video_metadata("hevc", 4096, 2160, 3.0));
    prober.expect(&audio.path, audio_metadata("mp3", 3.0));
    let spawner = MockFfmpegSpawner::new();

    let mut config = fixture.config();
    config.delete_inputs = false;

    let err = run_merge_job(
        &spawner,
        &prober,
        &config,
        PipelineJob::new(vec![uhd.clone(), dci], audio.clone()),
        None,
    )
    .unwrap_err();

    assert!(matches!(
        err.source,
        CoreError::ResolutionTooHigh { width: 4096, height: 2160, .. }
    ));
    assert!(err.user_message().contains("dci.mp4"));

    let output = run_merge_job(
        &spawner,
        &prober,
        &config,
        PipelineJob::new(vec![uhd], audio),
        None,
    );
    assert!(output.is_ok());
}

#[test]
fn test_too_many_videos_rejected_before_probing() {
    let fixture = Fixture::new();
    let videos: Vec<MediaInput> = (0..21)
        .map(|i| fixture.upload(&format!("clip{i}.mp4"), "video/mp4"))
        .collect();
    let audio = fixture.upload("song.mp3", "audio/mpeg");
    let prober = MockFfprobeExecutor::new();
    let spawner = MockFfmpegSpawner::new();

    let err = run_merge_job(
        &spawner,
        &prober,
        &fixture.config(),
        PipelineJob::new(videos, audio),
        None,
    )
    .unwrap_err();

    assert!(matches!(
        err.source,
        CoreError::TooManyVideos { count: 21, max: 20 }
    ));
    assert!(prober.probed().is_empty());
    assert!(spawner.calls().is_empty());
}

#[test]
fn test_no_videos_rejected() {
    let fixture = Fixture::new();
    let audio = fixture.upload("song.mp3", "audio/mpeg");

    let err = run_merge_job(
        &MockFfmpegSpawner::new(),
        &MockFfprobeExecutor::new(),
        &fixture.config(),
        PipelineJob::new(Vec::new(), audio),
        None,
    )
    .unwrap_err();

    assert!(matches!(err.source, CoreError::NoVideoInputs));
    assert_eq!(err.user_message(), "At least one video is required");
}

#[test]
fn test_oversized_file_rejected_before_probing() {
    let fixture = Fixture::new();
    let small = fixture.upload("small.mp4", "video/mp4");
    let mut huge = fixture.upload("huge.mp4", "video/mp4");
    huge.size = 150 * 1024 * 1024;
    let audio = fixture.upload("song.mp3", "audio/mpeg");
    let prober = MockFfprobeExecutor::new();

    let err = run_merge_job(
        &MockFfmpegSpawner::new(),
        &prober,
        &fixture.config(),
        PipelineJob::new(vec![small, huge], audio),
        None,
    )
    .unwrap_err();

    assert!(matches!(&err.source, CoreError::FileTooLarge { file, .. } if file == "huge.mp4"));
    assert!(prober.probed().is_empty());
}

#[test]
fn test_audio_without_audio_stream() {
    let fixture = Fixture::new();
    let video = fixture.upload("clip.mp4", "video/mp4");
    let audio = fixture.upload("not_audio.mp4", "audio/mp4");

    let prober = MockFfprobeExecutor::new();
    prober.expect(&video.path, video_metadata("h264", 640, 480, 3.0));
    prober.expect(
        &audio.path,
        MediaMetadata {
            duration_secs: 3.0,
            format_name: "mov,mp4,m4a,3gp,3g2,mj2".to_string(),
            streams: vec![StreamDescriptor::video("h264", 640, 480)],
        },
    );
    let spawner = MockFfmpegSpawner::new();

    let err = run_merge_job(
        &spawner,
        &prober,
        &fixture.config(),
        PipelineJob::new(vec![video], audio),
        None,
    )
    .unwrap_err();

    assert!(matches!(&err.source, CoreError::NoAudioStream(name) if name == "not_audio.mp4"));
    assert!(spawner.calls().is_empty());
}

#[test]
fn test_unreadable_file_reports_probe_error() {
    let fixture = Fixture::new();
    let video = fixture.upload("corrupt.mp4", "video/mp4");
    let audio = fixture.upload("song.mp3", "audio/mpeg");

    let prober = MockFfprobeExecutor::new();
    prober.expect_failure(&video.path, "Invalid data found when processing input");

    let err = run_merge_job(
        &MockFfmpegSpawner::new(),
        &prober,
        &fixture.config(),
        PipelineJob::new(vec![video.clone(), video], audio),
        None,
    )
    .unwrap_err();

    assert!(matches!(&err.source, CoreError::Probe { file, .. } if file == "corrupt.mp4"));
    assert_eq!(prober.probed().len(), 1);
}

#[test]
fn test_rejected_inputs_are_still_consumed() {
    let fixture = Fixture::new();
    let video = fixture.upload("holiday.flv", "video/x-flv");
    let audio = fixture.upload("song.mp3", "audio/mpeg");

    let prober = MockFfprobeExecutor::new();
    prober.expect(&video.path, video_metadata("vp6", 640, 480, 3.0));

    let config = fixture.config();
    assert!(config.delete_inputs);
    let result = run_merge_job(
        &MockFfmpegSpawner::new(),
        &prober,
        &config,
        PipelineJob::new(vec![video.clone()], audio.clone()),
        None,
    );

    assert!(result.is_err());
    assert!(!video.path.exists());
    assert!(!audio.path.exists());
}
