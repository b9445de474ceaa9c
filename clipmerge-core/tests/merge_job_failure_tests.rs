// clipmerge-core/tests/merge_job_failure_tests.rs

mod common;

use clipmerge_core::error::CoreError;
use clipmerge_core::{JobState, PipelineJob, ProgressEvent, run_merge_job};
use common::{
    Fixture, MockFfmpegSpawner, MockFfprobeExecutor, MockOutcome, audio_metadata,
    recording_progress, video_metadata,
};

/// Two valid clips plus audio, all registered with the prober.
fn valid_job(fixture: &Fixture, prober: &MockFfprobeExecutor) -> PipelineJob {
    let first = fixture.upload("first.mp4", "video/mp4");
    let second = fixture.upload("second.mp4", "video/mp4");
    let audio = fixture.upload("song.mp3", "audio/mpeg");
    prober.expect(&first.path, video_metadata("h264", 1280, 720, 4.0));
    prober.expect(&second.path, video_metadata("h264", 1280, 720, 4.0));
    prober.expect(&audio.path, audio_metadata("mp3", 6.0));
    PipelineJob::new(vec![first, second], audio)
}

#[test]
fn test_encode_failure_cleans_up() {
    let fixture = Fixture::new();
    let prober = MockFfprobeExecutor::new();
    let job = valid_job(&fixture, &prober);
    let spawner = MockFfmpegSpawner::new();
    spawner.fail_with_exit("processed_1.mp4", 1, "second.mp4: Invalid data found when processing input");

    let (callback, events) = recording_progress();
    let err = run_merge_job(&spawner, &prober, &fixture.config(), job, Some(callback)).unwrap_err();

    assert_eq!(err.stage, JobState::Normalizing);
    match &err.source {
        CoreError::Encode { file, cause } => {
            assert_eq!(file, "second.mp4");
            assert!(cause.contains("Invalid data found"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.user_message(), "One of the videos could not be processed.");
    assert!(err.to_string().contains("Invalid data found"));

    assert!(spawner.calls_matching("filelist.txt").is_empty());
    assert!(fixture.work_root_entries().is_empty());

    let last = events.lock().unwrap().last().cloned();
    assert!(matches!(
        last,
        Some(ProgressEvent::StateChanged { state: JobState::Failed, .. })
    ));
}

#[test]
fn test_concat_failure_cleans_up() {
    let fixture = Fixture::new();
    let prober = MockFfprobeExecutor::new();
    let job = valid_job(&fixture, &prober);
    let spawner = MockFfmpegSpawner::new();
    spawner.fail_with_exit("filelist.txt", 1, "Impossible to open 'processed_0.mp4'");

    let err = run_merge_job(&spawner, &prober, &fixture.config(), job, None).unwrap_err();

    assert_eq!(err.stage, JobState::Concatenating);
    assert!(matches!(&err.source, CoreError::Concat { cause } if cause.contains("Impossible to open")));
    assert!(spawner.calls_matching("merged_").is_empty());
    assert!(fixture.work_root_entries().is_empty());
}

#[test]
fn test_mux_failure_cleans_up() {
    let fixture = Fixture::new();
    let prober = MockFfprobeExecutor::new();
    let job = valid_job(&fixture, &prober);
    let spawner = MockFfmpegSpawner::new();
    spawner.fail_with_exit("merged_", 1, "Could not find tag for codec");

    let err = run_merge_job(&spawner, &prober, &fixture.config(), job, None).unwrap_err();

    assert_eq!(err.stage, JobState::Muxing);
    assert!(matches!(err.source, CoreError::Mux { .. }));
    assert_eq!(
        err.user_message(),
        "The audio track could not be added to the video."
    );
    assert!(fixture.work_root_entries().is_empty());
}

#[test]
fn test_timeout_is_reported_and_cleaned_up() {
    let fixture = Fixture::new();
    let prober = MockFfprobeExecutor::new();
    let job = valid_job(&fixture, &prober);
    let spawner = MockFfmpegSpawner::new();
    spawner.on("filelist.txt", MockOutcome::Timeout);

    let err = run_merge_job(&spawner, &prober, &fixture.config(), job, None).unwrap_err();

    assert_eq!(err.stage, JobState::Concatenating);
    assert!(matches!(err.source, CoreError::Timeout { .. }));
    assert!(err.user_message().contains("took too long"));
    assert!(fixture.work_root_entries().is_empty());
}

#[test]
fn test_missing_engine_is_an_encode_error() {
    let fixture = Fixture::new();
    let prober = MockFfprobeExecutor::new();
    let job = valid_job(&fixture, &prober);
    let spawner = MockFfmpegSpawner::new();
    spawner.on("processed_", MockOutcome::SpawnError);

    let err = run_merge_job(&spawner, &prober, &fixture.config(), job, None).unwrap_err();

    assert_eq!(err.stage, JobState::Normalizing);
    assert!(matches!(&err.source, CoreError::Encode { cause, .. } if cause.contains("ffmpeg not found")));
    assert!(fixture.work_root_entries().is_empty());
}

#[test]
fn test_panic_becomes_internal_error() {
    let fixture = Fixture::new();
    let prober = MockFfprobeExecutor::new();
    let job = valid_job(&fixture, &prober);
    let spawner = MockFfmpegSpawner::new();
    spawner.on("merged_", MockOutcome::Panic);

    let err = run_merge_job(&spawner, &prober, &fixture.config(), job, None).unwrap_err();

    assert_eq!(err.stage, JobState::Muxing);
    assert!(matches!(&err.source, CoreError::Internal(msg) if msg.contains("mock ffmpeg crashed")));
    assert!(fixture.work_root_entries().is_empty());
}

#[test]
fn test_panic_in_normalize_worker_is_contained() {
    let fixture = Fixture::new();
    let prober = MockFfprobeExecutor::new();
    let job = valid_job(&fixture, &prober);
    let spawner = MockFfmpegSpawner::new();
    spawner.on("processed_0.mp4", MockOutcome::Panic);

    let err = run_merge_job(&spawner, &prober, &fixture.config(), job, None).unwrap_err();

    assert_eq!(err.stage, JobState::Normalizing);
    assert!(matches!(err.source, CoreError::Internal(_)));
    assert!(fixture.work_root_entries().is_empty());
}

#[test]
fn test_failed_job_does_not_affect_the_next_one() {
    let fixture = Fixture::new();
    let prober = MockFfprobeExecutor::new();
    let failing = valid_job(&fixture, &prober);
    let spawner = MockFfmpegSpawner::new();
    spawner.fail_with_exit("merged_", 1, "Conversion failed!");

    let mut config = fixture.config();
    config.delete_inputs = false;
    assert!(run_merge_job(&spawner, &prober, &config, failing.clone(), None).is_err());

    let healthy = MockFfmpegSpawner::new();
    let output = run_merge_job(&healthy, &prober, &config, failing, None).unwrap();
    assert!(output.output_path.is_file());
    assert_eq!(fixture.work_root_entries(), vec![output.work_dir]);
}
