// clipmerge-core/tests/normalize_tests.rs

mod common;

use clipmerge_core::processing::{concatenate, normalize, normalize_all};
use common::{Fixture, MockFfmpegSpawner};
use std::fs;

#[test]
fn test_renormalizing_an_index_overwrites() -> Result<(), Box<dyn std::error::Error>> {
    let fixture = Fixture::new();
    let config = fixture.config();
    let work_dir = tempfile::tempdir()?;
    let clip = fixture.upload("clip.mp4", "video/mp4");
    let spawner = MockFfmpegSpawner::new();

    let stale = work_dir.path().join("processed_0.mp4");
    fs::write(&stale, b"stale output from an earlier attempt")?;

    let first = normalize(&spawner, &clip, 0, work_dir.path(), &config, 3.0, None)?;
    let second = normalize(&spawner, &clip, 0, work_dir.path(), &config, 3.0, None)?;

    assert_eq!(first, stale);
    assert_eq!(second, stale);
    assert_eq!(fs::read(&stale)?, b"mock media");
    for call in spawner.calls() {
        assert!(call.contains(&"-y".to_string()));
        assert!(call.contains(&"-an".to_string()));
    }
    Ok(())
}

#[test]
fn test_parallel_results_keep_submission_order() -> Result<(), Box<dyn std::error::Error>> {
    let fixture = Fixture::new();
    let mut config = fixture.config();
    config.max_parallel_jobs = 4;
    let work_dir = tempfile::tempdir()?;
    let clips: Vec<_> = (0..9)
        .map(|i| fixture.upload(&format!("clip{i}.mp4"), "video/mp4"))
        .collect();
    let spawner = MockFfmpegSpawner::new();

    let outputs = normalize_all(
        &spawner,
        &clips,
        &[1.0; 9],
        work_dir.path(),
        &config,
        None,
    )?;

    assert_eq!(outputs.len(), 9);
    for (i, output) in outputs.iter().enumerate() {
        assert_eq!(output, &work_dir.path().join(format!("processed_{i}.mp4")));
        assert!(output.is_file());
    }
    assert_eq!(spawner.calls().len(), 9);
    Ok(())
}

#[test]
fn test_manifest_escapes_quotes_in_work_dir() -> Result<(), Box<dyn std::error::Error>> {
    let fixture = Fixture::new();
    let config = fixture.config();
    let root = tempfile::tempdir()?;
    let work_dir = root.path().join("it's a dir");
    fs::create_dir(&work_dir)?;
    let clips = vec![work_dir.join("processed_0.mp4"), work_dir.join("processed_1.mp4")];
    let spawner = MockFfmpegSpawner::new();

    let output = concatenate(&spawner, &clips, &work_dir, &config, 2.0, None)?;

    assert_eq!(output, work_dir.join("concatenated.mp4"));
    let manifest = &spawner.manifests()[0];
    let first = manifest.lines().next().unwrap_or_default();
    assert!(first.contains(r"it'\''s a dir"), "{first}");
    Ok(())
}
