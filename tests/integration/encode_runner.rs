// Tests for running built commands and measuring the result

use ffred::engine::{
    EncodeError, EncodeRequest, SystemExecutor, build_encode_cmd, run_encode, staging_path_for,
};
use std::fs;
use tempfile::TempDir;

use crate::common::helpers::*;

#[test]
fn test_hundred_to_sixty_megabytes_is_forty_percent() {
    let temp_dir = TempDir::new().unwrap();
    let input = sparse_file(temp_dir.path(), "clip.mp4", 100 * MB);
    let cmd = build_encode_cmd(&EncodeRequest::new(&input, 20)).unwrap();

    let report = run_encode(&SizedEncoder { output_bytes: 60 * MB }, &cmd).unwrap();

    assert_eq!(report.original_size_mb, 100.0);
    assert_eq!(report.new_size_mb, 60.0);
    assert_eq!(report.change_percent, 40.0);
    assert_eq!(
        fs::metadata(temp_dir.path().join("ffmpeg-red-clip.mp4"))
            .unwrap()
            .len(),
        60 * MB
    );
    // Original is untouched
    assert_eq!(fs::metadata(&input).unwrap().len(), 100 * MB);
}

#[test]
fn test_nonzero_exit_skips_size_computation() {
    let temp_dir = TempDir::new().unwrap();
    let input = sparse_file(temp_dir.path(), "clip.mp4", MB);
    let cmd = build_encode_cmd(&EncodeRequest::new(&input, 22)).unwrap();
    fs::remove_file(&input).unwrap();

    let encoder = FailingEncoder {
        exit_code: 1,
        stderr: "Error opening input file clip.mp4.",
    };
    match run_encode(&encoder, &cmd) {
        Err(EncodeError::ExternalToolFailure {
            command,
            exit_code,
            stderr,
        }) => {
            assert_eq!(command, cmd.to_string());
            assert!(command.contains("-crf 22"));
            assert_eq!(exit_code, Some(1));
            assert_eq!(stderr, "Error opening input file clip.mp4.");
        }
        other => panic!("expected ExternalToolFailure, got {:?}", other),
    }
}

#[test]
fn test_in_place_encode_swaps_file() {
    let temp_dir = TempDir::new().unwrap();
    let input = sparse_file(temp_dir.path(), "clip.mp4", 80 * MB);
    let request = EncodeRequest::new(&input, 25).with_overwrite_original(true);
    let cmd = build_encode_cmd(&request).unwrap();

    let report = run_encode(&SizedEncoder { output_bytes: 20 * MB }, &cmd).unwrap();

    assert_eq!(report.output_path, input);
    assert_eq!(report.change_percent, 75.0);
    assert_eq!(fs::metadata(&input).unwrap().len(), 20 * MB);
    assert!(!staging_path_for(&input).exists());

    // Only the one file is left behind
    assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 1);
}

/// Runs the real process path against shell scripts posing as ffmpeg.
/// Scripts are written up front, before anything is spawned, and all
/// spawning stays in this one test to dodge ETXTBSY races.
#[cfg(unix)]
#[test]
fn test_system_executor_with_fake_ffmpeg() {
    use crate::common::ffmpeg_runner::write_fake_ffmpeg;

    let temp_dir = TempDir::new().unwrap();
    let bin_dir = temp_dir.path().join("bin");
    fs::create_dir(&bin_dir).unwrap();

    let shrinking =
        write_fake_ffmpeg(&bin_dir, "ffmpeg-ok", "head -c 600 \"$2\" > \"$last\"").unwrap();
    let broken = write_fake_ffmpeg(
        &bin_dir,
        "ffmpeg-broken",
        "echo \"Unknown encoder 'libx264'\" >&2\nexit 3",
    )
    .unwrap();
    let liar = write_fake_ffmpeg(&bin_dir, "ffmpeg-liar", "exit 0").unwrap();

    let input = temp_dir.path().join("clip.mp4");
    fs::write(&input, vec![7u8; 1000]).unwrap();
    let cmd = build_encode_cmd(&EncodeRequest::new(&input, 20)).unwrap();

    let report = run_encode(&SystemExecutor::with_program(&shrinking), &cmd).unwrap();
    assert_eq!(report.original_bytes, 1000);
    assert_eq!(report.new_bytes, 600);
    assert!((report.change_percent - 40.0).abs() < 1e-9);

    fs::remove_file(&cmd.output_path).unwrap();
    match run_encode(&SystemExecutor::with_program(&broken), &cmd) {
        Err(EncodeError::ExternalToolFailure {
            exit_code, stderr, ..
        }) => {
            assert_eq!(exit_code, Some(3));
            assert!(stderr.contains("Unknown encoder 'libx264'"));
        }
        other => panic!("expected ExternalToolFailure, got {:?}", other),
    }

    match run_encode(&SystemExecutor::with_program(&liar), &cmd) {
        Err(EncodeError::Filesystem { path, .. }) => assert_eq!(path, cmd.output_path),
        other => panic!("expected Filesystem error, got {:?}", other),
    }

    let missing = SystemExecutor::with_program(bin_dir.join("no-such-ffmpeg"));
    match run_encode(&missing, &cmd) {
        Err(EncodeError::Spawn { program, .. }) => assert!(program.ends_with("no-such-ffmpeg")),
        other => panic!("expected Spawn error, got {:?}", other),
    }
}
