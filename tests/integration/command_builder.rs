// Tests for building encode commands from requests

use ffred::engine::{
    EncodeError, EncodeRequest, OUTPUT_PREFIX, QUALITY_MAX, QUALITY_MIN, build_encode_cmd,
};
use proptest::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use crate::common::helpers::*;

#[test]
fn test_nonexistent_input_is_invalid() {
    let request = EncodeRequest::new("/tmp/does_not_exist.mp4", 20);
    match build_encode_cmd(&request) {
        Err(EncodeError::InvalidInput(path)) => {
            assert_eq!(path, PathBuf::from("/tmp/does_not_exist.mp4"));
        }
        other => panic!("expected InvalidInput, got {:?}", other),
    }
}

#[test]
fn test_distinct_location_without_folder() {
    let temp_dir = TempDir::new().unwrap();
    let input = sparse_file(temp_dir.path(), "clip.mp4", 1024);

    let mut request = EncodeRequest::new(&input, 20);
    request.save_to_different_location = true;
    request.output_directory = None;

    assert!(matches!(
        build_encode_cmd(&request),
        Err(EncodeError::MissingOutputFolder)
    ));
}

#[test]
fn test_invalid_input_checked_before_output_folder() {
    let mut request = EncodeRequest::new("/tmp/does_not_exist.mp4", 20);
    request.save_to_different_location = true;

    assert!(matches!(
        build_encode_cmd(&request),
        Err(EncodeError::InvalidInput(_))
    ));
}

#[test]
fn test_output_directory_ignored_without_distinct_location() {
    let temp_dir = TempDir::new().unwrap();
    let input = sparse_file(temp_dir.path(), "clip.mp4", 1024);

    let mut request = EncodeRequest::new(&input, 20);
    request.output_directory = Some(PathBuf::from("/somewhere/else"));

    let cmd = build_encode_cmd(&request).unwrap();
    assert_eq!(cmd.output_path, temp_dir.path().join("ffmpeg-red-clip.mp4"));
}

#[test]
fn test_overwrite_into_other_folder_is_not_in_place() {
    let temp_dir = TempDir::new().unwrap();
    let out_dir = temp_dir.path().join("out");
    fs::create_dir(&out_dir).unwrap();
    let input = sparse_file(temp_dir.path(), "clip.mp4", 1024);

    let request = EncodeRequest::new(&input, 20)
        .with_output_directory(&out_dir)
        .with_overwrite_original(true);
    let cmd = build_encode_cmd(&request).unwrap();

    assert_eq!(cmd.output_path, out_dir.join("clip.mp4"));
    assert!(!cmd.is_in_place());
    assert_eq!(
        args_to_strings(&cmd).last().unwrap(),
        &out_dir.join("clip.mp4").to_string_lossy()
    );
}

#[test]
fn test_paths_with_quotes_stay_single_arguments() {
    let temp_dir = TempDir::new().unwrap();
    let input = sparse_file(temp_dir.path(), "it's \"fine\"; rm -rf.mp4", 1024);

    let cmd = build_encode_cmd(&EncodeRequest::new(&input, 20)).unwrap();
    let args = args_to_strings(&cmd);

    assert_eq!(args.len(), 7);
    assert_eq!(args[1], input.to_string_lossy());
    assert!(args[6].ends_with("ffmpeg-red-it's \"fine\"; rm -rf.mp4"));
}

#[test]
fn test_sanitized_output_name() {
    let temp_dir = TempDir::new().unwrap();
    let input = sparse_file(temp_dir.path(), "summer trip (final).mp4", 1024);

    let request = EncodeRequest::new(&input, 20).with_sanitized_file_name(true);
    let cmd = build_encode_cmd(&request).unwrap();

    assert_eq!(
        cmd.output_path,
        temp_dir.path().join("ffmpeg-red-summer_trip__final_.mp4")
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_quality_follows_crf_flag(quality in QUALITY_MIN..=QUALITY_MAX) {
        let temp_dir = TempDir::new().unwrap();
        let input = sparse_file(temp_dir.path(), "clip.mp4", 1024);

        let cmd = build_encode_cmd(&EncodeRequest::new(&input, quality)).unwrap();
        let args = args_to_strings(&cmd);
        let crf_at = args.iter().position(|a| a == "-crf").unwrap();
        let expected = quality.to_string();

        prop_assert_eq!(args.iter().filter(|a| *a == "-crf").count(), 1);
        prop_assert_eq!(&args[crf_at + 1], &expected);
        prop_assert_eq!(cmd.quality_arg(), Some(expected.as_str()));
    }

    #[test]
    fn prop_prefixed_output_never_equals_input(name in "[a-zA-Z0-9 _-]{1,24}") {
        let temp_dir = TempDir::new().unwrap();
        let file_name = format!("{}.mp4", name);
        let input = sparse_file(temp_dir.path(), &file_name, 1024);

        let cmd = build_encode_cmd(&EncodeRequest::new(&input, 20)).unwrap();

        let expected = format!("{}{}", OUTPUT_PREFIX, file_name);
        prop_assert_eq!(
            cmd.output_path.file_name().unwrap().to_string_lossy(),
            expected.as_str()
        );
        prop_assert_ne!(&cmd.output_path, &input);
        prop_assert!(!cmd.is_in_place());
    }

    #[test]
    fn prop_overwrite_targets_input(name in "[a-zA-Z0-9_-]{1,24}") {
        let temp_dir = TempDir::new().unwrap();
        let input = sparse_file(temp_dir.path(), &format!("{}.mp4", name), 1024);

        let request = EncodeRequest::new(&input, 20).with_overwrite_original(true);
        let cmd = build_encode_cmd(&request).unwrap();

        prop_assert_eq!(&cmd.output_path, &input);
        prop_assert!(cmd.is_in_place());
        prop_assert_ne!(cmd.target_path(), input.as_path());
    }
}
