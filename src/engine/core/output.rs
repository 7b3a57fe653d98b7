use regex::Regex;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Prepended to the file name unless the original is overwritten
pub const OUTPUT_PREFIX: &str = "ffmpeg-red-";

/// Prefix of the sibling file an in-place encode writes before it is
/// renamed over the original
pub const STAGING_PREFIX: &str = ".ffmpeg-red-partial-";

static UNSAFE_FILENAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\-.]").expect("static regex"));

/// Replace spaces and special characters with underscores
pub fn sanitize_filename(filename: &str) -> String {
    UNSAFE_FILENAME_CHARS.replace_all(filename, "_").into_owned()
}

/// Derive where an encode of `input_path` should land.
///
/// `output_dir` is the distinct output folder, if one was chosen. Without
/// `overwrite_original` the file name gets the `ffmpeg-red-` prefix, so the
/// result never collides with the input.
pub fn derive_output_path(
    input_path: &Path,
    output_dir: Option<&Path>,
    overwrite_original: bool,
    sanitize: bool,
) -> PathBuf {
    let file_name = input_path
        .file_name()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| OsString::from("output.mp4"));

    let dir = match output_dir {
        Some(dir) => dir,
        None => input_path.parent().unwrap_or_else(|| Path::new("")),
    };

    if overwrite_original {
        return dir.join(file_name);
    }

    let prefixed = if sanitize {
        OsString::from(sanitize_filename(&format!(
            "{}{}",
            OUTPUT_PREFIX,
            file_name.to_string_lossy()
        )))
    } else {
        let mut name = OsString::from(OUTPUT_PREFIX);
        name.push(&file_name);
        name
    };

    dir.join(prefixed)
}

/// Sibling path used while encoding over `output_path`.
/// Keeps the original extension so ffmpeg can still infer the container.
pub fn staging_path_for(output_path: &Path) -> PathBuf {
    let mut name = OsString::from(STAGING_PREFIX);
    name.push(output_path.file_name().unwrap_or_default());
    output_path.with_file_name(name)
}
