mod error;
mod ffmpeg_cmd;
mod ffmpeg_info;
mod output;
mod types;

pub use error::EncodeError;
pub use ffmpeg_cmd::{
    DEFAULT_QUALITY, Executor, FFMPEG_BIN, QUALITY_MAX, QUALITY_MIN, SystemExecutor, VIDEO_CODEC,
    build_encode_cmd, clamp_quality, run_encode,
};
pub use ffmpeg_info::ffmpeg_version;
pub use output::{
    OUTPUT_PREFIX, STAGING_PREFIX, derive_output_path, sanitize_filename, staging_path_for,
};
pub use types::{BYTES_PER_MB, EncodeCommand, EncodeReport, EncodeRequest, ToolOutput};
