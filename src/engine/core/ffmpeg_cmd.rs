use super::error::EncodeError;
use super::output::{derive_output_path, staging_path_for};
use super::types::{EncodeCommand, EncodeReport, EncodeRequest, ToolOutput};
use std::ffi::OsString;
use std::fs;
use std::path::Path;
use std::process::Stdio;
use tracing::{debug, warn};

/// External encoder, resolved through PATH
pub const FFMPEG_BIN: &str = "ffmpeg";

/// Video codec every encode uses
pub const VIDEO_CODEC: &str = "libx264";

/// Range the CLI/UI keeps the CRF slider in
pub const QUALITY_MIN: u8 = 18;
pub const QUALITY_MAX: u8 = 25;
pub const DEFAULT_QUALITY: u8 = 20;

/// Clamp a CRF value into the range the front-end offers
pub fn clamp_quality(quality: i64) -> u8 {
    quality.clamp(QUALITY_MIN as i64, QUALITY_MAX as i64) as u8
}

/// Build the encode command for a request.
/// Pure apart from the input existence check; nothing is spawned.
pub fn build_encode_cmd(request: &EncodeRequest) -> Result<EncodeCommand, EncodeError> {
    let input_path = &request.input_path;
    if input_path.as_os_str().is_empty() || !input_path.is_file() {
        return Err(EncodeError::InvalidInput(input_path.clone()));
    }

    let output_dir = if request.save_to_different_location {
        match request.output_directory.as_deref() {
            Some(dir) if !dir.as_os_str().is_empty() => Some(dir),
            _ => return Err(EncodeError::MissingOutputFolder),
        }
    } else {
        None
    };

    if !(QUALITY_MIN..=QUALITY_MAX).contains(&request.quality) {
        // Front-end is responsible for the range; pass it through as-is
        warn!(
            quality = request.quality,
            "CRF outside {}-{}, passing through unchanged", QUALITY_MIN, QUALITY_MAX
        );
    }

    let output_path = derive_output_path(
        input_path,
        output_dir,
        request.overwrite_original,
        request.sanitize_file_name,
    );

    // ffmpeg refuses to read and write the same file
    let staging_path =
        same_file(&output_path, input_path).then(|| staging_path_for(&output_path));
    let target = staging_path.as_deref().unwrap_or(&output_path);

    let args: Vec<OsString> = vec![
        "-i".into(),
        input_path.as_os_str().to_os_string(),
        "-vcodec".into(),
        VIDEO_CODEC.into(),
        "-crf".into(),
        request.quality.to_string().into(),
        target.as_os_str().to_os_string(),
    ];

    let cmd = EncodeCommand {
        program: FFMPEG_BIN.to_string(),
        args,
        input_path: input_path.clone(),
        output_path,
        staging_path,
    };
    debug!(command = %cmd, "built encode command");

    Ok(cmd)
}

/// Whether `output` names the same file as `input`, seeing through `..`,
/// `./` and symlinked folders. `output` need not exist yet; its folder is
/// resolved instead. Falls back to comparing the paths as written.
fn same_file(output: &Path, input: &Path) -> bool {
    if output == input {
        return true;
    }
    let resolved_output = match (output.parent(), output.file_name()) {
        (Some(dir), Some(name)) => {
            let dir = if dir.as_os_str().is_empty() { Path::new(".") } else { dir };
            fs::canonicalize(dir).map(|dir| dir.join(name))
        }
        _ => return false,
    };
    match (resolved_output, fs::canonicalize(input)) {
        (Ok(output), Ok(input)) => output == input,
        _ => false,
    }
}

/// Runs a built command to completion.
///
/// The seam between the runner and the OS so tests can stand in for ffmpeg.
pub trait Executor: Send + Sync {
    fn execute(&self, cmd: &EncodeCommand) -> Result<ToolOutput, EncodeError>;
}

/// Spawns the real process and blocks until it exits. No timeout.
#[derive(Debug, Clone, Default)]
pub struct SystemExecutor {
    /// Replaces `cmd.program` when set
    program_override: Option<OsString>,
}

impl SystemExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a different binary with the same arguments
    pub fn with_program(program: impl Into<OsString>) -> Self {
        Self {
            program_override: Some(program.into()),
        }
    }
}

impl Executor for SystemExecutor {
    fn execute(&self, cmd: &EncodeCommand) -> Result<ToolOutput, EncodeError> {
        let mut process = match &self.program_override {
            Some(program) => {
                let mut process = std::process::Command::new(program);
                process.args(&cmd.args);
                process
            }
            None => cmd.to_command(),
        };
        process.stdin(Stdio::null());
        process.stdout(Stdio::piped());
        process.stderr(Stdio::piped());

        let program = process.get_program().to_string_lossy().into_owned();
        debug!(%program, input = %cmd.input_path.display(), "spawning encoder");

        let output = process.output().map_err(|source| EncodeError::Spawn {
            program: program.clone(),
            source,
        })?;

        Ok(ToolOutput {
            success: output.status.success(),
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Run an encode and report the size change.
///
/// A non-zero exit is returned as `ExternalToolFailure` without touching
/// the filesystem. After a zero exit both files are measured; a missing
/// output is a `Filesystem` error rather than a success.
pub fn run_encode(
    executor: &dyn Executor,
    cmd: &EncodeCommand,
) -> Result<EncodeReport, EncodeError> {
    let output = match executor.execute(cmd) {
        Ok(output) => output,
        Err(e) => {
            discard_staging(cmd);
            return Err(e);
        }
    };

    if !output.success {
        discard_staging(cmd);
        return Err(EncodeError::ExternalToolFailure {
            command: cmd.to_string(),
            exit_code: output.exit_code,
            stderr: output.stderr,
        });
    }

    let report = match finish_encode(cmd) {
        Ok(report) => report,
        Err(e) => {
            // A leftover partial file would block the next in-place run
            discard_staging(cmd);
            return Err(e);
        }
    };
    debug!(
        output = %report.output_path.display(),
        original_mb = report.original_size_mb,
        new_mb = report.new_size_mb,
        change_pct = report.change_percent,
        "encode finished"
    );

    Ok(report)
}

/// Measure both files, then move a staged result into place
fn finish_encode(cmd: &EncodeCommand) -> Result<EncodeReport, EncodeError> {
    let original_bytes = file_size(&cmd.input_path)?;
    let new_bytes = file_size(cmd.target_path())?;

    if let Some(staging) = &cmd.staging_path {
        fs::rename(staging, &cmd.output_path).map_err(|source| EncodeError::Filesystem {
            path: cmd.output_path.clone(),
            source,
        })?;
    }

    Ok(EncodeReport::from_sizes(
        cmd.output_path.clone(),
        original_bytes,
        new_bytes,
    ))
}

fn file_size(path: &Path) -> Result<u64, EncodeError> {
    fs::metadata(path)
        .map(|m| m.len())
        .map_err(|source| EncodeError::Filesystem {
            path: path.to_path_buf(),
            source,
        })
}

fn discard_staging(cmd: &EncodeCommand) {
    let Some(staging) = &cmd.staging_path else {
        return;
    };
    if staging.exists() {
        if let Err(e) = fs::remove_file(staging) {
            warn!(path = %staging.display(), error = %e, "failed to remove partial output");
        }
    }
}
