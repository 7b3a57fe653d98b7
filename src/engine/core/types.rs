use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Bytes per megabyte as reported to the user (MiB)
pub const BYTES_PER_MB: f64 = 1_048_576.0;

/// Everything needed to build one encode command.
///
/// Built fresh from the current form/CLI state for every invocation and
/// never reused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodeRequest {
    pub input_path: PathBuf,
    /// CRF value; lower means higher quality and a larger file
    pub quality: u8,
    #[serde(default)]
    pub save_to_different_location: bool,
    #[serde(default)]
    pub output_directory: Option<PathBuf>,
    #[serde(default)]
    pub overwrite_original: bool,
    #[serde(default)]
    pub sanitize_file_name: bool,
}

impl EncodeRequest {
    /// Request that writes `ffmpeg-red-<name>` next to the input
    pub fn new(input_path: impl Into<PathBuf>, quality: u8) -> Self {
        Self {
            input_path: input_path.into(),
            quality,
            save_to_different_location: false,
            output_directory: None,
            overwrite_original: false,
            sanitize_file_name: false,
        }
    }

    /// Write into `dir` instead of the input's directory
    pub fn with_output_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.save_to_different_location = true;
        self.output_directory = Some(dir.into());
        self
    }

    pub fn with_overwrite_original(mut self, overwrite: bool) -> Self {
        self.overwrite_original = overwrite;
        self
    }

    pub fn with_sanitized_file_name(mut self, sanitize: bool) -> Self {
        self.sanitize_file_name = sanitize;
        self
    }
}

/// A built encode command plus the paths it reads and writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeCommand {
    pub program: String,
    pub args: Vec<OsString>,
    pub input_path: PathBuf,
    /// Where the result ends up once the encode succeeds
    pub output_path: PathBuf,
    /// Set for in-place encodes: the tool writes here, then it is renamed
    /// over `output_path`
    pub staging_path: Option<PathBuf>,
}

impl EncodeCommand {
    /// The file the external tool actually writes
    pub fn target_path(&self) -> &Path {
        self.staging_path.as_deref().unwrap_or(&self.output_path)
    }

    pub fn is_in_place(&self) -> bool {
        self.staging_path.is_some()
    }

    /// Value passed after `-crf`, if present
    pub fn quality_arg(&self) -> Option<&str> {
        let mut args = self.args.iter();
        while let Some(arg) = args.next() {
            if arg == "-crf" {
                return args.next().and_then(|v| v.to_str());
            }
        }
        None
    }

    /// Convert into a `std::process::Command` ready to spawn
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

impl fmt::Display for EncodeCommand {
    /// Shell-quoted rendering, for display and error reports only
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quote_arg(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", quote_arg(&arg.to_string_lossy()))?;
        }
        Ok(())
    }
}

fn quote_arg(arg: &str) -> String {
    match shlex::try_quote(arg) {
        Ok(quoted) => quoted.into_owned(),
        // Only fails on interior NUL bytes, which can't reach a real argv anyway
        Err(_) => format!("{:?}", arg),
    }
}

/// Before/after sizes of a successful encode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodeReport {
    pub output_path: PathBuf,
    pub original_bytes: u64,
    pub new_bytes: u64,
    pub original_size_mb: f64,
    pub new_size_mb: f64,
    /// Positive when the file shrank
    pub change_percent: f64,
}

impl EncodeReport {
    pub fn from_sizes(output_path: PathBuf, original_bytes: u64, new_bytes: u64) -> Self {
        let original_size_mb = original_bytes as f64 / BYTES_PER_MB;
        let new_size_mb = new_bytes as f64 / BYTES_PER_MB;
        let change_percent = if original_bytes == 0 {
            0.0
        } else {
            (original_size_mb - new_size_mb) / original_size_mb * 100.0
        };

        Self {
            output_path,
            original_bytes,
            new_bytes,
            original_size_mb,
            new_size_mb,
            change_percent,
        }
    }
}

impl fmt::Display for EncodeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "File processed successfully:")?;
        writeln!(f, "{}", self.output_path.display())?;
        writeln!(f)?;
        writeln!(f, "Original file size: {:.2} MB", self.original_size_mb)?;
        writeln!(f, "New file size: {:.2} MB", self.new_size_mb)?;
        write!(f, "Change: {:.2}%", self.change_percent)
    }
}

/// What the external tool left behind after exiting
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}
