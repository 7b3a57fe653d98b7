use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Everything that can end a single encode invocation.
///
/// None of these are retried. The first two are raised while building the
/// command, before any process is spawned.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("Input file does not exist: {}", .0.display())]
    InvalidInput(PathBuf),

    #[error("Please select an output folder")]
    MissingOutputFolder,

    #[error("Failed to start {program}. Is it installed and in PATH?")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Encoder exited with {}\nCommand: {command}\n{stderr}", describe_exit(.exit_code))]
    ExternalToolFailure {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    /// The tool reported success but the filesystem disagrees
    #[error("Encoder reported success but {} could not be read", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code (killed by signal)".to_string(),
    }
}
