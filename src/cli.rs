use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ffred", version)]
#[command(about = "FFmpeg MP4 video file size reducer", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Re-encode an MP4 and report how much smaller it got
    Encode {
        #[command(flatten)]
        form: EncodeForm,

        /// Open the output folder once the encode succeeds
        #[arg(long)]
        reveal: bool,

        /// Print the result as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Show the ffmpeg command without executing it
    DryRun {
        #[command(flatten)]
        form: EncodeForm,
    },

    /// Check if ffmpeg is installed
    CheckFfmpeg,

    /// Show config status and location, or create default config if missing
    InitConfig,
}

/// The inputs of one encode; unset flags fall back to the config file
#[derive(Args, Debug, Clone)]
pub struct EncodeForm {
    /// Input video file
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// CRF value (lower = higher quality, larger file)
    #[arg(long, value_parser = clap::value_parser!(u8).range(18..=25))]
    pub crf: Option<u8>,

    /// Save to a different location (implies --save-elsewhere)
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Save to a different location, using the folder from the config file
    #[arg(long)]
    pub save_elsewhere: bool,

    /// Overwrite the original file instead of writing ffmpeg-red-<name>
    #[arg(long)]
    pub overwrite: bool,

    /// Replace spaces and special characters in the output file name
    #[arg(long)]
    pub sanitize: bool,
}

pub fn parse() -> Cli {
    Cli::parse()
}
