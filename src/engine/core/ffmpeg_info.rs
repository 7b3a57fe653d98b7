use super::ffmpeg_cmd::FFMPEG_BIN;
use anyhow::{Context, Result};
use std::process::Command;

/// Check if ffmpeg is available and return the first line of its version banner
pub fn ffmpeg_version() -> Result<String> {
    let output = Command::new(FFMPEG_BIN)
        .arg("-version")
        .output()
        .context("Failed to execute ffmpeg. Is ffmpeg installed and in PATH?")?;

    if !output.status.success() {
        anyhow::bail!("ffmpeg command failed with status: {}", output.status);
    }

    Ok(first_version_line(&String::from_utf8_lossy(&output.stdout)))
}

fn first_version_line(banner: &str) -> String {
    banner
        .lines()
        .next()
        .filter(|line| !line.trim().is_empty())
        .unwrap_or("Unknown version")
        .to_string()
}
