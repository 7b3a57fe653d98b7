use crate::cli::{Cli, Commands, EncodeForm};
use crate::logging;
use anyhow::{Context, Result};
use ffred::config::{Config, DefaultsConfig};
use ffred::engine::{self, EncodeReport, EncodeRequest, EncodeWorker};
use std::io::Write;
use std::path::Path;
use std::process::{self, Command};
use std::thread;
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(200);

pub fn run(cli: Cli) {
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Warning: {:#}", e);
        Config::default()
    });
    logging::init(&config.logging);

    let result = match cli.command {
        Commands::Encode { form, reveal, json } => handle_encode(&form, &config, reveal, json),
        Commands::DryRun { form } => handle_dry_run(&form, &config),
        Commands::CheckFfmpeg => handle_check_ffmpeg(),
        Commands::InitConfig => handle_init_config(),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

/// Merge CLI flags over the configured defaults
fn request_from_form(form: &EncodeForm, defaults: &DefaultsConfig) -> EncodeRequest {
    let output_directory = form
        .output_dir
        .clone()
        .or_else(|| defaults.output_directory.clone());

    EncodeRequest {
        input_path: form.input.clone(),
        quality: form.crf.unwrap_or_else(|| defaults.clamped_quality()),
        save_to_different_location: form.save_elsewhere
            || form.output_dir.is_some()
            || defaults.save_to_different_location,
        output_directory,
        overwrite_original: form.overwrite || defaults.overwrite_original,
        sanitize_file_name: form.sanitize || defaults.sanitize_file_name,
    }
}

fn handle_encode(form: &EncodeForm, config: &Config, reveal: bool, json: bool) -> Result<()> {
    let request = request_from_form(form, &config.defaults);
    let cmd = engine::build_encode_cmd(&request)?;

    let mut handle = EncodeWorker::new().spawn(cmd);

    eprint!("Processing...");
    let result = loop {
        if let Some(result) = handle.try_result() {
            break result;
        }
        if handle.is_running() {
            eprint!(".");
            std::io::stderr().flush().ok();
        }
        thread::sleep(POLL_INTERVAL);
    };
    eprintln!();

    let report = result.context("An error occurred")?;
    print_report(&report, json)?;

    if reveal {
        if let Err(e) = reveal_in_file_manager(&report.output_path) {
            tracing::warn!(error = %e, "could not open output folder");
        }
    }

    Ok(())
}

fn print_report(report: &EncodeReport, json: bool) -> Result<()> {
    if json {
        let out = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
        println!("{}", out);
    } else {
        println!("{}", report);
    }
    Ok(())
}

fn handle_dry_run(form: &EncodeForm, config: &Config) -> Result<()> {
    let request = request_from_form(form, &config.defaults);
    let cmd = engine::build_encode_cmd(&request)?;

    println!("{}", cmd);
    if let Some(staging) = &cmd.staging_path {
        println!(
            "# then: {} replaces {}",
            staging.display(),
            cmd.output_path.display()
        );
    }
    Ok(())
}

fn handle_check_ffmpeg() -> Result<()> {
    let version = engine::ffmpeg_version()?;
    println!("ffmpeg found: {}", version);
    Ok(())
}

fn handle_init_config() -> Result<()> {
    let path = Config::config_path()?;

    if Config::exists() {
        match Config::load_from(&path) {
            Ok(cfg) => {
                println!("Config loaded successfully from {}", path.display());
                println!("{:#?}", cfg);
                return Ok(());
            }
            Err(e) => println!("Config invalid: {:#}", e),
        }
    } else {
        println!("Config missing at {}", path.display());
    }

    println!("Creating default config...");
    Config::default()
        .save()
        .context("Failed to save default config")?;
    println!("Default config saved to {}", path.display());
    Ok(())
}

/// Open the folder containing `output` in the platform's file manager
fn reveal_in_file_manager(output: &Path) -> std::io::Result<()> {
    let dir = output
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let opener = if cfg!(target_os = "windows") {
        "explorer"
    } else if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    };

    Command::new(opener).arg(dir).spawn().map(|_| ())
}
