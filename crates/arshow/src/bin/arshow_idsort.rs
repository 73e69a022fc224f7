//! Read the club name printed on each ID card and move the card into a folder
//! named after the closest known club.

use arshow::cli::{init_logging, CommonArgs};
use arshow::idsort::{sort_directory, SortConfig, TesseractCli};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "arshow-idsort", version, about)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    /// Folder holding the card images, overriding the configuration.
    #[arg(long)]
    source: Option<PathBuf>,

    /// Minimum similarity (0..=100), overriding the configuration.
    #[arg(long)]
    threshold: Option<u8>,
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    init_logging(cli.common.log_level)?;

    let mut cfg = match &cli.common.config {
        Some(path) => SortConfig::load_json(path)?,
        None => SortConfig::default(),
    };
    if let Some(source) = cli.source {
        cfg.source_dir = source;
    }
    if let Some(threshold) = cli.threshold {
        cfg.threshold = threshold;
    }

    let reader = TesseractCli::new(cfg.ocr.clone());
    let version = reader.engine_version()?;
    log::info!("using {version}");

    println!("Scanning '{}'...", cfg.source_dir.display());
    let report = sort_directory(&cfg, &reader)?;

    for folder in &report.created_folders {
        println!("Created folder: {folder}");
    }
    for moved in &report.moved {
        println!(
            "Match: '{}' -> {} ({}%). Moved {}",
            moved.text, moved.folder, moved.score, moved.file
        );
    }
    for skipped in &report.skipped {
        println!("Skipped {}: {}", skipped.file, skipped.reason);
    }

    println!("\nValidated club sorting complete.");
    Ok(())
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
