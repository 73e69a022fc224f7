//! Assign a marker id to every image under the input folder, write one
//! printable marker per image and save the id -> image map.

use arshow::cli::{init_logging, CommonArgs};
use arshow::core::GenerateConfig;
use arshow::pipeline::run_generation;
use clap::Parser;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "arshow-generate", version, about)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    /// Write the effective configuration to this path and exit.
    #[arg(long)]
    dump_config: Option<std::path::PathBuf>,
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    init_logging(cli.common.log_level)?;

    let cfg = match &cli.common.config {
        Some(path) => GenerateConfig::load_json(path)?,
        None => GenerateConfig::default(),
    };
    if let Some(path) = &cli.dump_config {
        cfg.write_json(path)?;
        println!("Configuration written to {}", path.display());
        return Ok(());
    }

    println!(
        "Scanning '{}' and generating markers ({})...",
        cfg.input_dir.display(),
        cfg.dictionary
    );
    let run = run_generation(&cfg)?;

    for marker in &run.report.written {
        let file = marker
            .output
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        println!("  - Generated {file} for {}", marker.asset);
    }
    for skipped in &run.report.skipped {
        println!(
            "  ! Skipped marker {} for {}: {}",
            skipped.id, skipped.asset, skipped.error
        );
    }

    println!(
        "\nSuccess! Map saved to '{}' ({} entries).",
        cfg.map_file.display(),
        run.registry.len()
    );
    println!("Ids follow the sorted image paths: after adding, removing or renaming images, reprint all markers.");
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
