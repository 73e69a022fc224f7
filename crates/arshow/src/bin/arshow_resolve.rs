//! Watch the camera and show the image registered to the first detected
//! marker, letterboxed on the display window.

use arshow::cli::{init_logging, CommonArgs};
use arshow::core::{ResolutionLoop, ResolveConfig, StopReason};
use arshow::live::{ArucoDetector, Camera, Windows};
use arshow::pipeline::prepare_resolution;
use clap::Parser;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "arshow-resolve", version, about)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    /// Camera index, overriding the configuration.
    #[arg(long)]
    camera: Option<i32>,
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    init_logging(cli.common.log_level)?;

    let mut cfg = match &cli.common.config {
        Some(path) => ResolveConfig::load_json(path)?,
        None => ResolveConfig::default(),
    };
    if let Some(index) = cli.camera {
        cfg.camera_index = index;
    }

    let loaded = prepare_resolution(&cfg)?;
    for warning in &loaded.warnings {
        println!("Warning: {warning}");
    }
    println!("Loaded {} images.", loaded.table.len());

    let mut detector = ArucoDetector::new(&cfg.dictionary)?;
    let mut camera = Camera::open(cfg.camera_index)?;
    let mut windows = Windows::new(cfg.annotate, cfg.quit_key)?;
    println!("Running. Press '{}' in a window to quit.", cfg.quit_key);

    let looper = ResolutionLoop::new(&loaded.table, cfg.canvas).with_prompt(cfg.prompt.clone());
    let stats = looper.run(&mut camera, &mut detector, &mut windows)?;

    match stats.stop {
        StopReason::QuitRequested => println!("Quit after {} frames.", stats.frames),
        StopReason::EndOfStream => println!("Camera stopped after {} frames.", stats.frames),
    }
    log::info!(
        "showing {} / waiting {} / unrecognized {}",
        stats.showing,
        stats.waiting,
        stats.unrecognized
    );
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
