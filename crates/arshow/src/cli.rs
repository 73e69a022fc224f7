//! Shared command-line plumbing for the binaries.

use clap::Args;
use log::LevelFilter;
use std::path::PathBuf;

/// Options every tool accepts. Without `--config` the built-in settings apply.
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// JSON configuration file overriding the built-in settings.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level for diagnostics on stderr.
    #[arg(long, default_value = "warn")]
    pub log_level: LevelFilter,
}

/// Install the logger (or the `tracing` subscriber when that feature is on).
pub fn init_logging(level: LevelFilter) -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "tracing")]
    {
        // the subscriber also forwards `log` records
        let _ = level;
        arshow_core::init_tracing(false);
        Ok(())
    }

    #[cfg(not(feature = "tracing"))]
    {
        arshow_core::init_with_level(level)?;
        Ok(())
    }
}
