//! Marker-identity registry and real-time marker-to-asset resolution.
//!
//! The crate covers the whole life cycle of a marker set:
//! - [`Registry`]: the durable `marker id -> asset path` mapping, built by a
//!   deterministic scan of an asset tree and persisted as JSON,
//! - [`generate_markers`]: one printable fiducial per registered id, produced
//!   through an external [`MarkerEncoder`],
//! - [`load_assets`]: eager decoding of every referenced image into an
//!   [`AssetTable`],
//! - [`ResolutionLoop`]: the per-frame detect / resolve / render loop that
//!   letterboxes the matching asset onto a fixed display canvas.
//!
//! It does *not* detect or encode markers itself. Camera, detector and display
//! are plugged in through the [`FrameSource`], [`MarkerDetector`] and
//! [`DisplaySurface`] traits.

mod assets;
mod canvas;
mod config;
mod generate;
mod registry;
mod resolve;

pub use assets::{load_assets, AssetTable, LoadError, LoadWarning, LoadedAssets};
pub use canvas::{fit_within, CanvasSpec, Caption, DisplayFrame, Placement};
pub use config::{ConfigError, GenerateConfig, ResolveConfig, StartupError};
pub use generate::{
    generate_markers, marker_file_name, marker_output_path, pad_marker, EncodeError, EntryError,
    GenerateError, GenerateReport, GeneratedMarker, MarkerEncoder, MarkerStyle, SkippedEntry,
};
pub use registry::{
    assign_ids, AssetPath, ExtensionFilter, MarkerId, Registry, RegistryEntry, RegistryError,
    RegistryWarning,
};
pub use resolve::{
    resolve, Detection, DisplayError, DisplaySurface, FrameSource, LoopStats, MarkerDetector,
    Resolution, ResolutionLoop, StopReason,
};

// stderr logger and `tracing` subscriber shared with the dictionary crates
#[cfg(feature = "tracing")]
pub use calib_targets_core::init_tracing;
pub use calib_targets_core::init_with_level;
