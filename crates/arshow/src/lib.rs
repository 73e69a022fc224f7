//! `arshow`: print a marker per image, then show that image whenever a camera
//! sees the marker.
//!
//! This crate ties the workspace together:
//! - [`core`]: registry, marker generation, asset loading, resolution loop,
//! - [`aruco`]: dictionary-backed marker encoder,
//! - [`idsort`]: the companion ID-card sorter,
//! - [`pipeline`]: the end-to-end generation and resolver-startup steps used by
//!   the binaries,
//! - `live` (feature `opencv`): OpenCV camera, ArUco detector and HighGUI
//!   windows.

pub use arshow_aruco as aruco;
pub use arshow_core as core;
pub use arshow_idsort as idsort;

#[cfg(feature = "cli")]
pub mod cli;
#[cfg(feature = "opencv")]
pub mod live;
pub mod pipeline;
