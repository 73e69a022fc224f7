//! Marker encoder backed by the embedded `calib-targets-aruco` dictionaries.
//!
//! The rendered layout follows OpenCV's `generateImageMarker`: a one-cell
//! black border around `bits × bits` data cells, black = 1, row-major, scaled
//! to the requested side with nearest-cell sampling. Markers rendered here are
//! therefore readable by any detector configured with the same dictionary.

mod encoder;

pub use encoder::{render_code, DictionaryEncoder, EncoderUnavailable};

pub use calib_targets_aruco::Dictionary;
