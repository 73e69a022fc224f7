//! Printable marker generation for every registry entry.

use crate::registry::{AssetPath, MarkerId, Registry, RegistryEntry};
use image::{GrayImage, Luma};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Encodes a marker id into a square monochrome bitmap.
///
/// The detector used at resolution time must agree with the encoder on the
/// marker family, otherwise nothing is ever recognized.
pub trait MarkerEncoder {
    /// Family name, e.g. `DICT_6X6_250`.
    fn family(&self) -> &str;

    /// Number of encodable ids (`0..capacity`).
    fn capacity(&self) -> usize;

    /// Render marker `id` as a `size_px × size_px` bitmap.
    fn encode(&self, id: MarkerId, size_px: u32) -> Result<GrayImage, EncodeError>;
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("marker id {id} is outside the family (capacity {capacity})")]
    IdOutOfRange { id: MarkerId, capacity: usize },
    #[error("marker size {size_px}px is smaller than the {min_px}px cell grid")]
    SizeTooSmall { size_px: u32, min_px: u32 },
}

/// Bitmap size and quiet-zone width.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerStyle {
    pub marker_px: u32,
    pub border_px: u32,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            marker_px: 500,
            border_px: 50,
        }
    }
}

impl MarkerStyle {
    /// Side of the padded output image.
    #[inline]
    pub fn padded_side(&self) -> u32 {
        self.marker_px + 2 * self.border_px
    }
}

/// Fatal generation errors.
#[derive(thiserror::Error, Debug)]
pub enum GenerateError {
    #[error("could not create output folder '{}': {source}", path.display())]
    OutputRoot {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("no markers were generated ({skipped} entries skipped)")]
    NothingGenerated { skipped: usize },
}

/// Why one entry produced no marker file.
#[derive(thiserror::Error, Debug)]
pub enum EntryError {
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error("encoder returned a {width}x{height} bitmap, expected a {expected}px square")]
    BadBitmap {
        width: u32,
        height: u32,
        expected: u32,
    },
    #[error("could not create folder '{}': {source}", path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        source: image::ImageError,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedMarker {
    pub id: MarkerId,
    pub asset: AssetPath,
    pub output: PathBuf,
}

#[derive(Debug)]
pub struct SkippedEntry {
    pub id: MarkerId,
    pub asset: AssetPath,
    pub error: EntryError,
}

#[derive(Debug, Default)]
pub struct GenerateReport {
    pub written: Vec<GeneratedMarker>,
    pub skipped: Vec<SkippedEntry>,
}

/// `marker_<id>.png`
pub fn marker_file_name(id: MarkerId) -> String {
    format!("marker_{id}.png")
}

/// Output location mirroring the asset's folder under `output_root`.
pub fn marker_output_path(output_root: &Path, entry: &RegistryEntry) -> PathBuf {
    let dir = match entry.path.parent() {
        Some(parent) => parent.split('/').fold(output_root.to_path_buf(), |acc, p| acc.join(p)),
        None => output_root.to_path_buf(),
    };
    dir.join(marker_file_name(entry.id))
}

/// Surround `bitmap` with a white border of `border_px` on every side.
pub fn pad_marker(bitmap: &GrayImage, border_px: u32) -> GrayImage {
    let mut out = GrayImage::from_pixel(
        bitmap.width() + 2 * border_px,
        bitmap.height() + 2 * border_px,
        Luma([255]),
    );
    image::imageops::replace(&mut out, bitmap, border_px as i64, border_px as i64);
    out
}

/// Write one padded marker per registry entry below `output_root`.
///
/// Entries that cannot be encoded or written are reported in
/// [`GenerateReport::skipped`]; the remaining entries are still processed.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(registry, encoder), fields(entries = registry.len()))
)]
pub fn generate_markers<E: MarkerEncoder + ?Sized>(
    registry: &Registry,
    output_root: &Path,
    style: MarkerStyle,
    encoder: &E,
) -> Result<GenerateReport, GenerateError> {
    fs::create_dir_all(output_root).map_err(|source| GenerateError::OutputRoot {
        path: output_root.to_path_buf(),
        source,
    })?;

    let mut report = GenerateReport::default();
    for entry in registry.iter() {
        match generate_one(entry, output_root, style, encoder) {
            Ok(output) => {
                log::info!("generated {} for {}", output.display(), entry.path);
                report.written.push(GeneratedMarker {
                    id: entry.id,
                    asset: entry.path.clone(),
                    output,
                });
            }
            Err(error) => {
                log::warn!("marker {} ({}) skipped: {error}", entry.id, entry.path);
                report.skipped.push(SkippedEntry {
                    id: entry.id,
                    asset: entry.path.clone(),
                    error,
                });
            }
        }
    }

    if report.written.is_empty() && !registry.is_empty() {
        return Err(GenerateError::NothingGenerated {
            skipped: report.skipped.len(),
        });
    }
    Ok(report)
}

fn generate_one<E: MarkerEncoder + ?Sized>(
    entry: &RegistryEntry,
    output_root: &Path,
    style: MarkerStyle,
    encoder: &E,
) -> Result<PathBuf, EntryError> {
    let bitmap = encoder.encode(entry.id, style.marker_px)?;
    if bitmap.width() != style.marker_px || bitmap.height() != style.marker_px {
        return Err(EntryError::BadBitmap {
            width: bitmap.width(),
            height: bitmap.height(),
            expected: style.marker_px,
        });
    }
    let padded = pad_marker(&bitmap, style.border_px);

    let output = marker_output_path(output_root, entry);
    if let Some(dir) = output.parent() {
        fs::create_dir_all(dir).map_err(|source| EntryError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    padded.save(&output).map_err(|source| EntryError::Write {
        path: output.clone(),
        source,
    })?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::assign_ids;

    struct Checker {
        capacity: usize,
    }

    impl MarkerEncoder for Checker {
        fn family(&self) -> &str {
            "checker"
        }

        fn capacity(&self) -> usize {
            self.capacity
        }

        fn encode(&self, id: MarkerId, size_px: u32) -> Result<GrayImage, EncodeError> {
            if id as usize >= self.capacity {
                return Err(EncodeError::IdOutOfRange {
                    id,
                    capacity: self.capacity,
                });
            }
            Ok(GrayImage::from_fn(size_px, size_px, |x, y| {
                Luma([if (x + y + id) % 2 == 0 { 0 } else { 255 }])
            }))
        }
    }

    fn registry(paths: &[&str]) -> Registry {
        let paths = paths.iter().map(|p| AssetPath::parse(p).expect("path"));
        Registry::from_entries(assign_ids(paths)).expect("registry")
    }

    #[test]
    fn padding_adds_white_margin() {
        let bitmap = GrayImage::from_pixel(4, 4, Luma([0]));
        let padded = pad_marker(&bitmap, 3);
        assert_eq!(padded.dimensions(), (10, 10));
        assert_eq!(padded.get_pixel(0, 0).0, [255]);
        assert_eq!(padded.get_pixel(2, 5).0, [255]);
        assert_eq!(padded.get_pixel(3, 3).0, [0]);
        assert_eq!(padded.get_pixel(6, 6).0, [0]);
        assert_eq!(padded.get_pixel(7, 6).0, [255]);
    }

    #[test]
    fn output_path_mirrors_asset_folder() {
        let reg = registry(&["a.png", "club/x/b.png"]);
        let root = Path::new("out");
        assert_eq!(
            marker_output_path(root, &reg.entries()[0]),
            root.join("marker_0.png")
        );
        assert_eq!(
            marker_output_path(root, &reg.entries()[1]),
            root.join("club").join("x").join("marker_1.png")
        );
    }

    #[test]
    fn unencodable_entries_are_skipped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let reg = registry(&["a.png", "b.png", "c/d.png"]);
        let style = MarkerStyle {
            marker_px: 8,
            border_px: 2,
        };
        let report =
            generate_markers(&reg, dir.path(), style, &Checker { capacity: 2 }).expect("generate");

        assert_eq!(report.written.len(), 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].id, 2);
        assert!(matches!(
            report.skipped[0].error,
            EntryError::Encode(EncodeError::IdOutOfRange { id: 2, capacity: 2 })
        ));

        let img = image::open(dir.path().join("marker_1.png"))
            .expect("marker png")
            .to_luma8();
        assert_eq!(img.dimensions(), (12, 12));
        assert!(!dir.path().join("c").join("marker_2.png").exists());
    }

    #[test]
    fn all_entries_failing_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let reg = registry(&["a.png"]);
        let res = generate_markers(&reg, dir.path(), MarkerStyle::default(), &Checker { capacity: 0 });
        assert!(matches!(
            res,
            Err(GenerateError::NothingGenerated { skipped: 1 })
        ));
    }
}
