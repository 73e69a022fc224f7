//! Eager loading of registry assets into memory.

use crate::registry::{MarkerId, Registry};
use image::{ImageReader, RgbImage};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Decoded assets keyed by marker id.
///
/// An id without a successfully decoded image is simply absent.
#[derive(Clone, Debug, Default)]
pub struct AssetTable {
    assets: BTreeMap<MarkerId, RgbImage>,
}

impl AssetTable {
    #[inline]
    pub fn get(&self, id: MarkerId) -> Option<&RgbImage> {
        self.assets.get(&id)
    }

    #[inline]
    pub fn contains(&self, id: MarkerId) -> bool {
        self.assets.contains_key(&id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = MarkerId> + '_ {
        self.assets.keys().copied()
    }
}

impl FromIterator<(MarkerId, RgbImage)> for AssetTable {
    fn from_iter<T: IntoIterator<Item = (MarkerId, RgbImage)>>(iter: T) -> Self {
        Self {
            assets: iter.into_iter().collect(),
        }
    }
}

/// A registry entry whose asset could not be loaded.
#[derive(thiserror::Error, Debug)]
pub enum LoadWarning {
    #[error("marker {id}: image '{}' not found", path.display())]
    Missing { id: MarkerId, path: PathBuf },
    #[error("marker {id}: could not read '{}': {source}", path.display())]
    Io {
        id: MarkerId,
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("marker {id}: could not decode '{}': {source}", path.display())]
    Decode {
        id: MarkerId,
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("marker {id}: image '{}' is empty", path.display())]
    EmptyImage { id: MarkerId, path: PathBuf },
}

impl LoadWarning {
    pub fn id(&self) -> MarkerId {
        match self {
            Self::Missing { id, .. }
            | Self::Io { id, .. }
            | Self::Decode { id, .. }
            | Self::EmptyImage { id, .. } => *id,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("image folder not found at '{}'", .0.display())]
    MissingAssetRoot(PathBuf),
    #[error("no images were loaded ({attempted} map entries tried); check the map file and folder")]
    NoAssets { attempted: usize },
}

/// Result of [`load_assets`]: the table and one warning per skipped entry.
#[derive(Debug)]
pub struct LoadedAssets {
    pub table: AssetTable,
    pub warnings: Vec<LoadWarning>,
}

/// Decode every asset referenced by `registry` below `asset_root`.
///
/// Entries that fail to load are skipped with a warning. The load as a whole
/// fails only when nothing could be decoded.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(registry), fields(entries = registry.len()))
)]
pub fn load_assets(registry: &Registry, asset_root: &Path) -> Result<LoadedAssets, LoadError> {
    if !asset_root.is_dir() {
        return Err(LoadError::MissingAssetRoot(asset_root.to_path_buf()));
    }

    let mut assets = BTreeMap::new();
    let mut warnings = Vec::new();

    for entry in registry.iter() {
        let path = entry.path.resolve(asset_root);
        match decode_rgb(entry.id, &path) {
            Ok(img) => {
                log::info!("loaded '{}' for marker {}", entry.path, entry.id);
                assets.insert(entry.id, img);
            }
            Err(w) => {
                log::warn!("{w}");
                warnings.push(w);
            }
        }
    }

    if assets.is_empty() {
        return Err(LoadError::NoAssets {
            attempted: registry.len(),
        });
    }

    Ok(LoadedAssets {
        table: AssetTable { assets },
        warnings,
    })
}

fn decode_rgb(id: MarkerId, path: &Path) -> Result<RgbImage, LoadWarning> {
    let reader = ImageReader::open(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            LoadWarning::Missing {
                id,
                path: path.to_path_buf(),
            }
        } else {
            LoadWarning::Io {
                id,
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    let reader = reader.with_guessed_format().map_err(|source| LoadWarning::Io {
        id,
        path: path.to_path_buf(),
        source,
    })?;
    let img = reader
        .decode()
        .map_err(|source| LoadWarning::Decode {
            id,
            path: path.to_path_buf(),
            source,
        })?
        .to_rgb8();
    if img.width() == 0 || img.height() == 0 {
        return Err(LoadWarning::EmptyImage {
            id,
            path: path.to_path_buf(),
        });
    }
    Ok(img)
}
