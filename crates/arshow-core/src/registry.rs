//! Marker-identity registry: scan, id assignment and the JSON map file.
//!
//! Identities are positional. They are assigned `0, 1, 2, ...` in
//! lexicographic order of the forward-slash relative path, so any change to
//! the asset set between two generation runs reassigns ids. Markers printed
//! from an older registry must then be reprinted as a whole.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Small non-negative integer encoded into one printable marker.
pub type MarkerId = u32;

/// Asset location relative to the asset root, always `/`-separated.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssetPath(String);

impl AssetPath {
    /// Build from a path relative to the asset root.
    ///
    /// Returns `None` for absolute paths, paths with `..`, empty paths and
    /// components that are not valid UTF-8.
    pub fn from_relative(rel: &Path) -> Option<Self> {
        let mut parts = Vec::new();
        for comp in rel.components() {
            match comp {
                Component::Normal(part) => parts.push(part.to_str()?),
                Component::CurDir => {}
                _ => return None,
            }
        }
        if parts.is_empty() {
            return None;
        }
        Some(Self(parts.join("/")))
    }

    /// Parse a stored registry value. Backslashes are read as separators.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.replace('\\', "/");
        let parts: Vec<&str> = normalized
            .split('/')
            .filter(|p| !p.is_empty() && *p != ".")
            .collect();
        if parts.is_empty() || parts.contains(&"..") || normalized.starts_with('/') {
            return None;
        }
        Some(Self(parts.join("/")))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Directory part of the path, `None` for files directly under the root.
    pub fn parent(&self) -> Option<&str> {
        self.0.rsplit_once('/').map(|(dir, _)| dir)
    }

    /// Final component of the path.
    pub fn file_name(&self) -> &str {
        self.0.rsplit_once('/').map_or(&self.0, |(_, name)| name)
    }

    /// Resolve against a root directory using host separators.
    pub fn resolve(&self, root: &Path) -> PathBuf {
        self.0.split('/').fold(root.to_path_buf(), |acc, p| acc.join(p))
    }
}

impl fmt::Display for AssetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Case-insensitive set of accepted image extensions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtensionFilter {
    extensions: Vec<String>,
}

impl ExtensionFilter {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| {
                let e = e.to_ascii_lowercase();
                self.extensions.iter().any(|x| *x == e)
            })
            .unwrap_or(false)
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }
}

impl Default for ExtensionFilter {
    fn default() -> Self {
        Self::new(["png", "jpg", "jpeg", "bmp", "tiff"])
    }
}

/// One `(id, asset)` pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegistryEntry {
    pub id: MarkerId,
    pub path: AssetPath,
}

#[derive(thiserror::Error, Debug)]
pub enum RegistryError {
    #[error("asset folder not found at '{}'", .0.display())]
    MissingAssetRoot(PathBuf),
    #[error("no images found in '{}'", .0.display())]
    Empty(PathBuf),
    #[error("map file not found at '{}'", .0.display())]
    MissingMapFile(PathBuf),
    #[error("could not read map file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write map file '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("map file '{}' is empty or corrupt: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("marker id {0} appears more than once")]
    DuplicateId(MarkerId),
}

/// Problems with a single map-file entry. The entry is skipped.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RegistryWarning {
    #[error("invalid marker id '{0}' in map file")]
    InvalidId(String),
    #[error("marker id {id} has an invalid asset path")]
    InvalidPath { id: MarkerId },
    #[error("marker id {id} appears more than once")]
    DuplicateId { id: MarkerId },
}

/// Ordered `marker id -> asset path` mapping.
///
/// Entries are kept sorted by id and ids are unique.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Registry {
    entries: Vec<RegistryEntry>,
}

impl Registry {
    /// Build a registry from arbitrary entries, sorting them by id.
    pub fn from_entries(mut entries: Vec<RegistryEntry>) -> Result<Self, RegistryError> {
        entries.sort_by_key(|e| e.id);
        if let Some(w) = entries.windows(2).find(|w| w[0].id == w[1].id) {
            return Err(RegistryError::DuplicateId(w[0].id));
        }
        Ok(Self { entries })
    }

    /// Scan `asset_root` recursively and assign ids in sorted path order.
    #[cfg_attr(feature = "tracing", instrument(level = "info", skip(filter)))]
    pub fn build(asset_root: &Path, filter: &ExtensionFilter) -> Result<Self, RegistryError> {
        if !asset_root.is_dir() {
            return Err(RegistryError::MissingAssetRoot(asset_root.to_path_buf()));
        }

        let mut paths = Vec::new();
        for entry in WalkDir::new(asset_root).min_depth(1) {
            let entry = match entry {
                Ok(e) => e,
                Err(err) => {
                    log::warn!("skipping unreadable entry under {}: {err}", asset_root.display());
                    continue;
                }
            };
            if !entry.file_type().is_file() || !filter.accepts(entry.path()) {
                continue;
            }
            let rel = entry.path().strip_prefix(asset_root).unwrap_or(entry.path());
            match AssetPath::from_relative(rel) {
                Some(p) => paths.push(p),
                None => log::warn!("skipping non UTF-8 path {}", entry.path().display()),
            }
        }

        if paths.is_empty() {
            return Err(RegistryError::Empty(asset_root.to_path_buf()));
        }

        paths.sort();
        log::debug!("registry scan accepted {} files", paths.len());
        Ok(Self {
            entries: assign_ids(paths),
        })
    }

    #[inline]
    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: MarkerId) -> Option<&AssetPath> {
        self.entries
            .binary_search_by_key(&id, |e| e.id)
            .ok()
            .map(|i| &self.entries[i].path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegistryEntry> {
        self.entries.iter()
    }

    /// Pretty JSON (4-space indent) with keys in ascending id order.
    pub fn to_json_string(&self) -> Result<String, RegistryError> {
        let mut buf = Vec::new();
        let fmt = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, fmt);
        self.serialize(&mut ser)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Write the map file, replacing whatever is at `path`.
    pub fn persist(&self, path: &Path) -> Result<(), RegistryError> {
        let json = self.to_json_string()?;
        fs::write(path, json).map_err(|source| RegistryError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse map-file JSON. Bad entries are skipped and returned as warnings.
    pub fn parse_json(raw: &str) -> Result<(Self, Vec<RegistryWarning>), serde_json::Error> {
        let map: BTreeMap<String, serde_json::Value> = serde_json::from_str(raw)?;
        let mut warnings = Vec::new();
        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(map.len());

        for (key, value) in map {
            let Ok(id) = key.trim().parse::<MarkerId>() else {
                warnings.push(RegistryWarning::InvalidId(key));
                continue;
            };
            let Some(path) = value.as_str().and_then(AssetPath::parse) else {
                warnings.push(RegistryWarning::InvalidPath { id });
                continue;
            };
            if !seen.insert(id) {
                warnings.push(RegistryWarning::DuplicateId { id });
                continue;
            }
            entries.push(RegistryEntry { id, path });
        }

        entries.sort_by_key(|e| e.id);
        Ok((Self { entries }, warnings))
    }

    /// Read a map file written by [`Registry::persist`].
    ///
    /// Skipped entries are logged as warnings.
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let raw = fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                RegistryError::MissingMapFile(path.to_path_buf())
            } else {
                RegistryError::Read {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        let (registry, warnings) =
            Self::parse_json(&raw).map_err(|source| RegistryError::Corrupt {
                path: path.to_path_buf(),
                source,
            })?;
        for w in &warnings {
            log::warn!("{w}; skipping");
        }
        Ok(registry)
    }
}

impl Serialize for Registry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for e in &self.entries {
            map.serialize_entry(&e.id.to_string(), e.path.as_str())?;
        }
        map.end()
    }
}

/// Number sorted paths `0, 1, 2, ...` in iteration order.
pub fn assign_ids<I>(paths: I) -> Vec<RegistryEntry>
where
    I: IntoIterator<Item = AssetPath>,
{
    let (_, entries) = paths
        .into_iter()
        .fold((0 as MarkerId, Vec::new()), |(next, mut acc), path| {
            acc.push(RegistryEntry { id: next, path });
            (next + 1, acc)
        });
    entries
}
