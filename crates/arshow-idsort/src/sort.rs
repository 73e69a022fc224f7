//! Directory-level sorting run.

use crate::config::{SortConfig, SortConfigError};
use crate::matching::{best_match, sanitize_folder_name, VocabMatch};
use crate::ocr::{OcrError, TextReader};
use crate::preprocess::{crop_roi, preprocess_for_ocr};
use arshow_core::ExtensionFilter;
use std::fs;
use std::path::{Path, PathBuf};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors that stop the whole run.
#[derive(thiserror::Error, Debug)]
pub enum SortError {
    #[error(transparent)]
    Config(#[from] SortConfigError),
    #[error("source folder not found at '{}'", .0.display())]
    MissingSource(PathBuf),
    #[error("could not list '{}': {source}", path.display())]
    ListSource {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("no image files found in '{}'", .0.display())]
    NoImages(PathBuf),
    #[error(transparent)]
    Ocr(OcrError),
}

/// Why a card was left in place.
#[derive(thiserror::Error, Debug)]
pub enum SkipReason {
    #[error("could not read image: {0}")]
    Unreadable(#[from] image::ImageError),
    #[error("region of interest lies outside the image")]
    RoiOutside,
    #[error("OCR failed: {0}")]
    Ocr(OcrError),
    #[error("no text detected")]
    NoText,
    #[error("no match for '{text}'{}", best_suffix(.best))]
    NoMatch {
        text: String,
        best: Option<VocabMatch>,
    },
    #[error("'{}' already exists", .0.display())]
    DestinationExists(PathBuf),
    #[error("could not create folder '{}': {source}", path.display())]
    CreateFolder {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not move to '{}': {source}", path.display())]
    Move {
        path: PathBuf,
        source: std::io::Error,
    },
}

fn best_suffix(best: &Option<VocabMatch>) -> String {
    best.as_ref()
        .map(|b| format!(" (best: '{}' @ {}%)", b.label, b.score))
        .unwrap_or_default()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MovedCard {
    pub file: String,
    pub text: String,
    pub label: String,
    pub score: u8,
    pub folder: String,
    pub destination: PathBuf,
}

#[derive(Debug)]
pub struct SkippedCard {
    pub file: String,
    pub reason: SkipReason,
}

#[derive(Debug, Default)]
pub struct SortReport {
    pub moved: Vec<MovedCard>,
    pub skipped: Vec<SkippedCard>,
    /// Folders created during this run.
    pub created_folders: Vec<String>,
}

/// Sort the top-level images of `cfg.source_dir` into per-label folders.
///
/// Per-card failures are collected in the report. A missing OCR engine
/// aborts the run since no card could be read.
#[cfg_attr(feature = "tracing", instrument(level = "info", skip(cfg, reader)))]
pub fn sort_directory<R: TextReader + ?Sized>(
    cfg: &SortConfig,
    reader: &R,
) -> Result<SortReport, SortError> {
    cfg.validate()?;
    let files = list_images(&cfg.source_dir, &ExtensionFilter::new(&cfg.extensions))?;
    log::info!("scanning {} images in {}", files.len(), cfg.source_dir.display());

    let mut report = SortReport::default();
    for file in files {
        match sort_one(cfg, reader, &file, &mut report.created_folders) {
            Ok(moved) => {
                log::info!(
                    "match '{}' -> '{}'; moved {}",
                    moved.text,
                    moved.folder,
                    moved.file
                );
                report.moved.push(moved);
            }
            Err(SkipReason::Ocr(err @ OcrError::EngineMissing(_))) => {
                return Err(SortError::Ocr(err));
            }
            Err(reason) => {
                log::warn!("{file}: {reason}; skipping");
                report.skipped.push(SkippedCard { file, reason });
            }
        }
    }
    Ok(report)
}

fn list_images(dir: &Path, filter: &ExtensionFilter) -> Result<Vec<String>, SortError> {
    if !dir.is_dir() {
        return Err(SortError::MissingSource(dir.to_path_buf()));
    }
    let list_err = |source| SortError::ListSource {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(list_err)? {
        let entry = entry.map_err(list_err)?;
        let path = entry.path();
        if !path.is_file() || !filter.accepts(&path) {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            files.push(name.to_string());
        }
    }

    if files.is_empty() {
        return Err(SortError::NoImages(dir.to_path_buf()));
    }
    files.sort();
    Ok(files)
}

fn sort_one<R: TextReader + ?Sized>(
    cfg: &SortConfig,
    reader: &R,
    file: &str,
    created: &mut Vec<String>,
) -> Result<MovedCard, SkipReason> {
    let source = cfg.source_dir.join(file);
    let img = image::open(&source)?.to_rgb8();
    let crop = crop_roi(&img, cfg.roi).ok_or(SkipReason::RoiOutside)?;
    let processed = preprocess_for_ocr(&crop);

    let text = reader
        .read_text(&processed)
        .map_err(SkipReason::Ocr)?
        .trim()
        .to_uppercase();
    if text.is_empty() {
        return Err(SkipReason::NoText);
    }

    let best = best_match(&text, &cfg.vocabulary);
    let m = match best {
        Some(m) if m.score >= cfg.threshold => m,
        best => return Err(SkipReason::NoMatch { text, best }),
    };

    let folder = sanitize_folder_name(&m.label);
    let target_dir = cfg.source_dir.join(&folder);
    if !target_dir.is_dir() {
        fs::create_dir_all(&target_dir).map_err(|source| SkipReason::CreateFolder {
            path: target_dir.clone(),
            source,
        })?;
        log::info!("created folder {folder}");
        created.push(folder.clone());
    }

    let destination = target_dir.join(file);
    if destination.exists() {
        return Err(SkipReason::DestinationExists(destination));
    }
    move_file(&source, &destination).map_err(|source| SkipReason::Move {
        path: destination.clone(),
        source,
    })?;

    Ok(MovedCard {
        file: file.to_string(),
        text,
        label: m.label,
        score: m.score,
        folder,
        destination,
    })
}

/// Rename, falling back to copy + remove only across file systems.
///
/// The card never ends up in both places: if the source cannot be removed
/// after copying, the copy is deleted again.
fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::CrossesDevices => {
            fs::copy(from, to)?;
            if let Err(err) = fs::remove_file(from) {
                let _ = fs::remove_file(to);
                return Err(err);
            }
            Ok(())
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_rename_leaves_no_copy() {
        let dir = tempfile::tempdir().expect("tempdir");
        let to = dir.path().join("AERO_CLUB").join("a.png");
        // missing target folder: rename fails without a cross-device error
        fs::write(dir.path().join("a.png"), b"card").expect("write");

        let err = move_file(&dir.path().join("a.png"), &to).expect_err("no folder");
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
        assert!(dir.path().join("a.png").is_file());
        assert!(!to.exists());
    }

    #[test]
    fn rename_moves_within_a_folder_tree() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(dir.path().join("IGEM")).expect("mkdir");
        fs::write(dir.path().join("b.png"), b"card").expect("write");

        let to = dir.path().join("IGEM").join("b.png");
        move_file(&dir.path().join("b.png"), &to).expect("move");
        assert!(!dir.path().join("b.png").exists());
        assert_eq!(fs::read(&to).expect("read"), b"card");
    }
}
