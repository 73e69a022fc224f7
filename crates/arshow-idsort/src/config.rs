//! Sorter configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum SortConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("region of interest is empty (x {x1}..{x2}, y {y1}..{y2})")]
    EmptyRoi { x1: u32, x2: u32, y1: u32, y2: u32 },
    #[error("vocabulary is empty")]
    EmptyVocabulary,
}

/// Pixel rectangle `[x1, x2) × [y1, y2)` holding the organization name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roi {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl Default for Roi {
    fn default() -> Self {
        Self {
            x1: 80,
            y1: 750,
            x2: 520,
            y2: 910,
        }
    }
}

/// OCR engine settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrConfig {
    /// Path or name of the `tesseract` executable.
    #[serde(default = "default_tesseract")]
    pub binary: PathBuf,
    /// Tesseract page segmentation mode (6 = single uniform block of text).
    #[serde(default = "default_psm")]
    pub psm: u8,
}

fn default_tesseract() -> PathBuf {
    PathBuf::from("tesseract")
}

fn default_psm() -> u8 {
    6
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            binary: default_tesseract(),
            psm: default_psm(),
        }
    }
}

fn default_source_dir() -> PathBuf {
    PathBuf::from("ID_cards")
}

fn default_threshold() -> u8 {
    40
}

fn default_extensions() -> Vec<String> {
    vec!["png".to_string(), "jpg".to_string(), "jpeg".to_string()]
}

fn default_vocabulary() -> Vec<String> {
    [
        "IBOT CLUB",
        "RAFTAAR",
        "SAHAAY",
        "AGNIRATH",
        "PROGRAMMING CLUB",
        "CYBERSECURITY CLUB",
        "ABHYUDAY",
        "ELECTRONICS CLUB",
        "ENVISAGE",
        "MATHEMATICS CLUB",
        "AVISHKAR",
        "BIOTECH CLUB",
        "AI CLUB",
        "AMOGH",
        "PRODUCT DESIGN CLUB",
        "WEBOPS AND BLOCKCHAIN",
        "ABHIYAN",
        "IGEM",
        "3D PRINTING CLUB",
        "AERO CLUB",
        "HORIZON",
        "ANVESHAK",
        "BRANDING AND ENGAGEMENT",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Settings of one sorting run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SortConfig {
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,
    #[serde(default)]
    pub roi: Roi,
    #[serde(default = "default_vocabulary")]
    pub vocabulary: Vec<String>,
    /// Minimum similarity (0..=100) for a match to be accepted.
    #[serde(default = "default_threshold")]
    pub threshold: u8,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    #[serde(default)]
    pub ocr: OcrConfig,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            roi: Roi::default(),
            vocabulary: default_vocabulary(),
            threshold: default_threshold(),
            extensions: default_extensions(),
            ocr: OcrConfig::default(),
        }
    }
}

impl SortConfig {
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, SortConfigError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), SortConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), SortConfigError> {
        let Roi { x1, y1, x2, y2 } = self.roi;
        if x2 <= x1 || y2 <= y1 {
            return Err(SortConfigError::EmptyRoi { x1, x2, y1, y2 });
        }
        if self.vocabulary.iter().all(|v| v.trim().is_empty()) {
            return Err(SortConfigError::EmptyVocabulary);
        }
        Ok(())
    }
}
