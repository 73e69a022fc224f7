//! JSON configuration for the generation and resolution tools.
//!
//! The `Default` implementations are the compiled-in settings used when no
//! config file is given.

use crate::canvas::CanvasSpec;
use crate::generate::MarkerStyle;
use crate::registry::ExtensionFilter;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Resources missing before the resolver may open the camera.
#[derive(thiserror::Error, Debug)]
pub enum StartupError {
    #[error("missing map file '{}'; run the generator first", .0.display())]
    MissingMapFile(PathBuf),
    #[error("missing image folder '{}'", .0.display())]
    MissingAssetRoot(PathBuf),
}

fn default_dictionary() -> String {
    "DICT_6X6_250".to_string()
}

fn default_map_file() -> PathBuf {
    PathBuf::from("aruco_image_map.json")
}

fn default_asset_dir() -> PathBuf {
    PathBuf::from("ID_cards")
}

fn default_extensions() -> Vec<String> {
    ExtensionFilter::default().extensions().to_vec()
}

/// Settings of the marker generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateConfig {
    #[serde(default = "default_asset_dir")]
    pub input_dir: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_map_file")]
    pub map_file: PathBuf,
    #[serde(default = "default_dictionary")]
    pub dictionary: String,
    #[serde(default)]
    pub style: MarkerStyle,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("generated_markers")
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            input_dir: default_asset_dir(),
            output_dir: default_output_dir(),
            map_file: default_map_file(),
            dictionary: default_dictionary(),
            style: MarkerStyle::default(),
            extensions: default_extensions(),
        }
    }
}

impl GenerateConfig {
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn extension_filter(&self) -> ExtensionFilter {
        ExtensionFilter::new(&self.extensions)
    }
}

fn default_camera_index() -> i32 {
    0
}

fn default_prompt() -> String {
    crate::ResolutionLoop::DEFAULT_PROMPT.to_string()
}

fn default_true() -> bool {
    true
}

fn default_quit_key() -> char {
    'q'
}

/// Settings of the live resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolveConfig {
    #[serde(default = "default_asset_dir")]
    pub image_dir: PathBuf,
    #[serde(default = "default_map_file")]
    pub map_file: PathBuf,
    /// Must name the family the markers were generated with.
    #[serde(default = "default_dictionary")]
    pub dictionary: String,
    #[serde(default)]
    pub canvas: CanvasSpec,
    #[serde(default = "default_prompt")]
    pub prompt: String,
    #[serde(default = "default_camera_index")]
    pub camera_index: i32,
    /// Draw detection outlines on the camera feed.
    #[serde(default = "default_true")]
    pub annotate: bool,
    #[serde(default = "default_quit_key")]
    pub quit_key: char,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            image_dir: default_asset_dir(),
            map_file: default_map_file(),
            dictionary: default_dictionary(),
            canvas: CanvasSpec::default(),
            prompt: default_prompt(),
            camera_index: default_camera_index(),
            annotate: true,
            quit_key: default_quit_key(),
        }
    }
}

impl ResolveConfig {
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Both the map file and the image folder must exist.
    pub fn preflight(&self) -> Result<(), StartupError> {
        if !self.map_file.is_file() {
            return Err(StartupError::MissingMapFile(self.map_file.clone()));
        }
        if !self.image_dir.is_dir() {
            return Err(StartupError::MissingAssetRoot(self.image_dir.clone()));
        }
        Ok(())
    }
}
