//! OCR engine seam and the Tesseract command-line backend.

use crate::config::OcrConfig;
use image::GrayImage;
use std::path::PathBuf;
use std::process::Command;

#[derive(thiserror::Error, Debug)]
pub enum OcrError {
    #[error("OCR engine '{}' not found; install tesseract or set ocr.binary", .0.display())]
    EngineMissing(PathBuf),
    #[error("could not stage image for OCR: {0}")]
    Stage(#[from] std::io::Error),
    #[error("could not encode image for OCR: {0}")]
    Encode(#[from] image::ImageError),
    #[error("OCR engine failed ({status}): {stderr}")]
    Failed { status: String, stderr: String },
}

/// Reads text from a preprocessed (white text on black) image.
pub trait TextReader {
    fn read_text(&self, image: &GrayImage) -> Result<String, OcrError>;
}

/// Runs `tesseract <image> stdout --psm <n>`.
#[derive(Clone, Debug)]
pub struct TesseractCli {
    config: OcrConfig,
}

impl TesseractCli {
    pub fn new(config: OcrConfig) -> Self {
        Self { config }
    }

    /// Check that the executable can be started.
    pub fn engine_version(&self) -> Result<String, OcrError> {
        let out = self.command().arg("--version").output().map_err(|e| self.spawn_error(e))?;
        let text = String::from_utf8_lossy(&out.stdout);
        Ok(text.lines().next().unwrap_or_default().trim().to_string())
    }

    fn command(&self) -> Command {
        Command::new(&self.config.binary)
    }

    fn spawn_error(&self, err: std::io::Error) -> OcrError {
        if err.kind() == std::io::ErrorKind::NotFound {
            OcrError::EngineMissing(self.config.binary.clone())
        } else {
            OcrError::Stage(err)
        }
    }
}

impl TextReader for TesseractCli {
    fn read_text(&self, image: &GrayImage) -> Result<String, OcrError> {
        let staged = tempfile::Builder::new()
            .prefix("arshow-ocr-")
            .suffix(".png")
            .tempfile()?;
        image.save_with_format(staged.path(), image::ImageFormat::Png)?;

        let out = self
            .command()
            .arg(staged.path())
            .arg("stdout")
            .arg("--psm")
            .arg(self.config.psm.to_string())
            .output()
            .map_err(|e| self.spawn_error(e))?;

        if !out.status.success() {
            return Err(OcrError::Failed {
                status: out.status.to_string(),
                stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&out.stdout).into_owned())
    }
}
