//! Display canvas and scale-to-fit compositing.

use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use serde::{Deserialize, Serialize};

/// Fixed size and background of the display canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSpec {
    pub height: u32,
    pub width: u32,
    /// RGB background color.
    pub background: [u8; 3],
}

impl Default for CanvasSpec {
    fn default() -> Self {
        Self {
            height: 600,
            width: 800,
            background: [0, 0, 0],
        }
    }
}

/// Text the display surface draws on top of a [`DisplayFrame`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Caption {
    pub text: String,
    /// Baseline-left anchor `(x, y)` in canvas pixels.
    pub origin: (i32, i32),
    pub font_scale: f64,
    pub color: [u8; 3],
    pub thickness: i32,
}

/// One rendered display image.
#[derive(Clone, Debug)]
pub struct DisplayFrame {
    pub image: RgbImage,
    pub caption: Option<Caption>,
}

/// Where a scaled asset lands on the canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub scale: f64,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Fit an `asset_w × asset_h` image inside the canvas without distortion.
///
/// The scale is `min(canvas_h / asset_h, canvas_w / asset_w)`; scaled sizes are
/// truncated to whole pixels and the result is centered on both axes.
/// Returns `None` for an empty asset.
pub fn fit_within(asset_w: u32, asset_h: u32, canvas_w: u32, canvas_h: u32) -> Option<Placement> {
    if asset_w == 0 || asset_h == 0 {
        return None;
    }
    let scale = (canvas_h as f64 / asset_h as f64).min(canvas_w as f64 / asset_w as f64);
    let width = ((asset_w as f64 * scale) as u32).clamp(1, canvas_w.max(1));
    let height = ((asset_h as f64 * scale) as u32).clamp(1, canvas_h.max(1));
    Some(Placement {
        scale,
        x: canvas_w.saturating_sub(width) / 2,
        y: canvas_h.saturating_sub(height) / 2,
        width,
        height,
    })
}

impl CanvasSpec {
    /// Canvas filled with the background color.
    pub fn blank(&self) -> RgbImage {
        RgbImage::from_pixel(self.width, self.height, Rgb(self.background))
    }

    /// Letterbox `asset` onto a fresh canvas.
    pub fn letterbox(&self, asset: &RgbImage) -> RgbImage {
        let mut canvas = self.blank();
        let Some(place) = fit_within(asset.width(), asset.height(), self.width, self.height) else {
            return canvas;
        };

        if place.width == asset.width() && place.height == asset.height() {
            imageops::replace(&mut canvas, asset, place.x as i64, place.y as i64);
        } else {
            let scaled = imageops::resize(asset, place.width, place.height, FilterType::Triangle);
            imageops::replace(&mut canvas, &scaled, place.x as i64, place.y as i64);
        }
        canvas
    }

    /// Blank canvas with `prompt` anchored at `x = 50`, vertically centered.
    pub fn waiting(&self, prompt: &str) -> DisplayFrame {
        DisplayFrame {
            image: self.blank(),
            caption: Some(Caption {
                text: prompt.to_string(),
                origin: (50, (self.height / 2) as i32),
                font_scale: 1.5,
                color: [255, 255, 255],
                thickness: 3,
            }),
        }
    }
}
