//! Region cropping and binarization ahead of OCR.

use crate::config::Roi;
use image::imageops::{self, FilterType};
use image::{GrayImage, Luma, RgbImage};

/// Crop `roi` out of `img`, clamped to the image bounds.
///
/// Returns `None` when the clamped region is empty.
pub fn crop_roi(img: &RgbImage, roi: Roi) -> Option<RgbImage> {
    let x1 = roi.x1.min(img.width());
    let x2 = roi.x2.min(img.width());
    let y1 = roi.y1.min(img.height());
    let y2 = roi.y2.min(img.height());
    if x2 <= x1 || y2 <= y1 {
        return None;
    }
    Some(imageops::crop_imm(img, x1, y1, x2 - x1, y2 - y1).to_image())
}

/// Grayscale, upscale 2x, Otsu-binarize and invert.
pub fn preprocess_for_ocr(crop: &RgbImage) -> GrayImage {
    let gray = imageops::grayscale(crop);
    let upscaled = imageops::resize(
        &gray,
        gray.width() * 2,
        gray.height() * 2,
        FilterType::CatmullRom,
    );
    let thr = otsu_threshold(upscaled.as_raw());
    GrayImage::from_fn(upscaled.width(), upscaled.height(), |x, y| {
        let v = upscaled.get_pixel(x, y).0[0];
        // binary (v > thr -> white), then inverted
        Luma([if v > thr { 0 } else { 255 }])
    })
}

/// Otsu threshold over 8-bit samples.
pub fn otsu_threshold(samples: &[u8]) -> u8 {
    if samples.is_empty() {
        return 127;
    }

    let mut hist = [0u32; 256];
    for &v in samples {
        hist[v as usize] += 1;
    }

    let total = samples.len() as f64;
    let sum_total: f64 = hist
        .iter()
        .enumerate()
        .map(|(i, &h)| i as f64 * h as f64)
        .sum();

    let mut sum_b = 0f64;
    let mut w_b = 0f64;
    let mut best_var = -1f64;
    let mut best_t = 0u8;

    for (t, &h) in hist.iter().enumerate() {
        w_b += h as f64;
        if w_b < 1.0 {
            continue;
        }
        let w_f = total - w_b;
        if w_f < 1.0 {
            break;
        }

        sum_b += t as f64 * h as f64;
        let m_b = sum_b / w_b;
        let m_f = (sum_total - sum_b) / w_f;

        let var_between = w_b * w_f * (m_b - m_f) * (m_b - m_f);
        if var_between > best_var {
            best_var = var_between;
            best_t = t as u8;
        }
    }

    best_t
}
