//! OpenCV backend: camera capture, ArUco detection and HighGUI windows.

use arshow_core::{
    Detection, DisplayError, DisplayFrame, DisplaySurface, FrameSource, MarkerDetector,
};
use nalgebra::Point2;
use opencv::core::{Mat, Point, Point2f, Scalar, Vector, CV_8UC3};
use opencv::objdetect::{self, PredefinedDictionaryType};
use opencv::prelude::*;
use opencv::{highgui, imgproc, videoio};

pub const CAMERA_WINDOW: &str = "Camera Feed";
pub const DISPLAY_WINDOW: &str = "AR Display";

#[derive(thiserror::Error, Debug)]
pub enum LiveError {
    #[error("cannot open camera {0}")]
    CameraUnavailable(i32),
    #[error("marker dictionary '{0}' is not supported by the OpenCV ArUco detector")]
    UnknownDictionary(String),
    #[error(transparent)]
    OpenCv(#[from] opencv::Error),
}

/// OpenCV name -> predefined dictionary.
pub fn predefined_dictionary(name: &str) -> Option<PredefinedDictionaryType> {
    use PredefinedDictionaryType as P;
    let d = match name {
        "DICT_4X4_50" => P::DICT_4X4_50,
        "DICT_4X4_100" => P::DICT_4X4_100,
        "DICT_4X4_250" => P::DICT_4X4_250,
        "DICT_4X4_1000" => P::DICT_4X4_1000,
        "DICT_5X5_50" => P::DICT_5X5_50,
        "DICT_5X5_100" => P::DICT_5X5_100,
        "DICT_5X5_250" => P::DICT_5X5_250,
        "DICT_5X5_1000" => P::DICT_5X5_1000,
        "DICT_6X6_50" => P::DICT_6X6_50,
        "DICT_6X6_100" => P::DICT_6X6_100,
        "DICT_6X6_250" => P::DICT_6X6_250,
        "DICT_6X6_1000" => P::DICT_6X6_1000,
        "DICT_7X7_50" => P::DICT_7X7_50,
        "DICT_7X7_100" => P::DICT_7X7_100,
        "DICT_7X7_250" => P::DICT_7X7_250,
        "DICT_7X7_1000" => P::DICT_7X7_1000,
        "DICT_ARUCO_ORIGINAL" => P::DICT_ARUCO_ORIGINAL,
        "DICT_APRILTAG_16h5" => P::DICT_APRILTAG_16h5,
        "DICT_APRILTAG_25h9" => P::DICT_APRILTAG_25h9,
        "DICT_APRILTAG_36h10" => P::DICT_APRILTAG_36h10,
        "DICT_APRILTAG_36h11" => P::DICT_APRILTAG_36h11,
        _ => return None,
    };
    Some(d)
}

/// `VideoCapture` device.
pub struct Camera {
    cap: videoio::VideoCapture,
}

impl Camera {
    pub fn open(index: i32) -> Result<Self, LiveError> {
        let cap = videoio::VideoCapture::new(index, videoio::CAP_ANY)?;
        if !cap.is_opened()? {
            return Err(LiveError::CameraUnavailable(index));
        }
        Ok(Self { cap })
    }
}

impl FrameSource for Camera {
    type Frame = Mat;

    fn acquire(&mut self) -> Option<Mat> {
        let mut frame = Mat::default();
        match self.cap.read(&mut frame) {
            Ok(true) if frame.rows() > 0 => Some(frame),
            Ok(_) => None,
            Err(err) => {
                log::error!("camera read failed: {err}");
                None
            }
        }
    }
}

/// OpenCV `ArucoDetector` with default parameters.
pub struct ArucoDetector {
    inner: objdetect::ArucoDetector,
}

impl ArucoDetector {
    pub fn new(dictionary: &str) -> Result<Self, LiveError> {
        let kind = predefined_dictionary(dictionary)
            .ok_or_else(|| LiveError::UnknownDictionary(dictionary.to_string()))?;
        let dict = objdetect::get_predefined_dictionary(kind)?;
        let params = objdetect::DetectorParameters::default()?;
        let refine = objdetect::RefineParameters::new(10.0, 3.0, true)?;
        let inner = objdetect::ArucoDetector::new(&dict, &params, refine)?;
        Ok(Self { inner })
    }
}

impl MarkerDetector<Mat> for ArucoDetector {
    fn detect(&mut self, frame: &Mat) -> Vec<Detection> {
        let mut corners = Vector::<Vector<Point2f>>::new();
        let mut ids = Vector::<i32>::new();
        let mut rejected = Vector::<Vector<Point2f>>::new();
        if let Err(err) = self
            .inner
            .detect_markers(frame, &mut corners, &mut ids, &mut rejected)
        {
            log::error!("marker detection failed: {err}");
            return Vec::new();
        }

        // keep detector order
        ids.iter()
            .zip(corners.iter())
            .filter_map(|(id, quad)| {
                let id = u32::try_from(id).ok()?;
                let mut pts = [Point2::origin(); 4];
                for (dst, src) in pts.iter_mut().zip(quad.iter()) {
                    *dst = Point2::new(src.x, src.y);
                }
                Some(Detection { id, corners: pts })
            })
            .collect()
    }
}

/// The two HighGUI windows plus quit-key polling.
pub struct Windows {
    annotate: bool,
    quit_key: char,
}

impl Windows {
    pub fn new(annotate: bool, quit_key: char) -> Result<Self, LiveError> {
        highgui::named_window(CAMERA_WINDOW, highgui::WINDOW_AUTOSIZE)?;
        highgui::named_window(DISPLAY_WINDOW, highgui::WINDOW_AUTOSIZE)?;
        Ok(Self { annotate, quit_key })
    }

    fn draw_outlines(frame: &mut Mat, detections: &[Detection]) -> opencv::Result<()> {
        let mut corners = Vector::<Vector<Point2f>>::new();
        let mut ids = Vector::<i32>::new();
        for d in detections {
            let quad: Vector<Point2f> = d.corners.iter().map(|p| Point2f::new(p.x, p.y)).collect();
            corners.push(quad);
            ids.push(d.id as i32);
        }
        objdetect::draw_detected_markers(frame, &corners, &ids, Scalar::new(0.0, 255.0, 0.0, 0.0))
    }

    fn to_bgr_mat(display: &DisplayFrame) -> opencv::Result<Mat> {
        let img = &display.image;
        let mut mat = Mat::new_rows_cols_with_default(
            img.height() as i32,
            img.width() as i32,
            CV_8UC3,
            Scalar::all(0.0),
        )?;
        let bytes = mat.data_bytes_mut()?;
        for (dst, src) in bytes.chunks_exact_mut(3).zip(img.pixels()) {
            let [r, g, b] = src.0;
            dst.copy_from_slice(&[b, g, r]);
        }

        if let Some(caption) = &display.caption {
            let [r, g, b] = caption.color;
            imgproc::put_text(
                &mut mat,
                &caption.text,
                Point::new(caption.origin.0, caption.origin.1),
                imgproc::FONT_HERSHEY_SIMPLEX,
                caption.font_scale,
                Scalar::new(b as f64, g as f64, r as f64, 0.0),
                caption.thickness,
                imgproc::LINE_8,
                false,
            )?;
        }
        Ok(mat)
    }
}

fn backend(err: opencv::Error) -> DisplayError {
    DisplayError::Backend(err.to_string())
}

impl DisplaySurface<Mat> for Windows {
    fn present(
        &mut self,
        camera: &mut Mat,
        detections: &[Detection],
        display: &DisplayFrame,
    ) -> Result<(), DisplayError> {
        if self.annotate && !detections.is_empty() {
            Self::draw_outlines(camera, detections).map_err(backend)?;
        }
        let mat = Self::to_bgr_mat(display).map_err(backend)?;
        highgui::imshow(CAMERA_WINDOW, &*camera).map_err(backend)?;
        highgui::imshow(DISPLAY_WINDOW, &mat).map_err(backend)?;
        Ok(())
    }

    fn quit_requested(&mut self) -> Result<bool, DisplayError> {
        let key = highgui::wait_key(1).map_err(backend)?;
        Ok(key >= 0 && (key & 0xFF) == self.quit_key as i32)
    }
}

impl Drop for Windows {
    fn drop(&mut self) {
        let _ = highgui::destroy_all_windows();
    }
}
