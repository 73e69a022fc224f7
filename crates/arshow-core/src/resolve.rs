//! Real-time marker resolution: detect, pick one id, render.
//!
//! Every frame is resolved from scratch. Nothing about the previous frame is
//! carried over, so a missed detection shows the waiting prompt for exactly
//! one frame.

use crate::assets::AssetTable;
use crate::canvas::{CanvasSpec, DisplayFrame};
use crate::registry::MarkerId;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// One marker reported by a detector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub id: MarkerId,
    /// Marker corners in frame pixels (TL, TR, BR, BL). Only used for
    /// annotation.
    pub corners: [Point2<f32>; 4],
}

impl Detection {
    /// Detection without geometry.
    pub fn id_only(id: MarkerId) -> Self {
        Self {
            id,
            corners: [Point2::origin(); 4],
        }
    }
}

/// Outcome of one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Resolution {
    /// No marker, or a marker without a loaded asset.
    Waiting,
    /// Display the asset of this marker.
    Showing(MarkerId),
}

/// Resolve detector output against the asset table.
///
/// Only the first detection counts, in the order the detector returned them.
/// The list is never sorted or deduplicated. A first detection without an
/// asset yields [`Resolution::Waiting`] even if a later one has an asset.
pub fn resolve(detections: &[Detection], table: &AssetTable) -> Resolution {
    match detections.first() {
        Some(d) if table.contains(d.id) => Resolution::Showing(d.id),
        _ => Resolution::Waiting,
    }
}

/// Camera-like source of frames.
pub trait FrameSource {
    type Frame;

    /// Next frame, or `None` when the stream ended or the device failed.
    fn acquire(&mut self) -> Option<Self::Frame>;
}

/// Marker detector for frames of type `F`.
pub trait MarkerDetector<F> {
    fn detect(&mut self, frame: &F) -> Vec<Detection>;
}

#[derive(thiserror::Error, Debug)]
pub enum DisplayError {
    #[error("display backend error: {0}")]
    Backend(String),
}

/// Window plumbing: presents frames and reports the quit key.
pub trait DisplaySurface<F> {
    /// Show the camera frame (annotated with `detections` if the surface
    /// supports it) and the rendered display frame.
    fn present(
        &mut self,
        camera: &mut F,
        detections: &[Detection],
        display: &DisplayFrame,
    ) -> Result<(), DisplayError>;

    /// Poll the quit key. Called once per loop iteration.
    fn quit_requested(&mut self) -> Result<bool, DisplayError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    EndOfStream,
    QuitRequested,
}

/// Counters for one loop run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoopStats {
    pub frames: u64,
    pub showing: u64,
    pub waiting: u64,
    /// Waiting frames in which the first detection had no asset.
    pub unrecognized: u64,
    pub stop: StopReason,
}

/// Per-frame resolver and renderer over a loaded asset table.
#[derive(Clone, Debug)]
pub struct ResolutionLoop<'a> {
    table: &'a AssetTable,
    canvas: CanvasSpec,
    prompt: String,
}

impl<'a> ResolutionLoop<'a> {
    pub const DEFAULT_PROMPT: &'static str = "Scan an ArUco Code";

    pub fn new(table: &'a AssetTable, canvas: CanvasSpec) -> Self {
        Self {
            table,
            canvas,
            prompt: Self::DEFAULT_PROMPT.to_string(),
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Render a resolution onto a fresh canvas.
    pub fn render(&self, resolution: Resolution) -> DisplayFrame {
        match resolution {
            Resolution::Showing(id) => match self.table.get(id) {
                Some(asset) => DisplayFrame {
                    image: self.canvas.letterbox(asset),
                    caption: None,
                },
                None => self.canvas.waiting(&self.prompt),
            },
            Resolution::Waiting => self.canvas.waiting(&self.prompt),
        }
    }

    /// Resolve and render one frame's detections.
    pub fn step(&self, detections: &[Detection]) -> (Resolution, DisplayFrame) {
        let resolution = resolve(detections, self.table);
        (resolution, self.render(resolution))
    }

    /// Run until the source runs dry or the surface reports the quit key.
    pub fn run<S, D, W>(
        &self,
        source: &mut S,
        detector: &mut D,
        surface: &mut W,
    ) -> Result<LoopStats, DisplayError>
    where
        S: FrameSource,
        D: MarkerDetector<S::Frame>,
        W: DisplaySurface<S::Frame>,
    {
        let mut stats = LoopStats {
            frames: 0,
            showing: 0,
            waiting: 0,
            unrecognized: 0,
            stop: StopReason::EndOfStream,
        };

        loop {
            let Some(mut frame) = source.acquire() else {
                log::info!("frame source ended after {} frames", stats.frames);
                stats.stop = StopReason::EndOfStream;
                break;
            };
            stats.frames += 1;

            let detections = detector.detect(&frame);
            let (resolution, display) = self.step(&detections);
            match resolution {
                Resolution::Showing(_) => stats.showing += 1,
                Resolution::Waiting => {
                    stats.waiting += 1;
                    if !detections.is_empty() {
                        stats.unrecognized += 1;
                    }
                }
            }

            surface.present(&mut frame, &detections, &display)?;
            if surface.quit_requested()? {
                stats.stop = StopReason::QuitRequested;
                break;
            }
        }

        Ok(stats)
    }
}
