use arshow_core::{EncodeError, MarkerEncoder, MarkerId};
use calib_targets_aruco::{builtins, Dictionary};
use image::{GrayImage, Luma};

/// The requested dictionary is not compiled into this build.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("marker dictionary '{0}' is not available")]
pub struct EncoderUnavailable(pub String);

/// [`MarkerEncoder`] over one fixed dictionary.
#[derive(Clone, Copy, Debug)]
pub struct DictionaryEncoder {
    dict: Dictionary,
}

impl DictionaryEncoder {
    /// OpenCV uses a single black border cell.
    pub const BORDER_BITS: usize = 1;

    pub fn new(dict: Dictionary) -> Self {
        Self { dict }
    }

    /// Look up a built-in dictionary by name, e.g. `DICT_6X6_250`.
    pub fn from_name(name: &str) -> Result<Self, EncoderUnavailable> {
        builtins::builtin_dictionary(name)
            .map(Self::new)
            .ok_or_else(|| EncoderUnavailable(name.to_string()))
    }

    #[inline]
    pub fn dictionary(&self) -> Dictionary {
        self.dict
    }

    /// Cells per side including the border.
    #[inline]
    pub fn cells(&self) -> usize {
        self.dict.marker_size + 2 * Self::BORDER_BITS
    }
}

impl MarkerEncoder for DictionaryEncoder {
    fn family(&self) -> &str {
        self.dict.name
    }

    fn capacity(&self) -> usize {
        self.dict.codes.len()
    }

    fn encode(&self, id: MarkerId, size_px: u32) -> Result<GrayImage, EncodeError> {
        let Some(&code) = self.dict.codes.get(id as usize) else {
            return Err(EncodeError::IdOutOfRange {
                id,
                capacity: self.dict.codes.len(),
            });
        };
        let cells = self.cells();
        if (size_px as usize) < cells {
            return Err(EncodeError::SizeTooSmall {
                size_px,
                min_px: cells as u32,
            });
        }
        Ok(render_code(
            code,
            self.dict.marker_size,
            Self::BORDER_BITS,
            size_px,
        ))
    }
}

/// Render a packed code (row-major, black = 1) with a black border.
pub fn render_code(code: u64, bits: usize, border_bits: usize, size_px: u32) -> GrayImage {
    let cells = bits + 2 * border_bits;
    let side = size_px as usize;

    GrayImage::from_fn(size_px, size_px, |x, y| {
        let cx = x as usize * cells / side;
        let cy = y as usize * cells / side;
        let is_border =
            cx < border_bits || cy < border_bits || cx >= bits + border_bits || cy >= bits + border_bits;
        let is_black = is_border || {
            let idx = (cy - border_bits) * bits + (cx - border_bits);
            (code >> idx) & 1 == 1
        };
        Luma([if is_black { 0 } else { 255 }])
    })
}
