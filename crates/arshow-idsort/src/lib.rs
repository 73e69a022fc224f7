//! Batch sorter for scanned ID cards.
//!
//! Each card image is cropped to a fixed region holding the organization
//! name, binarized, read with an OCR engine and fuzzy-matched against a known
//! vocabulary. Confident matches are moved into a folder named after the
//! vocabulary entry; everything else stays where it is and is reported.
//!
//! The OCR engine is pluggable through [`TextReader`]. [`TesseractCli`] shells
//! out to the `tesseract` executable.

mod config;
mod matching;
mod ocr;
mod preprocess;
mod sort;

pub use config::{OcrConfig, Roi, SortConfig, SortConfigError};
pub use matching::{best_match, normalize_for_match, sanitize_folder_name, similarity, VocabMatch};
pub use ocr::{OcrError, TesseractCli, TextReader};
pub use preprocess::{crop_roi, otsu_threshold, preprocess_for_ocr};
pub use sort::{sort_directory, MovedCard, SkipReason, SkippedCard, SortError, SortReport};
