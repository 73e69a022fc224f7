use arshow_idsort::{
    sort_directory, OcrError, SkipReason, SortConfig, SortError, TextReader,
};
use image::{GrayImage, Rgb, RgbImage};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;
use std::path::Path;

/// Returns canned OCR results in call order.
struct Canned {
    replies: RefCell<VecDeque<Result<String, OcrError>>>,
    seen: RefCell<Vec<(u32, u32)>>,
}

impl Canned {
    fn new(replies: Vec<Result<String, OcrError>>) -> Self {
        Self {
            replies: RefCell::new(replies.into()),
            seen: RefCell::new(Vec::new()),
        }
    }
}

impl TextReader for Canned {
    fn read_text(&self, image: &GrayImage) -> Result<String, OcrError> {
        self.seen.borrow_mut().push(image.dimensions());
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(String::new()))
    }
}

fn card(dir: &Path, name: &str, w: u32, h: u32) {
    RgbImage::from_pixel(w, h, Rgb([230, 230, 230]))
        .save(dir.join(name))
        .expect("save card");
}

fn config(dir: &Path) -> SortConfig {
    SortConfig {
        source_dir: dir.to_path_buf(),
        ..SortConfig::default()
    }
}

#[test]
fn cards_are_moved_or_skipped() {
    let dir = tempfile::tempdir().expect("tempdir");
    let src = dir.path();
    card(src, "a.png", 600, 1000);
    card(src, "b.jpg", 600, 1000);
    card(src, "c.png", 600, 1000);
    card(src, "d.png", 100, 100);
    fs::write(src.join("e.png"), b"broken").expect("write");
    fs::write(src.join("notes.txt"), b"ignored").expect("write");

    let reader = Canned::new(vec![
        Ok(" aero c1ub \n".to_string()),
        Ok("\n".to_string()),
        Ok("ZZZZZZZZZZZZZZZZ".to_string()),
    ]);
    let report = sort_directory(&config(src), &reader).expect("sort");

    assert_eq!(report.moved.len(), 1);
    let moved = &report.moved[0];
    assert_eq!(moved.file, "a.png");
    assert_eq!(moved.text, "AERO C1UB");
    assert_eq!(moved.label, "AERO CLUB");
    assert_eq!(moved.folder, "AERO_CLUB");
    assert!(src.join("AERO_CLUB").join("a.png").is_file());
    assert!(!src.join("a.png").exists());
    assert_eq!(report.created_folders, vec!["AERO_CLUB".to_string()]);

    let skipped: Vec<(&str, &SkipReason)> = report
        .skipped
        .iter()
        .map(|s| (s.file.as_str(), &s.reason))
        .collect();
    assert_eq!(skipped.len(), 4);
    assert!(matches!(skipped[0], ("b.jpg", SkipReason::NoText)));
    assert!(matches!(skipped[1], ("c.png", SkipReason::NoMatch { .. })));
    assert!(matches!(skipped[2], ("d.png", SkipReason::RoiOutside)));
    assert!(matches!(skipped[3], ("e.png", SkipReason::Unreadable(_))));
    assert!(src.join("notes.txt").is_file());

    // ROI 440x160, upscaled 2x before OCR.
    assert_eq!(reader.seen.borrow()[0], (880, 320));
}

#[test]
fn no_match_reports_best_candidate() {
    let dir = tempfile::tempdir().expect("tempdir");
    card(dir.path(), "a.png", 600, 1000);
    let cfg = SortConfig {
        threshold: 95,
        ..config(dir.path())
    };
    let reader = Canned::new(vec![Ok("AER0 CLUB".to_string())]);
    let report = sort_directory(&cfg, &reader).expect("sort");

    assert!(report.moved.is_empty());
    let msg = report.skipped[0].reason.to_string();
    assert!(msg.contains("AERO CLUB"), "{msg}");
    assert!(dir.path().join("a.png").is_file());
}

#[test]
fn missing_engine_aborts() {
    let dir = tempfile::tempdir().expect("tempdir");
    card(dir.path(), "a.png", 600, 1000);
    let reader = Canned::new(vec![Err(OcrError::EngineMissing("tesseract".into()))]);
    assert!(matches!(
        sort_directory(&config(dir.path()), &reader),
        Err(SortError::Ocr(OcrError::EngineMissing(_)))
    ));
}

#[test]
fn missing_or_empty_source_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let reader = Canned::new(Vec::new());
    assert!(matches!(
        sort_directory(&config(&dir.path().join("nope")), &reader),
        Err(SortError::MissingSource(_))
    ));
    assert!(matches!(
        sort_directory(&config(dir.path()), &reader),
        Err(SortError::NoImages(_))
    ));
}

#[test]
fn existing_destination_is_never_overwritten() {
    let dir = tempfile::tempdir().expect("tempdir");
    let src = dir.path();
    card(src, "a.png", 600, 1000);
    fs::create_dir_all(src.join("AERO_CLUB")).expect("mkdir");
    fs::write(src.join("AERO_CLUB").join("a.png"), b"earlier card").expect("write");
    let before = fs::read(src.join("a.png")).expect("read source");

    let reader = Canned::new(vec![Ok("AERO CLUB".to_string())]);
    let report = sort_directory(&config(src), &reader).expect("sort");

    assert!(report.moved.is_empty());
    assert!(report.created_folders.is_empty());
    assert!(matches!(
        &report.skipped[0].reason,
        SkipReason::DestinationExists(path) if path.ends_with("AERO_CLUB/a.png")
    ));
    assert_eq!(fs::read(src.join("a.png")).expect("source kept"), before);
    assert_eq!(
        fs::read(src.join("AERO_CLUB").join("a.png")).expect("destination"),
        b"earlier card"
    );
}

#[test]
fn short_label_inside_longer_text_is_matched() {
    let dir = tempfile::tempdir().expect("tempdir");
    card(dir.path(), "team.png", 600, 1000);

    let reader = Canned::new(vec![Ok("IGEM TEAM 2024".to_string())]);
    let report = sort_directory(&config(dir.path()), &reader).expect("sort");

    assert_eq!(report.moved.len(), 1);
    assert_eq!(report.moved[0].label, "IGEM");
    assert_eq!(report.moved[0].score, 44);
    assert!(dir.path().join("IGEM").join("team.png").is_file());
}
