use arshow_core::{
    assign_ids, load_assets, AssetPath, LoadError, LoadWarning, Registry,
};
use image::{Rgb, RgbImage};
use std::fs;
use std::path::Path;

fn registry(paths: &[&str]) -> Registry {
    let paths = paths.iter().map(|p| AssetPath::parse(p).expect("path"));
    Registry::from_entries(assign_ids(paths)).expect("registry")
}

fn write_png(root: &Path, rel: &str, w: u32, h: u32) {
    let path = root.join(rel);
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).expect("mkdir");
    }
    RgbImage::from_pixel(w, h, Rgb([10, 200, 30]))
        .save(path)
        .expect("save png");
}

#[test]
fn missing_file_is_skipped_with_one_warning() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_png(dir.path(), "a.png", 8, 4);
    write_png(dir.path(), "sub/c.png", 3, 5);
    let reg = registry(&["a.png", "b.png", "sub/c.png"]);

    let loaded = load_assets(&reg, dir.path()).expect("load");
    assert_eq!(loaded.table.len(), 2);
    assert!(loaded.table.contains(0));
    assert!(!loaded.table.contains(1));
    assert_eq!(loaded.table.get(2).map(|i| i.dimensions()), Some((3, 5)));

    assert_eq!(loaded.warnings.len(), 1);
    assert_eq!(loaded.warnings[0].id(), 1);
    assert!(matches!(loaded.warnings[0], LoadWarning::Missing { .. }));
}

#[test]
fn undecodable_file_is_skipped() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_png(dir.path(), "good.png", 2, 2);
    fs::write(dir.path().join("bad.png"), b"\x89PNG garbage").expect("write");
    let reg = registry(&["bad.png", "good.png"]);

    let loaded = load_assets(&reg, dir.path()).expect("load");
    assert_eq!(loaded.table.ids().collect::<Vec<_>>(), vec![1]);
    assert_eq!(loaded.warnings.len(), 1);
    assert!(matches!(loaded.warnings[0], LoadWarning::Decode { id: 0, .. }));
}

#[test]
fn nothing_loaded_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let reg = registry(&["a.png", "b.png"]);
    assert!(matches!(
        load_assets(&reg, dir.path()),
        Err(LoadError::NoAssets { attempted: 2 })
    ));
    assert!(matches!(
        load_assets(&reg, &dir.path().join("missing")),
        Err(LoadError::MissingAssetRoot(_))
    ));
}
