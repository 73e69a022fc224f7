use arshow::core::{GenerateConfig, Registry, ResolveConfig, StartupError};
use arshow::pipeline::{prepare_resolution, run_generation, PipelineError};
use image::{Rgb, RgbImage};
use std::fs;
use std::path::Path;

fn write_card(root: &Path, rel: &str, w: u32, h: u32) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    RgbImage::from_pixel(w, h, Rgb([200, 40, 40]))
        .save(&path)
        .expect("save");
}

fn generate_config(root: &Path) -> GenerateConfig {
    GenerateConfig {
        input_dir: root.join("ID_cards"),
        output_dir: root.join("generated_markers"),
        map_file: root.join("aruco_image_map.json"),
        dictionary: "DICT_4X4_50".to_string(),
        ..GenerateConfig::default()
    }
}

#[test]
fn generation_writes_markers_and_map() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_card(dir.path(), "ID_cards/robotics/bob.png", 40, 20);
    write_card(dir.path(), "ID_cards/alice.jpg", 20, 40);

    let cfg = generate_config(dir.path());
    let run = run_generation(&cfg).expect("generation");

    assert_eq!(run.registry.len(), 2);
    assert_eq!(run.report.written.len(), 2);
    assert!(run.report.skipped.is_empty());

    let root_marker = cfg.output_dir.join("marker_0.png");
    let nested_marker = cfg.output_dir.join("robotics").join("marker_1.png");
    assert!(root_marker.is_file());
    assert!(nested_marker.is_file());

    let side = cfg.style.padded_side();
    let img = image::open(&nested_marker).expect("open marker").to_luma8();
    assert_eq!(img.dimensions(), (side, side));
    // white quiet zone
    assert_eq!(img.get_pixel(0, 0).0, [255]);

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&cfg.map_file).expect("read map")).expect("json");
    assert_eq!(json["0"], "alice.jpg");
    assert_eq!(json["1"], "robotics/bob.png");
}

#[test]
fn unknown_dictionary_fails_before_writing() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_card(dir.path(), "ID_cards/a.png", 8, 8);
    let cfg = GenerateConfig {
        dictionary: "DICT_NOPE".to_string(),
        ..generate_config(dir.path())
    };

    let err = run_generation(&cfg).expect_err("unknown family");
    assert!(matches!(err, PipelineError::Encoder(_)));
    assert!(!cfg.map_file.exists());
    assert!(!cfg.output_dir.exists());
}

#[test]
fn missing_input_folder_is_reported() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cfg = generate_config(dir.path());
    let err = run_generation(&cfg).expect_err("no input");
    assert!(matches!(err, PipelineError::Registry(_)));
    assert!(!cfg.map_file.exists());
}

#[test]
fn resolution_startup_needs_the_map_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::create_dir_all(dir.path().join("ID_cards")).expect("mkdir");
    let cfg = ResolveConfig {
        image_dir: dir.path().join("ID_cards"),
        map_file: dir.path().join("aruco_image_map.json"),
        ..ResolveConfig::default()
    };

    let err = prepare_resolution(&cfg).expect_err("no map");
    assert!(matches!(
        err,
        PipelineError::Startup(StartupError::MissingMapFile(_))
    ));
}

#[test]
fn generated_map_feeds_the_resolver() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_card(dir.path(), "ID_cards/a.png", 30, 10);
    write_card(dir.path(), "ID_cards/b.png", 10, 30);
    write_card(dir.path(), "ID_cards/c.png", 10, 10);
    let gen = generate_config(dir.path());
    run_generation(&gen).expect("generation");

    // one image disappears after printing
    fs::remove_file(dir.path().join("ID_cards/b.png")).expect("rm");

    let cfg = ResolveConfig {
        image_dir: gen.input_dir.clone(),
        map_file: gen.map_file.clone(),
        ..ResolveConfig::default()
    };
    let loaded = prepare_resolution(&cfg).expect("startup");
    assert_eq!(loaded.table.ids().collect::<Vec<_>>(), vec![0, 2]);
    assert_eq!(loaded.warnings.len(), 1);
    assert_eq!(loaded.warnings[0].id(), 1);

    let reloaded = Registry::load(&cfg.map_file).expect("load");
    assert_eq!(reloaded.len(), 3);
}
