//! End-to-end tests for the shipgen binary

use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

fn shipgen(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_shipgen"))
        .args(args)
        .output()
        .expect("Failed to run shipgen")
}

fn face_lines(path: &Path) -> usize {
    std::fs::read_to_string(path)
        .expect("Failed to read OBJ")
        .lines()
        .filter(|l| l.starts_with("f "))
        .count()
}

#[test]
fn test_generate_writes_obj_and_mtl() {
    let dir = tempdir().expect("Failed to create temp dir");
    let obj = dir.path().join("ship.obj");

    let output = shipgen(&["generate", "--seed", "abc", "-o", obj.to_str().unwrap()]);
    assert!(output.status.success(), "shipgen generate failed");

    assert!(obj.exists(), "OBJ file should exist");
    assert!(dir.path().join("ship.mtl").exists(), "MTL file should exist");
    assert!(face_lines(&obj) > 6);
}

#[test]
fn test_generate_is_reproducible() {
    let dir = tempdir().expect("Failed to create temp dir");
    let a = dir.path().join("a.obj");
    let b = dir.path().join("b.obj");

    assert!(shipgen(&["generate", "-s", "repeat", "-o", a.to_str().unwrap()]).status.success());
    assert!(shipgen(&["generate", "-s", "repeat", "-o", b.to_str().unwrap()]).status.success());

    let a_text = std::fs::read_to_string(&a).unwrap();
    let b_text = std::fs::read_to_string(&b).unwrap();
    assert_eq!(a_text, b_text);
}

#[test]
fn test_generate_without_materials() {
    let dir = tempdir().expect("Failed to create temp dir");
    let obj = dir.path().join("plain.obj");

    let output = shipgen(&[
        "generate",
        "--seed",
        "plain",
        "--no-materials",
        "--no-detail",
        "-o",
        obj.to_str().unwrap(),
    ]);
    assert!(output.status.success());
    assert!(!dir.path().join("plain.mtl").exists());
}

#[test]
fn test_generate_render_mesh_is_triangles() {
    let dir = tempdir().expect("Failed to create temp dir");
    let obj = dir.path().join("render.obj");

    let output = shipgen(&["generate", "--seed", "abc", "--render", "-o", obj.to_str().unwrap()]);
    assert!(output.status.success());

    let text = std::fs::read_to_string(&obj).unwrap();
    for line in text.lines().filter(|l| l.starts_with("f ")) {
        assert_eq!(line.split_whitespace().count(), 4, "not a triangle: {line}");
    }
}

#[test]
fn test_inverted_range_rejected() {
    let dir = tempdir().expect("Failed to create temp dir");
    let obj = dir.path().join("bad.obj");

    let output = shipgen(&[
        "generate",
        "--hull-min",
        "5",
        "--hull-max",
        "2",
        "-o",
        obj.to_str().unwrap(),
    ]);
    assert!(!output.status.success());
    assert!(!obj.exists());
}

#[test]
fn test_config_file_is_applied() {
    let dir = tempdir().expect("Failed to create temp dir");
    let config = dir.path().join("ship.toml");
    std::fs::write(
        &config,
        "[generation]\ndetail = false\nasymmetry = false\nassign_materials = false\n",
    )
    .unwrap();
    let obj = dir.path().join("configured.obj");

    let output = shipgen(&[
        "generate",
        "--seed",
        "cfg",
        "--config",
        config.to_str().unwrap(),
        "-o",
        obj.to_str().unwrap(),
    ]);
    assert!(output.status.success());

    let text = std::fs::read_to_string(&obj).unwrap();
    assert!(!text.contains("mtllib"));
    // Only hull material without detail
    assert!(text.lines().filter(|l| l.starts_with("usemtl ")).all(|l| l == "usemtl hull"));
}

#[test]
fn test_check_command() {
    let dir = tempdir().expect("Failed to create temp dir");
    let good = dir.path().join("good.toml");
    let bad = dir.path().join("bad.toml");
    std::fs::write(&good, "[movie]\nfps = 30\n").unwrap();
    std::fs::write(&bad, "[generation]\nhull_segments = { min = 4, max = 1 }\n").unwrap();

    assert!(shipgen(&["check", good.to_str().unwrap()]).status.success());
    assert!(!shipgen(&["check", bad.to_str().unwrap()]).status.success());
}

#[test]
fn test_movie_writes_track() {
    let dir = tempdir().expect("Failed to create temp dir");

    let output = shipgen(&[
        "movie",
        "--seed",
        "fly",
        "--fps",
        "2",
        "--duration",
        "1",
        "--ship-duration",
        "1",
        "--no-detail",
        "-o",
        dir.path().to_str().unwrap(),
    ]);
    assert!(output.status.success(), "shipgen movie failed");

    let renders = dir.path().join("renders");
    let stamp_dir = std::fs::read_dir(&renders)
        .expect("renders directory should exist")
        .next()
        .expect("one timestamp directory")
        .unwrap()
        .path();
    let files: Vec<String> = std::fs::read_dir(&stamp_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();

    assert!(files.iter().any(|f| f.ends_with("_camera.json")));
    assert!(files.iter().any(|f| f.ends_with("_ship_000.obj")));
}
