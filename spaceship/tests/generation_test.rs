//! End-to-end generation tests
//!
//! Generate whole ships and check the properties every ship must have.

use spaceship::mesh::DEGENERATE_AREA;
use spaceship::{GenerationConfig, MaterialSlot, Modifier, generate, write_obj};
use tempfile::tempdir;

#[test]
fn test_seed_abc_end_to_end() {
    let ship = generate(&GenerationConfig::default(), Some("abc")).expect("generation failed");
    let mesh = &ship.mesh;

    assert!(mesh.face_count() > 0);
    for face in &mesh.faces {
        assert!(MaterialSlot::ALL.contains(&face.material));
        assert!(face.indices.len() >= 3);
        assert!(mesh.face_area(face) >= DEGENERATE_AREA);
        for &i in &face.indices {
            assert!((i as usize) < mesh.vertex_count());
        }
    }
    for [a, b] in &mesh.edges {
        assert!((*a as usize) < mesh.vertex_count());
        assert!((*b as usize) < mesh.vertex_count());
    }
}

#[test]
fn test_reproducible_across_runs() {
    let config = GenerationConfig::default();
    for seed in ["abc", "spaceship", "12345"] {
        let a = generate(&config, Some(seed)).unwrap();
        let b = generate(&config, Some(seed)).unwrap();

        assert_eq!(a.mesh.face_count(), b.mesh.face_count());
        assert_eq!(a.mesh.positions, b.mesh.positions);
        let materials = |s: &spaceship::Spaceship| s.mesh.faces.iter().map(|f| f.material).collect::<Vec<_>>();
        assert_eq!(materials(&a), materials(&b));
        assert_eq!(a.palette, b.palette);
    }
}

#[test]
fn test_detail_adds_geometry() {
    let plain = GenerationConfig {
        detail: false,
        ..Default::default()
    };
    let a = generate(&plain, Some("detail")).unwrap();
    let b = generate(&GenerationConfig::default(), Some("detail")).unwrap();
    assert!(b.mesh.face_count() > a.mesh.face_count());
}

#[test]
fn test_positions_are_finite() {
    for seed in ["a", "b", "c", "d"] {
        let ship = generate(&GenerationConfig::default(), Some(seed)).unwrap();
        assert!(ship.mesh.positions.iter().all(|p| p.is_finite()));
        assert!(ship.lowest_z() < 0.0);
    }
}

#[test]
fn test_render_mesh_applies_mirror() {
    let config = GenerationConfig {
        mirror_horizontal: true,
        bevel: false,
        ..Default::default()
    };
    let ship = generate(&config, Some("mirror")).unwrap();
    assert!(matches!(ship.modifiers[0], Modifier::Mirror { horizontal: true, .. }));

    let render = ship.to_render_mesh();
    let unmirrored: usize = ship.mesh.faces.iter().map(|f| f.indices.len() - 2).sum();
    assert_eq!(render.triangle_count(), unmirrored * 2);
    assert_eq!(render.materials.len(), render.triangle_count());
    assert!(render.normals.iter().all(|n| n.is_finite()));
}

#[test]
fn test_export_round_trip_counts() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("abc.obj");
    let ship = generate(&GenerationConfig::default(), Some("abc")).unwrap();

    write_obj(&ship, &path).expect("export failed");

    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(
        text.lines().filter(|l| l.starts_with("v ")).count(),
        ship.mesh.vertex_count()
    );
    assert_eq!(
        text.lines().filter(|l| l.starts_with("f ")).count(),
        ship.mesh.face_count()
    );
    assert_eq!(
        text.lines().filter(|l| l.starts_with("l ")).count(),
        ship.mesh.edges.len()
    );
}

#[test]
fn test_ship_serializes_to_json() {
    let ship = generate(&GenerationConfig::default(), Some("json")).unwrap();
    let json = serde_json::to_string(&ship).unwrap();
    let back: spaceship::Spaceship = serde_json::from_str(&json).unwrap();
    assert_eq!(back.mesh.face_count(), ship.mesh.face_count());
    assert_eq!(back.modifiers, ship.modifiers);
}
