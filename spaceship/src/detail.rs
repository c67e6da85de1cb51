//! Surface detailers
//!
//! Each detailer decorates one face. A face that is retired, has fewer than
//! four vertices, or has collapsed below [`MIN_FACE_SIZE`] is skipped with no
//! geometry created and no random draws consumed.
//!
//! | Detailer | Effect |
//! |---|---|
//! | [`add_exhaust`] | grid-cut the face, then dig a hull-dark nozzle with a burning cavity into each rear cell |
//! | [`add_grid`] | grid-cut the face and raise every cell a little, light-tagging sides |
//! | [`add_cylinders`] | an array of capped cylinders standing on the face |
//! | [`add_weapons`] | an array of turrets, each a flat base plus a yawed barrel |
//! | [`add_sphere`] | one sphere resting on the face |
//! | [`add_antenna`] | one cone standing on the face |
//! | [`add_disc`] | one open circle lying on the face |

use glam::{Mat4, Vec3};
use tracing::trace;

use crate::error::MeshError;
use crate::geometry::{aspect_ratio, face_corners, is_rear_face, local_frame, width_height};
use crate::material::MaterialSlot;
use crate::mesh::{FaceId, Mesh};
use crate::rng::RandomStream;
use crate::transform::{extrude_face, scale_face};

/// Faces narrower than this in either direction are not detailed
pub const MIN_FACE_SIZE: f32 = 1e-4;

/// Fractal jitter used when grid-cutting a face
const SUBDIVIDE_FRACTAL: f32 = 0.02;

/// Width and height of a face that can carry detail, `None` otherwise
fn detailable(mesh: &Mesh, face: FaceId, detailer: &str) -> Option<(f32, f32)> {
    let Ok(verts) = mesh.face_vertices(face) else {
        trace!("{detailer}: face {face:?} is no longer valid, skipping");
        return None;
    };
    if verts.len() < 4 {
        trace!("{detailer}: face {face:?} has {} vertices, skipping", verts.len());
        return None;
    }
    let (width, height) = width_height(mesh, face).ok()?;
    if width.min(height) < MIN_FACE_SIZE {
        trace!("{detailer}: face {face:?} is degenerate ({width} x {height}), skipping");
        return None;
    }
    Some((width, height))
}

/// Evenly spaced points across the face by bilinear interpolation of its
/// corners, `columns` along the first edge and `rows` across it
fn grid_points(corners: [Vec3; 4], columns: u32, rows: u32) -> Vec<Vec3> {
    let [v0, v1, v2, v3] = corners;
    let mut points = Vec::with_capacity((columns * rows) as usize);
    for h in 0..columns {
        let t = (h + 1) as f32 / (columns + 1) as f32;
        let top = v0.lerp(v1, t);
        let bottom = v3.lerp(v2, t);
        for v in 0..rows {
            points.push(top.lerp(bottom, (v + 1) as f32 / (rows + 1) as f32));
        }
    }
    points
}

/// Engine exhausts on a rear face
pub fn add_exhaust(mesh: &mut Mesh, face: FaceId, rng: &mut RandomStream) -> Result<(), MeshError> {
    if detailable(mesh, face, "exhaust").is_none() {
        return Ok(());
    }

    // Truncation matches the cut count range of 1..=(4 - aspect)
    let max_cuts = (4.0 - aspect_ratio(mesh, face)) as i32;
    let cuts = rng.int(1, max_cuts) as u32;
    let cells = mesh.subdivide_grid(face, cuts, SUBDIVIDE_FRACTAL, rng)?;

    let length = rng.uniform(0.1, 0.2);
    let scale_outer = 1.0 / rng.uniform(1.3, 1.6);
    let scale_inner = 1.0 / rng.uniform(1.05, 1.1);

    for cell in cells.faces {
        if !is_rear_face(mesh, cell)? {
            continue;
        }
        mesh.set_material(cell, MaterialSlot::HullDark)?;
        let nozzle = extrude_face(mesh, cell, length, None)?;
        scale_face(mesh, nozzle, scale_outer, scale_outer, scale_outer)?;

        let mut burn = Vec::new();
        let cavity = extrude_face(mesh, nozzle, -length * 0.9, Some(&mut burn))?;
        for f in burn {
            mesh.set_material(f, MaterialSlot::ExhaustBurn)?;
        }
        scale_face(mesh, cavity, scale_inner, scale_inner, scale_inner)?;
    }
    Ok(())
}

/// Raised panel grid
pub fn add_grid(mesh: &mut Mesh, face: FaceId, rng: &mut RandomStream) -> Result<(), MeshError> {
    if detailable(mesh, face, "grid").is_none() {
        return Ok(());
    }

    let cuts = rng.int(2, 4) as u32;
    let cells = mesh.subdivide_grid(face, cuts, SUBDIVIDE_FRACTAL, rng)?;
    let length = rng.uniform(0.025, 0.15);

    for cell in cells.faces {
        let material = if rng.chance_above(0.5) {
            MaterialSlot::HullLights
        } else {
            MaterialSlot::Hull
        };

        let mut raised = Vec::new();
        let cap = extrude_face(mesh, cell, length, Some(&mut raised))?;
        for f in raised {
            // Near-vertical faces keep their material
            if mesh.face_normal(f)?.z.abs() < 0.707 {
                mesh.set_material(f, material)?;
            }
        }
        scale_face(mesh, cap, 0.8, 0.8, 0.8)?;
    }
    Ok(())
}

/// Array of capped cylinders along the face normal
pub fn add_cylinders(mesh: &mut Mesh, face: FaceId, rng: &mut RandomStream) -> Result<(), MeshError> {
    let Some((width, height)) = detailable(mesh, face, "cylinders") else {
        return Ok(());
    };

    let columns = rng.int(1, 3) as u32;
    let rows = rng.int(1, 3) as u32;
    let segments = rng.int(6, 12) as u32;

    let depth = 1.3 * (width / (columns + 2) as f32).min(height / (rows + 2) as f32);
    let diameter = depth * 0.5;
    let frame = local_frame(mesh, face, None)?;

    for pos in grid_points(face_corners(mesh, face)?, columns, rows) {
        let matrix = frame.with_origin(pos).to_matrix();
        mesh.create_cone(segments, diameter * 0.5, diameter * 0.5, depth, true, matrix);
    }
    Ok(())
}

/// Array of turrets
pub fn add_weapons(mesh: &mut Mesh, face: FaceId, rng: &mut RandomStream) -> Result<(), MeshError> {
    const SEGMENTS: u32 = 16;

    let Some((width, height)) = detailable(mesh, face, "weapons") else {
        return Ok(());
    };

    let columns = rng.int(1, 2) as u32;
    let rows = rng.int(1, 2) as u32;

    let size = 0.5 * (width / (columns + 2) as f32).min(height / (rows + 2) as f32);
    let base_depth = size * 0.2;
    let barrel_radius = size * 0.125;
    let frame = local_frame(mesh, face, None)?;

    for pos in grid_points(face_corners(mesh, face)?, columns, rows) {
        let base = frame.with_origin(pos).to_matrix();
        mesh.create_cone(SEGMENTS, size * 0.5, size * 0.5, base_depth, true, base);

        // Barrel lies on top of the base, pointing out along the yawed local X
        let yaw = (rng.int(-45, 45) as f32).to_radians();
        let barrel = base
            * Mat4::from_translation(Vec3::new(0.0, 0.0, base_depth * 0.5 + barrel_radius))
            * Mat4::from_rotation_z(yaw)
            * Mat4::from_translation(Vec3::new(size * 0.5, 0.0, 0.0))
            * Mat4::from_rotation_y(std::f32::consts::FRAC_PI_2);
        mesh.create_cone(SEGMENTS, barrel_radius, barrel_radius, size, true, barrel);
    }
    Ok(())
}

/// A sphere resting on the face centre
pub fn add_sphere(mesh: &mut Mesh, face: FaceId, _rng: &mut RandomStream) -> Result<(), MeshError> {
    let Some((width, height)) = detailable(mesh, face, "sphere") else {
        return Ok(());
    };

    let size = width.min(height);
    let center = mesh.face_center(face)?;
    let matrix = local_frame(mesh, face, Some(center))?.to_matrix()
        * Mat4::from_translation(Vec3::new(0.0, 0.0, size * 0.5));
    mesh.create_uv_sphere(8, 8, size * 0.5, matrix);
    Ok(())
}

/// A cone standing on the face centre, tip pointing out
pub fn add_antenna(mesh: &mut Mesh, face: FaceId, _rng: &mut RandomStream) -> Result<(), MeshError> {
    let Some((width, height)) = detailable(mesh, face, "antenna") else {
        return Ok(());
    };

    let size = width.min(height);
    let center = mesh.face_center(face)?;
    let matrix = local_frame(mesh, face, Some(center))?.to_matrix()
        * Mat4::from_translation(Vec3::new(0.0, 0.0, size * 0.5));
    mesh.create_cone(8, size * 0.25, 0.0, size, true, matrix);
    Ok(())
}

/// An open circle flush with the face
///
/// The glow comes from the face itself; callers tag it
/// [`MaterialSlot::GlowDisc`] first.
pub fn add_disc(mesh: &mut Mesh, face: FaceId, _rng: &mut RandomStream) -> Result<(), MeshError> {
    let Some((width, height)) = detailable(mesh, face, "disc") else {
        return Ok(());
    };

    let size = width.min(height);
    let center = mesh.face_center(face)?;
    let matrix = local_frame(mesh, face, Some(center))?.to_matrix();
    mesh.create_circle(32, size * 0.5, false, matrix);
    Ok(())
}
