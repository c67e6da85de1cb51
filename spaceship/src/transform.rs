//! Face transform operations built on the mesh substrate
//!
//! Every function that replaces a face returns the ID of its successor and
//! leaves the input ID retired. Callers must continue with the returned ID.

use glam::{Quat, Vec3};

use crate::error::MeshError;
use crate::geometry::local_frame;
use crate::mesh::{FaceId, Mesh};

/// Extrude `face` and push the new cap `distance` along its normal
///
/// When `collect` is given, every face created by the extrusion (the side
/// ring followed by the cap) is appended to it.
pub fn extrude_face(
    mesh: &mut Mesh,
    face: FaceId,
    distance: f32,
    collect: Option<&mut Vec<FaceId>>,
) -> Result<FaceId, MeshError> {
    let extrusion = mesh.extrude_discrete(face)?;
    if let Some(list) = collect {
        list.extend_from_slice(&extrusion.sides);
        list.push(extrusion.cap);
    }

    let normal = mesh.face_normal(extrusion.cap)?;
    mesh.translate_face(extrusion.cap, normal * distance)?;
    Ok(extrusion.cap)
}

/// Extrude `face` by `distance` as a run of `ribs` contract-expand ribs
///
/// Each rib moves forward a quarter, pinches by `rib_scale`, moves forward a
/// half, widens back by `1 / rib_scale` and moves forward the last quarter,
/// so the cap travels exactly `distance` whatever the scale.
pub fn ribbed_extrude_face(
    mesh: &mut Mesh,
    face: FaceId,
    distance: f32,
    ribs: u32,
    rib_scale: f32,
) -> Result<FaceId, MeshError> {
    let ribs = ribs.max(1);
    let per_rib = distance / ribs as f32;
    let widen = 1.0 / rib_scale;

    let mut face = face;
    for _ in 0..ribs {
        face = extrude_face(mesh, face, per_rib * 0.25, None)?;
        face = extrude_face(mesh, face, 0.0, None)?;
        scale_face(mesh, face, rib_scale, rib_scale, rib_scale)?;
        face = extrude_face(mesh, face, per_rib * 0.5, None)?;
        face = extrude_face(mesh, face, 0.0, None)?;
        scale_face(mesh, face, widen, widen, widen)?;
        face = extrude_face(mesh, face, per_rib * 0.25, None)?;
    }
    Ok(face)
}

/// Scale a face in its own frame
///
/// The frame is anchored at vertex 0, which stays put. `sx` and `sy` act
/// along the face's local X and Y axes, `sz` along its normal.
pub fn scale_face(mesh: &mut Mesh, face: FaceId, sx: f32, sy: f32, sz: f32) -> Result<(), MeshError> {
    let space = local_frame(mesh, face, None)?.to_matrix();
    let verts = mesh.face_vertices(face)?.to_vec();
    mesh.scale_in_frame(&verts, space, Vec3::new(sx, sy, sz));
    Ok(())
}

/// Rotate a face about one of its local axes, through its centre
pub fn rotate_face(mesh: &mut Mesh, face: FaceId, local_axis: Vec3, angle: f32) -> Result<(), MeshError> {
    let center = mesh.face_center(face)?;
    let space = local_frame(mesh, face, Some(center))?.to_matrix();
    let axis = space.transform_vector3(local_axis).normalize_or_zero();
    if axis == Vec3::ZERO {
        return Ok(());
    }
    let verts = mesh.face_vertices(face)?.to_vec();
    mesh.rotate_about(&verts, center, Quat::from_axis_angle(axis, angle));
    Ok(())
}
