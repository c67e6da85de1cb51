//! Face-local geometry queries
//!
//! Frames are recomputed from the current vertex positions on every call.
//! Faces move between operations, so nothing here is cached.

use glam::{Mat4, Vec3};

use crate::error::MeshError;
use crate::mesh::{FaceId, Mesh};

/// Normal X below this marks a face as pointing to the rear of the hull
pub const REAR_FACE_THRESHOLD: f32 = -0.95;

/// Basis spanned by a face's first vertex and its two loop neighbours
///
/// `x_axis` points from vertex 0 to vertex 1, `y_axis` from vertex 0 to the
/// last vertex of the loop (vertex 3 on a quad), and `z_axis` is their cross
/// product. On a rectangular face the three are orthonormal; on a skewed one
/// use [`LocalFrame::to_matrix`] for an orthonormal placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalFrame {
    pub x_axis: Vec3,
    pub y_axis: Vec3,
    pub z_axis: Vec3,
    pub origin: Vec3,
}

impl LocalFrame {
    /// Same axes, different origin
    pub fn with_origin(self, origin: Vec3) -> Self {
        Self { origin, ..self }
    }

    /// Orthonormal local-to-world matrix
    ///
    /// Keeps the normal exact and the X axis as close as possible to the
    /// face's first edge. Degenerate faces fall back to an arbitrary basis
    /// around whatever normal survives.
    pub fn to_matrix(&self) -> Mat4 {
        let z = self.z_axis.try_normalize().unwrap_or(Vec3::Z);
        let x = (self.x_axis - z * self.x_axis.dot(z))
            .try_normalize()
            .unwrap_or_else(|| z.any_orthonormal_vector());
        let y = z.cross(x);
        Mat4::from_cols(x.extend(0.0), y.extend(0.0), z.extend(0.0), self.origin.extend(1.0))
    }

    /// Map a point given in frame coordinates to world space
    pub fn to_world(&self, local: Vec3) -> Vec3 {
        self.to_matrix().transform_point3(local)
    }
}

/// Compute the local frame of `face`
///
/// The origin defaults to vertex 0. Needs at least three vertices.
pub fn local_frame(mesh: &Mesh, face: FaceId, origin: Option<Vec3>) -> Result<LocalFrame, MeshError> {
    let points = mesh.face_positions(face)?;
    if points.len() < 3 {
        return Err(MeshError::TooFewVertices {
            face,
            count: points.len(),
            needed: 3,
        });
    }

    let v0 = points[0];
    let x_axis = (points[1] - v0).normalize_or_zero();
    let y_axis = (points[points.len() - 1] - v0).normalize_or_zero();
    Ok(LocalFrame {
        x_axis,
        y_axis,
        z_axis: x_axis.cross(y_axis),
        origin: origin.unwrap_or(v0),
    })
}

/// Lengths from vertex 0 to its two loop neighbours
pub fn width_height(mesh: &Mesh, face: FaceId) -> Result<(f32, f32), MeshError> {
    let points = mesh.face_positions(face)?;
    if points.len() < 3 {
        return Err(MeshError::TooFewVertices {
            face,
            count: points.len(),
            needed: 3,
        });
    }

    let v0 = points[0];
    Ok((v0.distance(points[1]), v0.distance(points[points.len() - 1])))
}

/// Ratio of the face's first two edge lengths, always >= 1
///
/// Returns exactly 1.0 for a retired or unknown face.
pub fn aspect_ratio(mesh: &Mesh, face: FaceId) -> f32 {
    let Ok(lengths) = mesh.edge_lengths(face) else {
        return 1.0;
    };
    if lengths.len() < 2 {
        return 1.0;
    }

    let ratio = (lengths[0] / lengths[1].max(f32::EPSILON)).max(0.01);
    if ratio < 1.0 { 1.0 / ratio } else { ratio }
}

/// True if the face points along the hull's -X (rear) axis
pub fn is_rear_face(mesh: &Mesh, face: FaceId) -> Result<bool, MeshError> {
    Ok(mesh.face_normal(face)?.x < REAR_FACE_THRESHOLD)
}

/// The four corners used for bilinear layout: v0, v1, and the two loop
/// predecessors of v0 (v2 and v3 on a quad)
pub fn face_corners(mesh: &Mesh, face: FaceId) -> Result<[Vec3; 4], MeshError> {
    let points = mesh.face_positions(face)?;
    let n = points.len();
    if n < 4 {
        return Err(MeshError::TooFewVertices {
            face,
            count: n,
            needed: 4,
        });
    }
    Ok([points[0], points[1], points[n - 2], points[n - 1]])
}
