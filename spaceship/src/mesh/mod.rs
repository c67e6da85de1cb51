//! Arena polygon mesh used as the editing substrate for generation
//!
//! Vertices live in a flat position array and are never removed. Faces are
//! ordered vertex loops with outward (counter-clockwise) winding. When an
//! operation consumes a face it is retired rather than removed, so every
//! [`FaceId`] handed out stays meaningful: it either names a live face or
//! reports [`MeshError::RetiredFace`].
//!
//! Normals are not stored. They are derived from the current vertex
//! positions on every query, since almost every operation moves vertices.
//!
//! # Example
//! ```
//! use spaceship::mesh::Mesh;
//! use glam::Vec3;
//!
//! let mut mesh = Mesh::new();
//! let cube = mesh.create_cuboid(Vec3::ONE);
//! let ext = mesh.extrude_discrete(cube.faces[1]).unwrap();
//! mesh.translate_face(ext.cap, Vec3::X * 0.5).unwrap();
//! assert_eq!(mesh.live_faces().len(), 6 + 4);
//! ```

mod ops;
mod primitives;
mod types;

pub use types::{CommittedFace, CommittedMesh, Edge, Extrusion, FaceId, Geometry, VertexId};

use glam::Vec3;
use std::collections::HashMap;
use tracing::debug;

use crate::error::MeshError;
use crate::material::MaterialSlot;
use types::FaceRecord;

/// Faces with less area than this are dropped on commit
pub const DEGENERATE_AREA: f32 = 1e-10;

/// Mutable polygon mesh with stable vertex and face handles
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    positions: Vec<Vec3>,
    faces: Vec<FaceRecord>,
    wires: Vec<Edge>,
}

impl Mesh {
    /// Create an empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a free vertex
    pub fn add_vertex(&mut self, position: Vec3) -> VertexId {
        let id = VertexId(self.positions.len() as u32);
        self.positions.push(position);
        id
    }

    /// Add a face from an ordered vertex loop (outward winding)
    pub fn add_face(&mut self, verts: Vec<VertexId>, material: MaterialSlot) -> FaceId {
        let id = FaceId(self.faces.len() as u32);
        self.faces.push(FaceRecord {
            verts,
            material,
            retired: false,
        });
        id
    }

    /// Add a loose wire edge
    pub fn add_edge(&mut self, a: VertexId, b: VertexId) -> Edge {
        let edge = Edge(a, b);
        self.wires.push(edge);
        edge
    }

    pub(crate) fn record(&self, face: FaceId) -> Result<&FaceRecord, MeshError> {
        let record = self
            .faces
            .get(face.index())
            .ok_or(MeshError::UnknownFace(face))?;
        if record.retired {
            return Err(MeshError::RetiredFace(face));
        }
        Ok(record)
    }

    pub(crate) fn record_mut(&mut self, face: FaceId) -> Result<&mut FaceRecord, MeshError> {
        let record = self
            .faces
            .get_mut(face.index())
            .ok_or(MeshError::UnknownFace(face))?;
        if record.retired {
            return Err(MeshError::RetiredFace(face));
        }
        Ok(record)
    }

    pub(crate) fn retire(&mut self, face: FaceId) -> Result<(), MeshError> {
        self.record_mut(face)?.retired = true;
        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// True if `face` exists and has not been consumed
    pub fn is_valid(&self, face: FaceId) -> bool {
        self.record(face).is_ok()
    }

    /// IDs of all live faces in creation order
    pub fn live_faces(&self) -> Vec<FaceId> {
        self.faces
            .iter()
            .enumerate()
            .filter(|(_, f)| !f.retired)
            .map(|(i, _)| FaceId(i as u32))
            .collect()
    }

    /// Number of live faces
    pub fn face_count(&self) -> usize {
        self.faces.iter().filter(|f| !f.retired).count()
    }

    /// Number of vertices ever created
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Loose wire edges
    pub fn wires(&self) -> &[Edge] {
        &self.wires
    }

    /// Position of a vertex
    pub fn position(&self, vertex: VertexId) -> Vec3 {
        self.positions[vertex.index()]
    }

    /// Ordered vertex loop of a face
    pub fn face_vertices(&self, face: FaceId) -> Result<&[VertexId], MeshError> {
        Ok(&self.record(face)?.verts)
    }

    /// Current positions of a face's vertices, in loop order
    pub fn face_positions(&self, face: FaceId) -> Result<Vec<Vec3>, MeshError> {
        Ok(self
            .record(face)?
            .verts
            .iter()
            .map(|&v| self.positions[v.index()])
            .collect())
    }

    /// Outward unit normal (zero for a degenerate face)
    pub fn face_normal(&self, face: FaceId) -> Result<Vec3, MeshError> {
        Ok(newell_normal(&self.face_positions(face)?).normalize_or_zero())
    }

    /// Median of the face's vertex positions
    pub fn face_center(&self, face: FaceId) -> Result<Vec3, MeshError> {
        let points = self.face_positions(face)?;
        Ok(points.iter().copied().sum::<Vec3>() / points.len().max(1) as f32)
    }

    /// Center of the face's axis-aligned bounding box
    pub fn face_center_bounds(&self, face: FaceId) -> Result<Vec3, MeshError> {
        let points = self.face_positions(face)?;
        let Some(&first) = points.first() else {
            return Ok(Vec3::ZERO);
        };
        let (lo, hi) = points
            .iter()
            .fold((first, first), |(lo, hi), &p| (lo.min(p), hi.max(p)));
        Ok((lo + hi) * 0.5)
    }

    /// Polygon area
    pub fn face_area(&self, face: FaceId) -> Result<f32, MeshError> {
        Ok(newell_normal(&self.face_positions(face)?).length() * 0.5)
    }

    /// Boundary edge lengths; edge `i` runs from vertex `i` to vertex `i + 1`
    pub fn edge_lengths(&self, face: FaceId) -> Result<Vec<f32>, MeshError> {
        let points = self.face_positions(face)?;
        let n = points.len();
        Ok((0..n)
            .map(|i| points[i].distance(points[(i + 1) % n]))
            .collect())
    }

    /// Material slot of a face
    pub fn material(&self, face: FaceId) -> Result<MaterialSlot, MeshError> {
        Ok(self.record(face)?.material)
    }

    /// Tag a face with a material slot
    pub fn set_material(&mut self, face: FaceId, material: MaterialSlot) -> Result<(), MeshError> {
        self.record_mut(face)?.material = material;
        Ok(())
    }

    /// Minimum and maximum over all vertex positions
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.positions.first()?;
        Some(
            self.positions
                .iter()
                .fold((first, first), |(lo, hi), &p| (lo.min(p), hi.max(p))),
        )
    }

    // =========================================================================
    // Commit
    // =========================================================================

    /// Freeze the mesh into its renderable form
    ///
    /// Retired faces are skipped. Live faces whose area fell below
    /// [`DEGENERATE_AREA`] are dropped and logged. Vertices referenced by
    /// nothing are compacted away.
    pub fn commit(&self) -> CommittedMesh {
        let mut remap: HashMap<VertexId, u32> = HashMap::new();
        let mut positions = Vec::new();
        let mut index_of = |v: VertexId, positions: &mut Vec<Vec3>| -> u32 {
            *remap.entry(v).or_insert_with(|| {
                positions.push(self.positions[v.index()]);
                (positions.len() - 1) as u32
            })
        };

        let mut faces = Vec::new();
        let mut dropped = 0usize;
        for record in self.faces.iter().filter(|f| !f.retired) {
            let points: Vec<Vec3> = record
                .verts
                .iter()
                .map(|v| self.positions[v.index()])
                .collect();
            if record.verts.len() < 3 || newell_normal(&points).length() * 0.5 < DEGENERATE_AREA {
                dropped += 1;
                continue;
            }
            let indices = record
                .verts
                .iter()
                .map(|&v| index_of(v, &mut positions))
                .collect();
            faces.push(CommittedFace {
                indices,
                material: record.material,
            });
        }

        let edges = self
            .wires
            .iter()
            .map(|e| [index_of(e.0, &mut positions), index_of(e.1, &mut positions)])
            .collect();

        if dropped > 0 {
            debug!("Dropped {dropped} degenerate faces on commit");
        }

        CommittedMesh {
            positions,
            faces,
            edges,
        }
    }
}

/// Unnormalized polygon normal by Newell's method
///
/// Its length is twice the polygon area, which makes it robust for slightly
/// non-planar loops left behind by fractal subdivision.
pub(crate) fn newell_normal(points: &[Vec3]) -> Vec3 {
    let n = points.len();
    let mut normal = Vec3::ZERO;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        normal.x += (a.y - b.y) * (a.z + b.z);
        normal.y += (a.z - b.z) * (a.x + b.x);
        normal.z += (a.x - b.x) * (a.y + b.y);
    }
    normal
}
