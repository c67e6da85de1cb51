//! Handle and result types shared by mesh operations

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::material::MaterialSlot;

/// Stable handle to a vertex in a [`Mesh`](super::Mesh)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VertexId(pub u32);

/// Stable handle to a face in a [`Mesh`](super::Mesh)
///
/// IDs are never reused. A face consumed by an operation keeps its ID but is
/// marked retired; every query or mutation through a retired ID fails with
/// [`MeshError::RetiredFace`](crate::MeshError::RetiredFace).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FaceId(pub u32);

impl VertexId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl FaceId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Loose (wire) edge between two vertices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge(pub VertexId, pub VertexId);

/// Everything an operation created, split by element kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Geometry {
    pub vertices: Vec<VertexId>,
    pub edges: Vec<Edge>,
    pub faces: Vec<FaceId>,
}

/// Result of a discrete single-face extrusion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extrusion {
    /// Outward face replacing the extruded one
    pub cap: FaceId,
    /// Ring of faces joining the old boundary to the cap, one per boundary edge
    pub sides: Vec<FaceId>,
}

/// Face storage inside the arena
#[derive(Debug, Clone)]
pub(crate) struct FaceRecord {
    pub verts: Vec<VertexId>,
    pub material: MaterialSlot,
    pub retired: bool,
}

/// A finished polygon of a [`CommittedMesh`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommittedFace {
    /// Indices into [`CommittedMesh::positions`], outward winding
    pub indices: Vec<u32>,
    pub material: MaterialSlot,
}

/// Frozen output of a generation run
///
/// Holds only live faces with non-zero area, in creation order, plus the
/// loose wire edges. Vertex indices are compacted to the ones still in use.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommittedMesh {
    pub positions: Vec<Vec3>,
    pub faces: Vec<CommittedFace>,
    pub edges: Vec<[u32; 2]>,
}

impl CommittedMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Axis-aligned bounds as (min, max), `None` for an empty mesh
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.positions.first()?;
        Some(
            self.positions
                .iter()
                .fold((first, first), |(lo, hi), &p| (lo.min(p), hi.max(p))),
        )
    }

    /// Outward unit normal of a committed face (Newell's method)
    pub fn face_normal(&self, face: &CommittedFace) -> Vec3 {
        let points: Vec<Vec3> = face
            .indices
            .iter()
            .map(|&i| self.positions[i as usize])
            .collect();
        super::newell_normal(&points).normalize_or_zero()
    }

    /// Area of a committed face
    pub fn face_area(&self, face: &CommittedFace) -> f32 {
        let points: Vec<Vec3> = face
            .indices
            .iter()
            .map(|&i| self.positions[i as usize])
            .collect();
        super::newell_normal(&points).length() * 0.5
    }
}
